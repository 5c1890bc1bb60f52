//! Huffman coding over the character histogram of a text.
//!
//! The encoded form is a string of ASCII `'0'`/`'1'` symbols, not packed bits. Tree
//! construction breaks frequency ties by insertion order (leaves are seeded in order of
//! first appearance in the text, internal nodes get the next sequence number when pushed),
//! so the same text always yields the same codebook.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Character counts in order of first appearance.
pub type Histogram = IndexMap<char, usize>;

pub fn histogram(text: &str) -> Histogram {
    let mut hist = Histogram::new();
    for c in text.chars() {
        *hist.entry(c).or_insert(0) += 1;
    }
    hist
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Leaf {
        symbol: char,
        freq: usize,
    },
    Internal {
        freq: usize,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn freq(&self) -> usize {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }
}

/// Heap entry: lowest frequency first, then lowest sequence number.
struct Queued {
    seq: usize,
    node: Node,
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .node
            .freq()
            .cmp(&self.node.freq())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

/// Mapping from character to its prefix-free bit string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Codebook(IndexMap<char, String>);

impl Codebook {
    pub fn get(&self, symbol: char) -> Option<&str> {
        self.0.get(&symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.0.iter().map(|(c, code)| (*c, code.as_str()))
    }

    /// Replace every character of `text` with its code and concatenate.
    pub fn encode(&self, text: &str) -> Result<String> {
        let mut bits = String::new();
        for c in text.chars() {
            let code = self.get(c).ok_or(Error::UnknownSymbol(c))?;
            bits.push_str(code);
        }
        Ok(bits)
    }
}

impl FromIterator<(char, String)> for Codebook {
    fn from_iter<I: IntoIterator<Item = (char, String)>>(iter: I) -> Self {
        Codebook(iter.into_iter().collect())
    }
}

/// Huffman tree. `root` is `None` only for an empty alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Option<Node>,
}

impl HuffmanTree {
    pub fn from_text(text: &str) -> Self {
        Self::from_histogram(&histogram(text))
    }

    pub fn from_histogram(hist: &Histogram) -> Self {
        let mut pq = BinaryHeap::with_capacity(hist.len());
        let mut seq = 0;
        for (&symbol, &freq) in hist {
            if freq == 0 {
                continue;
            }
            pq.push(Queued {
                seq,
                node: Node::Leaf { symbol, freq },
            });
            seq += 1;
        }

        while pq.len() > 1 {
            let (Some(right), Some(left)) = (pq.pop(), pq.pop()) else {
                break;
            };
            let freq = right.node.freq() + left.node.freq();
            pq.push(Queued {
                seq,
                node: Node::Internal {
                    freq,
                    left: Box::new(left.node),
                    right: Box::new(right.node),
                },
            });
            seq += 1;
        }

        Self {
            root: pq.pop().map(|q| q.node),
        }
    }

    /// Rebuild the decoding tree from a codebook produced by [`HuffmanTree::codebook`].
    pub fn from_codebook(codebook: &Codebook) -> Result<Self> {
        let entries: Vec<(char, &str)> = codebook.iter().collect();
        let root = match entries.as_slice() {
            [] => None,
            [(symbol, code)] => {
                if *code != "0" {
                    return Err(Error::MalformedCode { position: 0 });
                }
                Some(Node::Leaf {
                    symbol: *symbol,
                    freq: 0,
                })
            }
            _ => Some(rebuild(&entries, 0)?),
        };
        Ok(Self { root })
    }

    /// Codes are read root to leaf, `'0'` for a left edge and `'1'` for a right edge.
    /// A lone leaf at the root gets `"0"`.
    pub fn codebook(&self) -> Codebook {
        let mut codes = IndexMap::new();
        if let Some(root) = &self.root {
            build_codes(root, String::new(), &mut codes);
        }
        Codebook(codes)
    }

    pub fn decode(&self, bits: &str) -> Result<String> {
        let Some(root) = self.root.as_ref() else {
            if bits.is_empty() {
                return Ok(String::new());
            }
            return Err(Error::MalformedCode { position: 0 });
        };

        let mut out = String::new();
        if let Node::Leaf { symbol, .. } = root {
            for (i, bit) in bits.bytes().enumerate() {
                if bit != b'0' {
                    return Err(Error::MalformedCode { position: i });
                }
                out.push(*symbol);
            }
            return Ok(out);
        }

        let mut curr = root;
        let mut start = 0;
        for (i, bit) in bits.bytes().enumerate() {
            let next: &Node = match (curr, bit) {
                (Node::Internal { left, .. }, b'0') => &**left,
                (Node::Internal { right, .. }, b'1') => &**right,
                _ => return Err(Error::MalformedCode { position: i }),
            };
            if let Node::Leaf { symbol, .. } = next {
                out.push(*symbol);
                curr = root;
                start = i + 1;
            } else {
                curr = next;
            }
        }
        if start != bits.len() {
            return Err(Error::MalformedCode { position: start });
        }
        Ok(out)
    }
}

fn build_codes(node: &Node, prefix: String, codes: &mut IndexMap<char, String>) {
    match node {
        Node::Leaf { symbol, .. } => {
            let code = if prefix.is_empty() { "0".to_string() } else { prefix };
            codes.insert(*symbol, code);
        }
        Node::Internal { left, right, .. } => {
            let mut left_prefix = prefix.clone();
            left_prefix.push('0');
            build_codes(left, left_prefix, codes);

            let mut right_prefix = prefix;
            right_prefix.push('1');
            build_codes(right, right_prefix, codes);
        }
    }
}

fn rebuild(entries: &[(char, &str)], depth: usize) -> Result<Node> {
    if let [(symbol, code)] = entries {
        if code.len() == depth {
            return Ok(Node::Leaf {
                symbol: *symbol,
                freq: 0,
            });
        }
    }

    let mut zeros = Vec::new();
    let mut ones = Vec::new();
    for &(symbol, code) in entries {
        match code.as_bytes().get(depth) {
            Some(b'0') => zeros.push((symbol, code)),
            Some(b'1') => ones.push((symbol, code)),
            _ => return Err(Error::MalformedCode { position: depth }),
        }
    }
    if zeros.is_empty() || ones.is_empty() {
        return Err(Error::MalformedCode { position: depth });
    }

    let left = rebuild(&zeros, depth + 1)?;
    let right = rebuild(&ones, depth + 1)?;
    Ok(Node::Internal {
        freq: left.freq() + right.freq(),
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Codebook and encoded content for one text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoded {
    pub codebook: Codebook,
    pub bits: String,
}

pub fn build_codec(text: &str) -> Result<Encoded> {
    let codebook = HuffmanTree::from_text(text).codebook();
    let bits = codebook.encode(text)?;
    Ok(Encoded { codebook, bits })
}

/// Decode `bits` against the tree derived from `codebook`.
pub fn decode(bits: &str, codebook: &Codebook) -> Result<String> {
    HuffmanTree::from_codebook(codebook)?.decode(bits)
}
