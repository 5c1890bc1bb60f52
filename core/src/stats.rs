use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tokenizer::{count_tokens, words_lowercased};

/// Occurrences of one lower-cased word in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordStat {
    pub word: String,
    pub count: u32,
    pub tf: f64,
}

/// Word statistics of a single document, in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub length: usize,
    pub words: Vec<WordStat>,
}

impl DocumentStats {
    pub fn compute(text: &str) -> Self {
        let length = count_tokens(text);
        if length == 0 {
            return Self::default();
        }

        let mut counts: IndexMap<String, u32> = IndexMap::new();
        for word in words_lowercased(text) {
            *counts.entry(word).or_insert(0) += 1;
        }

        let words = counts
            .into_iter()
            .map(|(word, count)| WordStat {
                word,
                count,
                tf: count as f64 / length as f64,
            })
            .collect();
        Self { length, words }
    }

    pub fn count_for(&self, word: &str) -> u32 {
        self.words
            .iter()
            .find(|s| s.word == word)
            .map_or(0, |s| s.count)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Entries ordered by tf descending, then word ascending.
    pub fn page(&self, offset: usize, limit: usize) -> Vec<WordStat> {
        let mut sorted: Vec<&WordStat> = self.words.iter().collect();
        sorted.sort_by(|a, b| by_tf_desc(a.tf, &a.word, b.tf, &b.word));
        sorted.into_iter().skip(offset).take(limit).cloned().collect()
    }
}

pub(crate) fn by_tf_desc(a_tf: f64, a_word: &str, b_tf: f64, b_word: &str) -> Ordering {
    b_tf.partial_cmp(&a_tf)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_word.cmp(b_word))
}

pub fn compute_document_stats(text: &str) -> DocumentStats {
    DocumentStats::compute(text)
}
