//! Incremental collection statistics.
//!
//! A [`CollectionState`] is never edited in place by callers: [`aggregate_add`] and
//! [`aggregate_remove`] take the current snapshot plus one document and return the next
//! snapshot. Only the entries touched by the document have their counts changed; tf and
//! idf of entries that existed before the call are refreshed because the collection totals
//! moved.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::{by_tf_desc, DocumentStats};
use crate::DocId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionStat {
    pub word: String,
    pub count: u64,
    pub tf: f64,
    pub word_doc_occurrences: u32,
    pub idf: f64,
}

/// Snapshot of one collection's aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionState {
    pub total_words: u64,
    pub members: BTreeSet<DocId>,
    pub stats: IndexMap<String, CollectionStat>,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc_count(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.members.contains(&doc_id)
    }

    pub fn stat(&self, word: &str) -> Option<&CollectionStat> {
        self.stats.get(word)
    }

    /// Entries ordered by tf descending, then word ascending.
    pub fn page(&self, offset: usize, limit: usize) -> Vec<CollectionStat> {
        let mut sorted: Vec<&CollectionStat> = self.stats.values().collect();
        sorted.sort_by(|a, b| by_tf_desc(a.tf, &a.word, b.tf, &b.word));
        sorted.into_iter().skip(offset).take(limit).cloned().collect()
    }

    fn refresh(&mut self, previous: &CollectionState) {
        let total_words = self.total_words;
        let doc_count = self.doc_count();
        for stat in self.stats.values_mut() {
            if previous.stats.contains_key(&stat.word) {
                stat.tf = term_frequency(stat.count, total_words);
                stat.idf = inverse_document_frequency(doc_count, stat.word_doc_occurrences);
            }
        }
    }
}

fn term_frequency(count: u64, total_words: u64) -> f64 {
    if total_words > 0 {
        count as f64 / total_words as f64
    } else {
        0.0
    }
}

fn inverse_document_frequency(doc_count: usize, occurrences: u32) -> f64 {
    if occurrences > 0 && doc_count > 0 {
        (doc_count as f64 / occurrences as f64).log10()
    } else {
        0.0
    }
}

/// Merge `doc` into the collection. Adding a document that is already a member returns the
/// snapshot unchanged.
pub fn aggregate_add(state: &CollectionState, doc_id: DocId, doc: &DocumentStats) -> CollectionState {
    if state.contains(doc_id) {
        tracing::debug!(doc_id, "document already in collection, skipping add");
        return state.clone();
    }

    let mut next = state.clone();
    next.members.insert(doc_id);
    next.total_words += doc.length as u64;
    let doc_count = next.doc_count();

    for ws in &doc.words {
        let count = u64::from(ws.count);
        match next.stats.get_mut(&ws.word) {
            Some(stat) => {
                stat.count += count;
                stat.word_doc_occurrences += 1;
            }
            None => {
                let stat = CollectionStat {
                    word: ws.word.clone(),
                    count,
                    tf: term_frequency(count, next.total_words),
                    word_doc_occurrences: 1,
                    idf: inverse_document_frequency(doc_count, 1),
                };
                next.stats.insert(ws.word.clone(), stat);
            }
        }
    }

    next.refresh(state);
    tracing::debug!(
        doc_id,
        total_words = next.total_words,
        words = next.stats.len(),
        "document added to collection"
    );
    next
}

/// Take `doc` out of the collection. Entries left with no count or no containing document
/// are dropped.
pub fn aggregate_remove(
    state: &CollectionState,
    doc_id: DocId,
    doc: &DocumentStats,
) -> Result<CollectionState> {
    if !state.contains(doc_id) {
        tracing::warn!(doc_id, "remove requested for a document that is not a member");
        return Err(Error::InconsistentState(format!(
            "document {doc_id} is not a member of the collection"
        )));
    }

    let mut next = state.clone();
    next.members.remove(&doc_id);
    next.total_words = next.total_words.saturating_sub(doc.length as u64);

    for ws in &doc.words {
        match next.stats.get_mut(&ws.word) {
            Some(stat) => {
                stat.count = stat.count.saturating_sub(u64::from(ws.count));
                stat.word_doc_occurrences = stat.word_doc_occurrences.saturating_sub(1);
            }
            None => {
                tracing::warn!(doc_id, word = %ws.word, "word not tracked in collection statistics");
            }
        }
    }

    next.refresh(state);
    next.stats
        .retain(|_, stat| stat.count > 0 && stat.word_doc_occurrences > 0);
    tracing::debug!(
        doc_id,
        total_words = next.total_words,
        words = next.stats.len(),
        "document removed from collection"
    );
    Ok(next)
}
