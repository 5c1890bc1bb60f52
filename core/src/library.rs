//! In-memory catalogue of documents and collections.
//!
//! Every collection sits behind its own mutex, so attach/detach on one collection are
//! serialized while different collections (and document ingestion) proceed in parallel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::collection::{aggregate_add, aggregate_remove, CollectionStat, CollectionState};
use crate::document::DocumentRecord;
use crate::error::{Error, Result};
use crate::stats::WordStat;
use crate::{CollectionId, DocId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub state: CollectionState,
}

/// Processing figures over every stored document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub files_processed: usize,
    pub min_time_processed: f64,
    pub max_time_processed: f64,
    pub avg_time_processed: f64,
    /// Unix seconds of the most recent ingestion, `None` for an empty library.
    pub latest_file_processed_timestamp: Option<f64>,
    pub avg_words_per_file: usize,
}

/// Serializable form of a [`Library`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub next_doc_id: DocId,
    pub next_collection_id: CollectionId,
    pub documents: Vec<DocumentRecord>,
    pub collections: Vec<Collection>,
}

pub struct Library {
    documents: RwLock<HashMap<DocId, Arc<DocumentRecord>>>,
    collections: RwLock<HashMap<CollectionId, Arc<Mutex<Collection>>>>,
    next_doc_id: AtomicU32,
    next_collection_id: AtomicU32,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self::from_snapshot(LibrarySnapshot::default())
    }

    pub fn from_snapshot(snapshot: LibrarySnapshot) -> Self {
        let max_doc = snapshot.documents.iter().map(|d| d.id).max().unwrap_or(0);
        let max_coll = snapshot.collections.iter().map(|c| c.id).max().unwrap_or(0);
        let documents = snapshot
            .documents
            .into_iter()
            .map(|d| (d.id, Arc::new(d)))
            .collect();
        let collections = snapshot
            .collections
            .into_iter()
            .map(|c| (c.id, Arc::new(Mutex::new(c))))
            .collect();
        Self {
            documents: RwLock::new(documents),
            collections: RwLock::new(collections),
            next_doc_id: AtomicU32::new(snapshot.next_doc_id.max(max_doc + 1)),
            next_collection_id: AtomicU32::new(snapshot.next_collection_id.max(max_coll + 1)),
        }
    }

    pub fn snapshot(&self) -> LibrarySnapshot {
        let mut documents: Vec<DocumentRecord> = self
            .documents
            .read()
            .values()
            .map(|d| (**d).clone())
            .collect();
        documents.sort_by_key(|d| d.id);
        LibrarySnapshot {
            next_doc_id: self.next_doc_id.load(Ordering::SeqCst),
            next_collection_id: self.next_collection_id.load(Ordering::SeqCst),
            documents,
            collections: self.collections(),
        }
    }

    pub fn create_document(&self, name: &str, text: &str) -> Result<Arc<DocumentRecord>> {
        let id = self.next_doc_id.fetch_add(1, Ordering::SeqCst);
        let doc = Arc::new(DocumentRecord::ingest(id, name, text)?);
        self.documents.write().insert(id, Arc::clone(&doc));
        tracing::info!(doc_id = id, length = doc.length, process_time = doc.process_time, "document created");
        Ok(doc)
    }

    /// Ingest many `(name, text)` pairs in parallel. Failed entries are returned as errors
    /// and leave nothing behind.
    pub fn ingest_documents(&self, inputs: Vec<(String, String)>) -> Vec<Result<Arc<DocumentRecord>>> {
        let inputs: Vec<(DocId, String, String)> = inputs
            .into_iter()
            .map(|(name, text)| (self.next_doc_id.fetch_add(1, Ordering::SeqCst), name, text))
            .collect();
        let records = DocumentRecord::ingest_many(inputs);

        let mut documents = self.documents.write();
        records
            .into_iter()
            .map(|res| -> Result<Arc<DocumentRecord>> {
                let doc = Arc::new(res?);
                documents.insert(doc.id, Arc::clone(&doc));
                Ok(doc)
            })
            .collect()
    }

    pub fn document(&self, doc_id: DocId) -> Result<Arc<DocumentRecord>> {
        self.documents
            .read()
            .get(&doc_id)
            .cloned()
            .ok_or(Error::DocumentNotFound(doc_id))
    }

    pub fn documents(&self) -> Vec<Arc<DocumentRecord>> {
        let mut docs: Vec<_> = self.documents.read().values().cloned().collect();
        docs.sort_by_key(|d| d.id);
        docs
    }

    /// Remove a document, detaching it from every collection that holds it first.
    pub fn delete_document(&self, doc_id: DocId) -> Result<Arc<DocumentRecord>> {
        let doc = self
            .documents
            .write()
            .remove(&doc_id)
            .ok_or(Error::DocumentNotFound(doc_id))?;

        for handle in self.collection_handles() {
            let mut coll = handle.lock();
            if coll.state.contains(doc_id) {
                coll.state = aggregate_remove(&coll.state, doc_id, &doc.stats)?;
                tracing::info!(collection_id = coll.id, doc_id, "document detached on delete");
            }
        }
        tracing::info!(doc_id, "document deleted");
        Ok(doc)
    }

    /// Zero documents give zeroed figures.
    pub fn metrics(&self) -> Metrics {
        let documents = self.documents.read();
        let n = documents.len();
        if n == 0 {
            return Metrics::default();
        }

        let times = documents.values().map(|d| d.process_time);
        let min_time_processed = times.clone().fold(f64::INFINITY, f64::min);
        let max_time_processed = times.clone().fold(f64::NEG_INFINITY, f64::max);
        let avg_time_processed = times.sum::<f64>() / n as f64;
        let latest_file_processed_timestamp = documents
            .values()
            .filter_map(|d| OffsetDateTime::parse(&d.created_at, &Rfc3339).ok())
            .max()
            .map(|t| t.unix_timestamp_nanos() as f64 / 1e9);
        let avg_words_per_file = documents.values().map(|d| d.length).sum::<usize>() / n;

        Metrics {
            files_processed: n,
            min_time_processed,
            max_time_processed,
            avg_time_processed,
            latest_file_processed_timestamp,
            avg_words_per_file,
        }
    }

    pub fn decode_document(&self, doc_id: DocId) -> Result<String> {
        self.document(doc_id)?.decode_huffman()
    }

    pub fn document_stats(&self, doc_id: DocId, offset: usize, limit: usize) -> Result<Vec<WordStat>> {
        Ok(self.document(doc_id)?.stats.page(offset, limit))
    }

    /// Create a collection. An empty or missing name becomes `Collection {id}`.
    pub fn create_collection(&self, name: Option<&str>) -> Collection {
        let id = self.next_collection_id.fetch_add(1, Ordering::SeqCst);
        let name = match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => format!("Collection {id}"),
        };
        let coll = Collection {
            id,
            name,
            state: CollectionState::new(),
        };
        self.collections
            .write()
            .insert(id, Arc::new(Mutex::new(coll.clone())));
        tracing::info!(collection_id = id, name = %coll.name, "collection created");
        coll
    }

    pub fn collection(&self, collection_id: CollectionId) -> Result<Collection> {
        Ok(self.collection_handle(collection_id)?.lock().clone())
    }

    pub fn collections(&self) -> Vec<Collection> {
        let mut colls: Vec<Collection> = self
            .collection_handles()
            .iter()
            .map(|h| h.lock().clone())
            .collect();
        colls.sort_by_key(|c| c.id);
        colls
    }

    pub fn delete_collection(&self, collection_id: CollectionId) -> Result<Collection> {
        let handle = self
            .collections
            .write()
            .remove(&collection_id)
            .ok_or(Error::CollectionNotFound(collection_id))?;
        tracing::info!(collection_id, "collection deleted");
        let coll = handle.lock().clone();
        Ok(coll)
    }

    pub fn collection_stats(
        &self,
        collection_id: CollectionId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CollectionStat>> {
        Ok(self
            .collection_handle(collection_id)?
            .lock()
            .state
            .page(offset, limit))
    }

    /// Add a document to a collection and return the collection's new state.
    pub fn attach(&self, collection_id: CollectionId, doc_id: DocId) -> Result<CollectionState> {
        let handle = self.collection_handle(collection_id)?;
        let doc = self.document(doc_id)?;

        let mut coll = handle.lock();
        // A concurrent delete may have dropped the document since it was fetched.
        if !self.documents.read().contains_key(&doc_id) {
            return Err(Error::DocumentNotFound(doc_id));
        }
        coll.state = aggregate_add(&coll.state, doc_id, &doc.stats);
        tracing::info!(collection_id, doc_id, total_words = coll.state.total_words, "document attached");
        Ok(coll.state.clone())
    }

    /// Take a document out of a collection and return the collection's new state.
    pub fn detach(&self, collection_id: CollectionId, doc_id: DocId) -> Result<CollectionState> {
        let handle = self.collection_handle(collection_id)?;
        let doc = self.document(doc_id)?;

        let mut coll = handle.lock();
        coll.state = aggregate_remove(&coll.state, doc_id, &doc.stats)?;
        tracing::info!(collection_id, doc_id, total_words = coll.state.total_words, "document detached");
        Ok(coll.state.clone())
    }

    fn collection_handle(&self, collection_id: CollectionId) -> Result<Arc<Mutex<Collection>>> {
        self.collections
            .read()
            .get(&collection_id)
            .cloned()
            .ok_or(Error::CollectionNotFound(collection_id))
    }

    fn collection_handles(&self) -> Vec<Arc<Mutex<Collection>>> {
        self.collections.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_collection_name() {
        let lib = Library::new();
        let c = lib.create_collection(None);
        assert_eq!(c.name, format!("Collection {}", c.id));
        let named = lib.create_collection(Some("papers"));
        assert_eq!(named.name, "papers");
        assert_eq!(lib.create_collection(Some("")).name, "Collection 3");
    }

    #[test]
    fn attach_and_detach() {
        let lib = Library::new();
        let d1 = lib.create_document("one", "x x y").unwrap();
        let d2 = lib.create_document("two", "x z z z w").unwrap();
        let c = lib.create_collection(Some("c"));

        lib.attach(c.id, d1.id).unwrap();
        let state = lib.attach(c.id, d2.id).unwrap();
        assert_eq!(state.total_words, 8);
        assert_eq!(state.stat("x").unwrap().count, 3);
        assert_eq!(state.stat("x").unwrap().word_doc_occurrences, 2);

        let state = lib.detach(c.id, d2.id).unwrap();
        assert_eq!(state.total_words, 3);
        assert!(state.stat("z").is_none());
        assert!(matches!(lib.detach(c.id, d2.id), Err(Error::InconsistentState(_))));
    }

    #[test]
    fn missing_entities() {
        let lib = Library::new();
        let d = lib.create_document("d", "text").unwrap();
        assert_eq!(lib.attach(99, d.id), Err(Error::CollectionNotFound(99)));
        let c = lib.create_collection(None);
        assert_eq!(lib.attach(c.id, 42), Err(Error::DocumentNotFound(42)));
        assert!(matches!(lib.document(42), Err(Error::DocumentNotFound(42))));
    }

    #[test]
    fn deleting_document_detaches_it() {
        let lib = Library::new();
        let d1 = lib.create_document("a", "apple pie").unwrap();
        let d2 = lib.create_document("b", "apple tart").unwrap();
        let c1 = lib.create_collection(None);
        let c2 = lib.create_collection(None);
        for c in [c1.id, c2.id] {
            lib.attach(c, d1.id).unwrap();
            lib.attach(c, d2.id).unwrap();
        }

        lib.delete_document(d1.id).unwrap();
        for c in [c1.id, c2.id] {
            let coll = lib.collection(c).unwrap();
            assert_eq!(coll.state.total_words, 2);
            assert!(coll.state.stat("pie").is_none());
            assert_eq!(coll.state.stat("apple").unwrap().count, 1);
        }
    }

    #[test]
    fn concurrent_attach_on_one_collection() {
        let lib = Library::new();
        let docs: Vec<_> = (0..32)
            .map(|i| lib.create_document(&format!("d{i}"), "shared words plus extra").unwrap())
            .collect();
        let c = lib.create_collection(None);

        std::thread::scope(|s| {
            for doc in &docs {
                let lib = &lib;
                s.spawn(move || lib.attach(c.id, doc.id).unwrap());
            }
        });

        let coll = lib.collection(c.id).unwrap();
        assert_eq!(coll.state.total_words, 32 * 4);
        assert_eq!(coll.state.stat("shared").unwrap().word_doc_occurrences, 32);
        assert_eq!(coll.state.stat("shared").unwrap().idf, 0.0);
    }

    #[test]
    fn snapshot_restores_ids() {
        let lib = Library::new();
        lib.create_document("a", "alpha").unwrap();
        let c = lib.create_collection(None);
        lib.attach(c.id, 1).unwrap();

        let restored = Library::from_snapshot(lib.snapshot());
        assert_eq!(restored.snapshot(), lib.snapshot());
        assert_eq!(restored.create_document("b", "beta").unwrap().id, 2);
    }

    #[test]
    fn metrics_of_empty_library() {
        let m = Library::new().metrics();
        assert_eq!(m, Metrics::default());
        assert_eq!(m.avg_time_processed, 0.0);
        assert!(m.latest_file_processed_timestamp.is_none());
    }

    #[test]
    fn metrics_over_documents() {
        let lib = Library::new();
        lib.create_document("a", "one two three four").unwrap();
        lib.create_document("b", "five six").unwrap();
        lib.create_document("c", "seven").unwrap();

        let m = lib.metrics();
        assert_eq!(m.files_processed, 3);
        assert_eq!(m.avg_words_per_file, 7 / 3);
        assert!(m.min_time_processed <= m.avg_time_processed);
        assert!(m.avg_time_processed <= m.max_time_processed);
        let latest = m.latest_file_processed_timestamp.unwrap();
        assert!(latest > 1_600_000_000.0);
    }

}
