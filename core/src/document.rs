use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::huffman::{build_codec, decode, Codebook};
use crate::stats::DocumentStats;
use crate::DocId;

/// A document as it is stored once ingested: the raw text plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocId,
    pub name: String,
    pub text: String,
    pub length: usize,
    pub codebook: Codebook,
    /// Huffman content: the text encoded as a string of '0'/'1'.
    pub huffman: String,
    pub stats: DocumentStats,
    /// Seconds spent deriving the record, rounded to milliseconds.
    pub process_time: f64,
    /// Ingestion time, RFC 3339 in UTC.
    pub created_at: String,
}

impl DocumentRecord {
    pub fn ingest(id: DocId, name: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }
        let start = Instant::now();

        let stats = DocumentStats::compute(&text);
        let encoded = build_codec(&text)?;

        let process_time = (start.elapsed().as_secs_f64() * 1000.0).round() / 1000.0;
        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into());
        Ok(Self {
            id,
            name: name.into(),
            length: stats.length,
            codebook: encoded.codebook,
            huffman: encoded.bits,
            stats,
            text,
            process_time,
            created_at,
        })
    }

    /// Ingest `(id, name, text)` triples in parallel. Results keep the input order.
    pub fn ingest_many(inputs: Vec<(DocId, String, String)>) -> Vec<Result<Self>> {
        inputs
            .into_par_iter()
            .map(|(id, name, text)| Self::ingest(id, name, text))
            .collect()
    }

    /// Decode the stored Huffman content back to text.
    pub fn decode_huffman(&self) -> Result<String> {
        decode(&self.huffman, &self.codebook)
    }
}
