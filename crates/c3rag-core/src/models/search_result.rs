use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Provenance attached to a snippet (origin document, heading, tags).
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Raw hit returned by a vector store, before it is attributed to a partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub text: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A retrieved snippet. `score` is partition-relative until reranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub score: f64,
    /// Collection the hit came from.
    pub source: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl SearchResult {
    pub fn new(text: impl Into<String>, score: f64, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            score,
            source: source.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn from_hit(hit: VectorHit, source: &str) -> Self {
        Self {
            text: hit.text,
            score: hit.score,
            source: source.to_string(),
            metadata: hit.metadata,
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Same snippet carrying a different score.
    pub fn rescored(&self, score: f64) -> Self {
        Self {
            score,
            ..self.clone()
        }
    }

    /// String metadata value, empty when absent or not a string.
    pub fn meta_str(&self, key: &str) -> &str {
        self.metadata
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}

/// Sort descending by score. Equal scores keep their input order.
pub fn sort_by_score_desc(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
