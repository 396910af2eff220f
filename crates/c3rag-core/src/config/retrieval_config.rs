use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::MIN_SCORE_THRESHOLD;

/// Identity used when collapsing duplicate snippets.
///
/// `Prefix` compares a lower-cased, trimmed prefix of the text measured in
/// characters. It is coarse: snippets that share an opening are merged even
/// when their bodies differ. `ContentHash` compares a hash of the whole
/// normalized text instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DedupKey {
    Prefix { chars: usize },
    ContentHash,
}

/// Retrieval subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// RRF k-value for rank fusion.
    pub rrf_k: u32,
    /// Results fetched from each partition before reranking.
    pub per_partition_k: usize,
    /// Results kept after cross-partition reranking.
    pub final_k: usize,
    /// Per-partition budget on the expand-retry pass.
    pub expanded_per_partition_k: usize,
    /// Final budget on the expand-retry pass.
    pub expanded_final_k: usize,
    /// Floor for the adaptive threshold.
    pub min_threshold: f64,
    /// Minimum results kept by the adaptive filter on the fallback path.
    pub adaptive_min_results: usize,
    /// Minimum results kept by the adaptive filter on the decomposition path.
    pub complex_min_results: usize,
    /// Dedup identity for cross-partition reranking.
    pub rerank_dedup: DedupKey,
    /// Dedup identity for rank fusion.
    pub fusion_dedup: DedupKey,
    /// Ask the model for alternative phrasings when retrieval comes back empty.
    pub query_rewrite: bool,
    /// Results fetched from the examples partition for code requests.
    pub code_examples_k: usize,
    /// Per-partition budget for the chat path.
    pub chat_per_partition_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            per_partition_k: defaults::DEFAULT_PER_PARTITION_K,
            final_k: defaults::DEFAULT_FINAL_K,
            expanded_per_partition_k: defaults::DEFAULT_EXPANDED_PER_PARTITION_K,
            expanded_final_k: defaults::DEFAULT_EXPANDED_FINAL_K,
            min_threshold: MIN_SCORE_THRESHOLD,
            adaptive_min_results: defaults::DEFAULT_ADAPTIVE_MIN_RESULTS,
            complex_min_results: defaults::DEFAULT_COMPLEX_MIN_RESULTS,
            rerank_dedup: DedupKey::Prefix {
                chars: defaults::DEFAULT_RERANK_DEDUP_CHARS,
            },
            fusion_dedup: DedupKey::Prefix {
                chars: defaults::DEFAULT_FUSION_DEDUP_CHARS,
            },
            query_rewrite: defaults::DEFAULT_QUERY_REWRITE,
            code_examples_k: defaults::DEFAULT_CODE_EXAMPLES_K,
            chat_per_partition_k: defaults::DEFAULT_CHAT_PER_PARTITION_K,
        }
    }
}
