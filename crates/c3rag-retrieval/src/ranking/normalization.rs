//! Per-partition min-max normalization followed by the authority boost.

use std::collections::HashMap;

use c3rag_core::models::SearchResult;
use c3rag_core::partitions::PartitionRegistry;

/// Metadata key holding the score the vector store returned.
pub const RAW_SCORE_KEY: &str = "raw_score";

/// Rescale every result into its partition's [0, 1] range, then multiply by
/// the partition boost. A partition whose scores are all equal keeps the raw
/// score when positive and drops to 0 otherwise. Order is preserved.
pub fn normalize_and_boost(
    results: Vec<SearchResult>,
    registry: &PartitionRegistry,
) -> Vec<SearchResult> {
    let mut ranges: HashMap<String, (f64, f64)> = HashMap::new();
    for r in &results {
        let entry = ranges
            .entry(r.source.clone())
            .or_insert((f64::INFINITY, f64::NEG_INFINITY));
        entry.0 = entry.0.min(r.score);
        entry.1 = entry.1.max(r.score);
    }

    results
        .into_iter()
        .map(|r| {
            let (min, max) = ranges.get(&r.source).copied().unwrap_or((r.score, r.score));
            let normalized = if max > min {
                (r.score - min) / (max - min)
            } else if r.score > 0.0 {
                r.score
            } else {
                0.0
            };
            let boosted = normalized * registry.boost_for(&r.source);
            let raw = r.score;
            let mut out = r.rescored(boosted);
            out.metadata.insert(RAW_SCORE_KEY.to_string(), raw.into());
            out
        })
        .collect()
}
