//! Reciprocal Rank Fusion: score = Σ 1/(k + rank + 1), rank 0-based.
//!
//! Combines ranked lists whose raw scores are not comparable. Items are
//! identified by their dedup key, so the same snippet retrieved by two
//! sub-queries accumulates score instead of appearing twice.

use std::collections::HashMap;

use c3rag_core::config::DedupKey;
use c3rag_core::models::{sort_by_score_desc, SearchResult};

use crate::ranking::dedup_key;

/// Metadata key holding the representative's pre-fusion score.
pub const ORIGINAL_SCORE_KEY: &str = "original_score";

struct Fused {
    score: f64,
    representative: SearchResult,
}

/// Fuse ranked lists. The representative for an identity is the occurrence
/// with the highest original score; its output score is the fused score.
/// Output is sorted descending, ties in first-seen order.
pub fn reciprocal_rank_fusion(
    ranked_lists: &[Vec<SearchResult>],
    k: u32,
    key: DedupKey,
) -> Vec<SearchResult> {
    let mut fused: Vec<Fused> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for list in ranked_lists {
        for (rank, result) in list.iter().enumerate() {
            let rrf = 1.0 / (k as f64 + rank as f64 + 1.0);
            let id = dedup_key(&result.text, key);
            match index.get(&id) {
                Some(&i) => {
                    let entry = &mut fused[i];
                    entry.score += rrf;
                    if result.score > entry.representative.score {
                        entry.representative = result.clone();
                    }
                }
                None => {
                    index.insert(id, fused.len());
                    fused.push(Fused {
                        score: rrf,
                        representative: result.clone(),
                    });
                }
            }
        }
    }

    let mut out: Vec<SearchResult> = fused
        .into_iter()
        .map(|f| {
            let original = f.representative.score;
            let mut r = f.representative.rescored(f.score);
            r.metadata
                .insert(ORIGINAL_SCORE_KEY.to_string(), original.into());
            r
        })
        .collect();
    sort_by_score_desc(&mut out);
    out
}
