//! Adaptive relevance threshold derived from the score distribution.

use c3rag_core::constants::{ADAPTIVE_MIN_SAMPLE, ADAPTIVE_STDDEV_WEIGHT};
use c3rag_core::models::{sort_by_score_desc, SearchResult};

/// `mean - 0.5 * sample_stddev`, clamped to `[floor, mean]`. When the mean
/// itself is below the floor, the floor wins. Too few results to estimate a
/// spread yields the floor.
pub fn compute_adaptive_threshold(results: &[SearchResult], floor: f64) -> f64 {
    if results.len() < ADAPTIVE_MIN_SAMPLE {
        return floor;
    }
    let n = results.len() as f64;
    let mean = results.iter().map(|r| r.score).sum::<f64>() / n;
    let variance = results
        .iter()
        .map(|r| (r.score - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let threshold = mean - ADAPTIVE_STDDEV_WEIGHT * variance.sqrt();
    floor.max(threshold.min(mean))
}

/// Drop results under the adaptive threshold, but never return fewer than
/// `min(min_results, len)`. Survivors keep their input order; the backfill
/// case returns the top `min_results` by score.
pub fn filter_by_adaptive_threshold(
    results: Vec<SearchResult>,
    min_results: usize,
    floor: f64,
) -> Vec<SearchResult> {
    if results.len() <= min_results {
        return results;
    }
    let threshold = compute_adaptive_threshold(&results, floor);
    let kept: Vec<SearchResult> = results
        .iter()
        .filter(|r| r.score >= threshold)
        .cloned()
        .collect();
    if kept.len() >= min_results {
        return kept;
    }
    let mut ranked = results;
    sort_by_score_desc(&mut ranked);
    ranked.truncate(min_results);
    ranked
}
