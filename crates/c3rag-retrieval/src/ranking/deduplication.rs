//! Heuristic deduplication of snippets.
//!
//! Prefix identity is deliberately coarse: two chunks that open the same way
//! collapse even if they diverge later.

use std::collections::HashSet;

use c3rag_core::config::DedupKey;
use c3rag_core::models::SearchResult;

/// Identity of a snippet under the given key strategy.
pub fn dedup_key(text: &str, key: DedupKey) -> String {
    match key {
        DedupKey::Prefix { chars } => {
            let prefix: String = text.chars().take(chars).collect();
            prefix.to_lowercase().trim().to_string()
        }
        DedupKey::ContentHash => {
            let normalized = text.trim().to_lowercase();
            blake3::hash(normalized.as_bytes()).to_hex().to_string()
        }
    }
}

/// Keep the first occurrence of each identity, preserving input order.
pub fn dedup_first_seen(results: Vec<SearchResult>, key: DedupKey) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|r| seen.insert(dedup_key(&r.text, key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_key_is_case_and_whitespace_insensitive() {
        let key = DedupKey::Prefix { chars: 100 };
        assert_eq!(dedup_key("  Sprite Object ", key), dedup_key("sprite object", key));
    }

    #[test]
    fn prefix_counts_characters_not_bytes() {
        let key = DedupKey::Prefix { chars: 2 };
        assert_eq!(dedup_key("精灵对象", key), "精灵");
    }

    #[test]
    fn shared_prefix_collapses_distinct_bodies() {
        let key = DedupKey::Prefix { chars: 5 };
        let results = vec![
            SearchResult::new("Tween behavior A", 0.9, "c3_behaviors"),
            SearchResult::new("tween something else", 0.8, "c3_guide"),
            SearchResult::new("Platform", 0.7, "c3_behaviors"),
        ];
        let kept = dedup_first_seen(results, key);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text, "Tween behavior A");
        assert_eq!(kept[1].text, "Platform");
    }

    #[test]
    fn content_hash_keeps_distinct_bodies() {
        let results = vec![
            SearchResult::new("Tween behavior A", 0.9, "c3_behaviors"),
            SearchResult::new("Tween behavior B", 0.8, "c3_behaviors"),
            SearchResult::new(" tween behavior a ", 0.7, "c3_guide"),
        ];
        let kept = dedup_first_seen(results, DedupKey::ContentHash);
        assert_eq!(kept.len(), 2);
    }
}
