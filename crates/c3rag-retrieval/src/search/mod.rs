//! Partition fan-out results and rank fusion.

pub mod rrf_fusion;

use c3rag_core::models::SearchResult;

/// Results of a fan-out search, keyed by partition key in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionResults {
    entries: Vec<(String, Vec<SearchResult>)>,
}

impl PartitionResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a partition's results. A repeated key replaces the earlier entry.
    pub fn insert(&mut self, key: impl Into<String>, results: Vec<SearchResult>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = results,
            None => self.entries.push((key, results)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[SearchResult]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SearchResult])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Total result count across partitions.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Highest raw score across partitions, 0 when empty.
    pub fn max_score(&self) -> f64 {
        self.entries
            .iter()
            .flat_map(|(_, v)| v.iter().map(|r| r.score))
            .fold(0.0, f64::max)
    }

    /// Every result, partition by partition.
    pub fn into_flat(self) -> Vec<SearchResult> {
        self.entries.into_iter().flat_map(|(_, v)| v).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_counts() {
        let mut pr = PartitionResults::new();
        pr.insert("guide", vec![SearchResult::new("a", 0.5, "c3_guide")]);
        pr.insert("plugins", vec![]);
        pr.insert(
            "terms",
            vec![
                SearchResult::new("b", 0.8, "c3_terms"),
                SearchResult::new("c", 0.4, "c3_terms"),
            ],
        );
        let keys: Vec<&str> = pr.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["guide", "plugins", "terms"]);
        assert_eq!(pr.total(), 3);
        assert_eq!(pr.get("plugins").map(|r| r.len()), Some(0));
        assert!(pr.get("examples").is_none());
        assert!((pr.max_score() - 0.8).abs() < 1e-9);
        assert_eq!(pr.into_flat().len(), 3);
    }

    #[test]
    fn empty_results_report_zero() {
        let pr = PartitionResults::new();
        assert!(pr.is_empty());
        assert_eq!(pr.max_score(), 0.0);
    }
}
