use c3rag_core::config::DedupKey;
use c3rag_core::models::SearchResult;
use c3rag_core::partitions::{default_partitions, PartitionRegistry};
use c3rag_retrieval::ranking::{dedup_first_seen, normalize_and_boost};
use c3rag_retrieval::{compute_adaptive_threshold, filter_by_adaptive_threshold, reciprocal_rank_fusion};
use proptest::prelude::*;

const FLOOR: f64 = 0.3;

fn results(scores: &[f64]) -> Vec<SearchResult> {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| SearchResult::new(format!("doc-{i}"), *s, "c3_guide"))
        .collect()
}

fn collection() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "c3_guide",
        "c3_plugins",
        "c3_behaviors",
        "c3_project",
        "c3_terms",
    ])
}

proptest! {
    #[test]
    fn threshold_within_floor_and_mean(scores in prop::collection::vec(0.0f64..1.0, 3..40)) {
        let rs = results(&scores);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let t = compute_adaptive_threshold(&rs, FLOOR);
        prop_assert!(t >= FLOOR);
        if mean >= FLOOR {
            prop_assert!(t <= mean + 1e-12, "t = {}, mean = {}", t, mean);
        }
    }

    #[test]
    fn filter_never_drops_below_minimum(
        scores in prop::collection::vec(0.0f64..1.0, 0..30),
        min_results in 0usize..8,
    ) {
        let len = scores.len();
        let kept = filter_by_adaptive_threshold(results(&scores), min_results, FLOOR);
        prop_assert!(kept.len() >= min_results.min(len));
        prop_assert!(kept.len() <= len);
    }

    #[test]
    fn rrf_top_item_in_every_list_wins(
        tails in prop::collection::vec(prop::collection::btree_set("[a-v]{3,12}", 0..8), 1..5),
    ) {
        let lists: Vec<Vec<SearchResult>> = tails
            .iter()
            .map(|tail| {
                let mut list = vec![SearchResult::new("WINNER", 0.5, "c3_guide")];
                list.extend(tail.iter().map(|t| SearchResult::new(t.as_str(), 0.9, "c3_guide")));
                list
            })
            .collect();
        let fused = reciprocal_rank_fusion(&lists, 60, DedupKey::Prefix { chars: 150 });
        prop_assert_eq!(fused[0].text.as_str(), "WINNER");
    }

    #[test]
    fn rrf_output_has_unique_keys_and_descending_scores(
        lists in prop::collection::vec(prop::collection::vec(("[a-d]{1,3}", 0.0f64..1.0), 0..10), 0..5),
    ) {
        let lists: Vec<Vec<SearchResult>> = lists
            .into_iter()
            .map(|l| l.into_iter().map(|(t, s)| SearchResult::new(t, s, "c3_guide")).collect())
            .collect();
        let key = DedupKey::Prefix { chars: 150 };
        let fused = reciprocal_rank_fusion(&lists, 60, key);
        let mut keys: Vec<String> = fused.iter().map(|r| r.text.to_lowercase()).collect();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), fused.len());
        prop_assert!(fused.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn normalized_scores_stay_within_boosted_unit_range(
        hits in prop::collection::vec((collection(), 0.0f64..1.0), 0..40),
    ) {
        let registry = PartitionRegistry::new(default_partitions());
        let input: Vec<SearchResult> = hits
            .iter()
            .enumerate()
            .map(|(i, (c, s))| SearchResult::new(format!("t{i}"), *s, *c))
            .collect();
        let out = normalize_and_boost(input, &registry);
        prop_assert_eq!(out.len(), hits.len());
        for r in &out {
            prop_assert!(r.score >= 0.0);
            prop_assert!(r.score <= registry.boost_for(&r.source) + 1e-12);
        }
    }

    #[test]
    fn dedup_is_idempotent(texts in prop::collection::vec("[a-cA-C ]{0,6}", 0..20)) {
        let input: Vec<SearchResult> = texts
            .iter()
            .map(|t| SearchResult::new(t.as_str(), 0.5, "c3_guide"))
            .collect();
        let key = DedupKey::Prefix { chars: 4 };
        let once = dedup_first_seen(input, key);
        let twice = dedup_first_seen(once.clone(), key);
        prop_assert_eq!(once, twice);
    }
}
