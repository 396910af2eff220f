//! Golden dataset tests for c3rag-retrieval.

use std::sync::Arc;

use c3rag_core::config::{DedupKey, RetrievalConfig};
use c3rag_core::models::{SearchResult, VectorHit};
use c3rag_core::partitions::{default_partitions, PartitionRegistry};
use c3rag_retrieval::{filter_by_adaptive_threshold, reciprocal_rank_fusion, HybridRetriever};
use serde_json::Value;
use test_fixtures::{load_fixture_value, StubEmbedder, StubVectorStore};

fn hits_from(value: &Value) -> Vec<VectorHit> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| VectorHit {
            text: h["text"].as_str().unwrap().to_string(),
            score: h["score"].as_f64().unwrap(),
            metadata: Default::default(),
        })
        .collect()
}

fn f64s(value: &Value) -> Vec<f64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[test]
fn golden_rerank_mixed() {
    let fixture = load_fixture_value("golden/retrieval/rerank_mixed.json");
    let input = &fixture["input"];

    let mut store = StubVectorStore::new();
    for (collection, hits) in input["hits"].as_object().unwrap() {
        store = store.with_hits(collection, hits_from(hits));
    }
    let retriever = HybridRetriever::new(
        Arc::new(StubEmbedder::new()),
        Arc::new(store),
        PartitionRegistry::new(default_partitions()),
        RetrievalConfig::default(),
    );

    let ranked = retriever.search_all_with_rerank(
        input["query"].as_str().unwrap(),
        input["k_per_partition"].as_u64().unwrap() as usize,
        input["final_k"].as_u64().unwrap() as usize,
    );

    let expected = &fixture["expected"];
    let order: Vec<&str> = ranked.iter().map(|r| r.text.as_str()).collect();
    let expected_order: Vec<&str> = expected["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(order, expected_order);

    let sources: Vec<&str> = ranked.iter().map(|r| r.source.as_str()).collect();
    let expected_sources: Vec<&str> = expected["sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(sources, expected_sources);

    for (got, want) in ranked.iter().zip(f64s(&expected["scores"])) {
        assert!((got.score - want).abs() < 1e-9, "{} != {}", got.score, want);
    }
}

#[test]
fn golden_adaptive_filter() {
    let fixture = load_fixture_value("golden/retrieval/adaptive_filter.json");
    for case in fixture["cases"].as_array().unwrap() {
        let results: Vec<SearchResult> = f64s(&case["scores"])
            .into_iter()
            .enumerate()
            .map(|(i, s)| SearchResult::new(format!("r{i}"), s, "c3_guide"))
            .collect();
        let min_results = case["min_results"].as_u64().unwrap() as usize;
        let kept: Vec<f64> = filter_by_adaptive_threshold(results, min_results, 0.3)
            .iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(kept, f64s(&case["kept"]), "case {case}");
    }
}

#[test]
fn golden_rrf_fusion() {
    let fixture = load_fixture_value("golden/retrieval/rrf_fusion.json");
    let input = &fixture["input"];
    let lists: Vec<Vec<SearchResult>> = input["lists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| {
            hits_from(l)
                .into_iter()
                .map(|h| SearchResult::from_hit(h, "c3_guide"))
                .collect()
        })
        .collect();
    let fused = reciprocal_rank_fusion(
        &lists,
        input["k"].as_u64().unwrap() as u32,
        DedupKey::Prefix { chars: 150 },
    );

    let order: Vec<&str> = fused.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C", "D"]);
    let originals: Vec<f64> = fused
        .iter()
        .map(|r| r.metadata["original_score"].as_f64().unwrap())
        .collect();
    assert_eq!(originals, f64s(&fixture["expected"]["original_scores"]));
}
