//! HybridRetriever behavior over stub gateways.

use std::sync::Arc;

use c3rag_core::config::{DedupKey, RetrievalConfig};
use c3rag_core::partitions::{default_partitions, PartitionRegistry};
use c3rag_retrieval::HybridRetriever;
use test_fixtures::stubs::{hit, hit_with};
use test_fixtures::{StubEmbedder, StubVectorStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn retriever_with(store: StubVectorStore, config: RetrievalConfig) -> (HybridRetriever, Arc<StubVectorStore>) {
    let store = Arc::new(store);
    let retriever = HybridRetriever::new(
        Arc::new(StubEmbedder::new()),
        store.clone(),
        PartitionRegistry::new(default_partitions()),
        config,
    );
    (retriever, store)
}

fn retriever(store: StubVectorStore) -> (HybridRetriever, Arc<StubVectorStore>) {
    retriever_with(store, RetrievalConfig::default())
}

// ---------------------------------------------------------------------------
// search_partition / search_all
// ---------------------------------------------------------------------------

#[test]
fn partition_search_uses_partition_defaults() {
    let (r, store) = retriever(
        StubVectorStore::new().with_hits("c3_terms", vec![hit_with("", 0.35, &[("zh", "精灵"), ("en", "Sprite")])]),
    );
    let terms = r.search_terms("精灵");
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].source, "c3_terms");
    assert_eq!(terms[0].meta_str("en"), "Sprite");
    // terms partition: top_k 10, threshold 0.3
    assert_eq!(store.searches()[0], ("c3_terms".to_string(), "精灵".to_string(), 10));
}

#[test]
fn partition_can_be_named_by_collection() {
    let (r, _) = retriever(StubVectorStore::new().with_hits("c3_guide", vec![hit("intro", 0.8)]));
    assert_eq!(r.search_partition("c3_guide", "q", None, None).len(), 1);
    assert_eq!(r.search_partition("guide", "q", None, None).len(), 1);
    assert!(r.search_partition("nonexistent", "q", None, None).is_empty());
}

#[test]
fn search_all_covers_every_partition_in_order() {
    let (r, store) = retriever(
        StubVectorStore::new()
            .with_hits("c3_plugins", vec![hit("sprite", 0.8)])
            .with_hits("c3_examples", vec![hit("{}", 0.7)]),
    );
    let results = r.search_all("sprite", Some(2));
    let keys: Vec<&str> = results.iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec!["guide", "interface", "project", "plugins", "behaviors", "scripting", "terms", "examples"]
    );
    assert_eq!(results.total(), 2);
    assert!(store.searches().iter().all(|(_, _, k)| *k == 2));
}

#[test]
fn failing_partition_degrades_to_empty() {
    let (r, _) = retriever(
        StubVectorStore::new()
            .with_hits("c3_plugins", vec![hit("sprite", 0.8)])
            .with_hits("c3_guide", vec![hit("intro", 0.9)])
            .failing_collection("c3_guide"),
    );
    let results = r.search_all("sprite", None);
    assert_eq!(results.get("guide").map(|v| v.len()), Some(0));
    assert_eq!(results.get("plugins").map(|v| v.len()), Some(1));
}

#[test]
fn embedding_failure_yields_no_results() {
    let store = Arc::new(StubVectorStore::new().with_hits("c3_plugins", vec![hit("sprite", 0.8)]));
    let r = HybridRetriever::new(
        Arc::new(StubEmbedder::failing()),
        store.clone(),
        PartitionRegistry::new(default_partitions()),
        RetrievalConfig::default(),
    );
    assert!(r.search_all("sprite", None).is_empty());
    assert!(r.search_all_with_rerank("sprite", 5, 10).is_empty());
    assert_eq!(store.search_count(), 0);
}

// ---------------------------------------------------------------------------
// Rerank
// ---------------------------------------------------------------------------

#[test]
fn rerank_truncates_and_sorts_descending() {
    let (r, _) = retriever(
        StubVectorStore::new()
            .with_hits("c3_guide", vec![hit("g1", 0.9), hit("g2", 0.7), hit("g3", 0.6)])
            .with_hits("c3_behaviors", vec![hit("b1", 0.8), hit("b2", 0.55)])
            .with_hits("c3_scripting", vec![hit("s1", 0.65), hit("s2", 0.6)]),
    );
    let ranked = r.search_all_with_rerank("q", 5, 3);
    assert_eq!(ranked.len(), 3);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(ranked[0].text, "b1");
    assert!((ranked[0].score - 1.1).abs() < 1e-9);
    assert_eq!(ranked[0].metadata["raw_score"], 0.8);
}

#[test]
fn content_hash_dedup_keeps_distinct_bodies_with_shared_opening() {
    let opening = "Platform 行为让对象像平台游戏角色一样移动。".repeat(10);
    let a = format!("{opening}跳跃");
    let b = format!("{opening}下落");

    let store = || {
        StubVectorStore::new().with_hits("c3_behaviors", vec![hit(&a, 0.9), hit(&b, 0.8)])
    };
    let (prefix, _) = retriever(store());
    assert_eq!(prefix.search_all_with_rerank("q", 5, 10).len(), 1);

    let config = RetrievalConfig {
        rerank_dedup: DedupKey::ContentHash,
        ..RetrievalConfig::default()
    };
    let (hashed, _) = retriever_with(store(), config);
    assert_eq!(hashed.search_all_with_rerank("q", 5, 10).len(), 2);
}

// ---------------------------------------------------------------------------
// Decomposition
// ---------------------------------------------------------------------------

#[test]
fn decomposition_searches_every_sub_query_and_the_original() {
    let (r, store) = retriever(
        StubVectorStore::new()
            .with_query_hits("c3_behaviors", "添加 Platform 行为", vec![hit("platform", 0.9)])
            .with_query_hits("c3_project", "设置跳跃事件", vec![hit("jump event", 0.8)])
            .with_hits("c3_guide", vec![hit("shared intro", 0.7)]),
    );
    let subs = vec!["添加 Platform 行为".to_string(), "设置跳跃事件".to_string()];
    let fused = r.search_with_decomposition(&subs, "做一个平台跳跃游戏", 5, 10);

    assert_eq!(
        store.queries(),
        vec![
            "添加 Platform 行为".to_string(),
            "设置跳跃事件".to_string(),
            "做一个平台跳跃游戏".to_string()
        ]
    );
    let texts: Vec<&str> = fused.iter().map(|x| x.text.as_str()).collect();
    // Retrieved by all three queries, so it fuses highest.
    assert_eq!(texts[0], "shared intro");
    assert!(texts.contains(&"platform"));
    assert!(texts.contains(&"jump event"));
    assert!(fused.iter().all(|x| x.metadata.contains_key("original_score")));
}

#[test]
fn adaptive_helpers_use_configured_floor() {
    let config = RetrievalConfig {
        min_threshold: 0.5,
        ..RetrievalConfig::default()
    };
    let (r, _) = retriever_with(StubVectorStore::new(), config);
    assert_eq!(r.compute_adaptive_threshold(&[]), 0.5);
}
