use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use c3rag_core::config::{DedupKey, RetrievalConfig};
use c3rag_core::models::{SearchResult, VectorHit};
use c3rag_core::partitions::{default_partitions, PartitionRegistry};
use c3rag_retrieval::{reciprocal_rank_fusion, HybridRetriever};
use test_fixtures::{StubEmbedder, StubVectorStore};

/// Eight partitions with 20 hits each, scores spread over [0.5, 1.0).
fn populated_store() -> StubVectorStore {
    let mut store = StubVectorStore::new();
    for (p, partition) in default_partitions().iter().enumerate() {
        let hits: Vec<VectorHit> = (0..20)
            .map(|i| VectorHit {
                text: format!("{} 文档片段 {i} 关于 Sprite 与事件表的说明", partition.key),
                score: 0.5 + ((i * 7 + p * 3) % 50) as f64 / 100.0,
                metadata: Default::default(),
            })
            .collect();
        store = store.with_hits(&partition.collection, hits);
    }
    store
}

fn bench_rerank(c: &mut Criterion) {
    let retriever = HybridRetriever::new(
        Arc::new(StubEmbedder::new()),
        Arc::new(populated_store()),
        PartitionRegistry::new(default_partitions()),
        RetrievalConfig::default(),
    );

    c.bench_function("rerank_8_partitions_x20", |b| {
        b.iter(|| retriever.search_all_with_rerank("Sprite 动画", 20, 10));
    });
}

fn bench_rrf(c: &mut Criterion) {
    let lists: Vec<Vec<SearchResult>> = (0..4)
        .map(|l| {
            (0..50)
                .map(|i| SearchResult::new(format!("snippet {}", (i * (l + 1)) % 70), 0.9, "c3_guide"))
                .collect()
        })
        .collect();

    c.bench_function("rrf_4_lists_x50", |b| {
        b.iter(|| reciprocal_rank_fusion(&lists, 60, DedupKey::Prefix { chars: 150 }));
    });

    c.bench_function("rrf_4_lists_x50_content_hash", |b| {
        b.iter(|| reciprocal_rank_fusion(&lists, 60, DedupKey::ContentHash));
    });
}

criterion_group!(benches, bench_rerank, bench_rrf);
criterion_main!(benches);
