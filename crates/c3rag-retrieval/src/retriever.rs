//! HybridRetriever: multi-partition search over the gateway traits.
//!
//! Gateway failures never escape this type. A failed embedding or search is
//! logged and treated as "no results" for the affected partition.

use std::sync::Arc;
use std::time::Instant;

use c3rag_core::config::RetrievalConfig;
use c3rag_core::models::{sort_by_score_desc, SearchResult};
use c3rag_core::partitions::{Partition, PartitionRegistry, EXAMPLES, TERMS};
use c3rag_core::traits::{IEmbedder, IVectorStore};
use tracing::{debug, info, warn};

use crate::ranking::{adaptive, dedup_first_seen, normalize_and_boost};
use crate::search::{rrf_fusion, PartitionResults};

pub struct HybridRetriever {
    embedder: Arc<dyn IEmbedder>,
    store: Arc<dyn IVectorStore>,
    registry: PartitionRegistry,
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(
        embedder: Arc<dyn IEmbedder>,
        store: Arc<dyn IVectorStore>,
        registry: PartitionRegistry,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &PartitionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn IVectorStore> {
        &self.store
    }

    fn embed(&self, query: &str) -> Option<Vec<f32>> {
        match self.embedder.encode(query) {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(error = %e, embedder = self.embedder.name(), "query embedding failed");
                None
            }
        }
    }

    fn search_with_vector(
        &self,
        partition: &Partition,
        vector: &[f32],
        k: usize,
        threshold: f64,
    ) -> Vec<SearchResult> {
        match self.store.search(&partition.collection, vector, k, threshold) {
            Ok(hits) => hits
                .into_iter()
                .map(|hit| SearchResult::from_hit(hit, &partition.collection))
                .collect(),
            Err(e) => {
                warn!(
                    partition = %partition.key,
                    collection = %partition.collection,
                    error = %e,
                    "partition search failed"
                );
                Vec::new()
            }
        }
    }

    /// Search one partition by key (or collection name). `k` and `threshold`
    /// default to the partition's own settings.
    pub fn search_partition(
        &self,
        name: &str,
        query: &str,
        k: Option<usize>,
        threshold: Option<f64>,
    ) -> Vec<SearchResult> {
        let Some(partition) = self
            .registry
            .get(name)
            .or_else(|| self.registry.by_collection(name))
        else {
            warn!(partition = name, "unknown partition");
            return Vec::new();
        };
        let Some(vector) = self.embed(query) else {
            return Vec::new();
        };
        self.search_with_vector(
            partition,
            &vector,
            k.unwrap_or(partition.top_k),
            threshold.unwrap_or(partition.score_threshold),
        )
    }

    /// Fan out over every partition. The query is embedded once.
    pub fn search_all(&self, query: &str, k_per_partition: Option<usize>) -> PartitionResults {
        let started = Instant::now();
        let mut out = PartitionResults::new();
        let vector = self.embed(query);
        for partition in self.registry.iter() {
            let results = match &vector {
                Some(v) => self.search_with_vector(
                    partition,
                    v,
                    k_per_partition.unwrap_or(partition.top_k),
                    partition.score_threshold,
                ),
                None => Vec::new(),
            };
            out.insert(partition.key.clone(), results);
        }
        debug!(
            partitions = self.registry.len(),
            results = out.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fan-out search complete"
        );
        out
    }

    /// Fan out, normalize per partition, boost, dedup, sort, truncate.
    pub fn search_all_with_rerank(
        &self,
        query: &str,
        k_per_partition: usize,
        final_k: usize,
    ) -> Vec<SearchResult> {
        let started = Instant::now();
        let raw = self.search_all(query, Some(k_per_partition)).into_flat();
        let candidates = raw.len();

        let normalized = normalize_and_boost(raw, &self.registry);
        let mut ranked = dedup_first_seen(normalized, self.config.rerank_dedup);
        sort_by_score_desc(&mut ranked);
        ranked.truncate(final_k);

        info!(
            candidates,
            returned = ranked.len(),
            final_k,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reranked retrieval complete"
        );
        ranked
    }

    /// Glossary lookup in the terms partition.
    pub fn search_terms(&self, query: &str) -> Vec<SearchResult> {
        self.search_partition(TERMS, query, None, None)
    }

    /// Example projects for code generation.
    pub fn search_examples(&self, query: &str, k: usize) -> Vec<SearchResult> {
        self.search_partition(EXAMPLES, query, Some(k), None)
    }

    pub fn compute_adaptive_threshold(&self, results: &[SearchResult]) -> f64 {
        adaptive::compute_adaptive_threshold(results, self.config.min_threshold)
    }

    pub fn filter_by_adaptive_threshold(
        &self,
        results: Vec<SearchResult>,
        min_results: usize,
    ) -> Vec<SearchResult> {
        adaptive::filter_by_adaptive_threshold(results, min_results, self.config.min_threshold)
    }

    /// RRF with the configured k and fusion dedup key.
    pub fn reciprocal_rank_fusion(&self, ranked_lists: &[Vec<SearchResult>]) -> Vec<SearchResult> {
        rrf_fusion::reciprocal_rank_fusion(
            ranked_lists,
            self.config.rrf_k,
            self.config.fusion_dedup,
        )
    }

    /// Rerank-retrieve every sub-query and the original query, then fuse.
    pub fn search_with_decomposition(
        &self,
        sub_queries: &[String],
        original: &str,
        k_per_partition: usize,
        final_k: usize,
    ) -> Vec<SearchResult> {
        let mut lists: Vec<Vec<SearchResult>> = sub_queries
            .iter()
            .map(|q| self.search_all_with_rerank(q, k_per_partition, final_k))
            .collect();
        lists.push(self.search_all_with_rerank(original, k_per_partition, final_k));
        let mut fused = self.reciprocal_rank_fusion(&lists);
        fused.truncate(final_k);
        debug!(
            sub_queries = sub_queries.len(),
            fused = fused.len(),
            "decomposed retrieval fused"
        );
        fused
    }
}
