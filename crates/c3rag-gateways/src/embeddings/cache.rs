//! L1 in-memory embedding cache using moka.
//!
//! Keys are blake3 hashes of model name and text, so switching models never
//! serves stale vectors.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use c3rag_core::errors::RagResult;
use c3rag_core::traits::IEmbedder;
use moka::sync::Cache;
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct CachedEmbedder<E> {
    inner: E,
    cache: Cache<String, Vec<f32>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: IEmbedder> CachedEmbedder<E> {
    pub fn new(inner: E, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600))
            .build();
        Self {
            inner,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn key(&self, text: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.inner.name().as_bytes());
        hasher.update(&[0]);
        hasher.update(text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: IEmbedder> IEmbedder for CachedEmbedder<E> {
    fn encode(&self, text: &str) -> RagResult<Vec<f32>> {
        let key = self.key(text);
        if let Some(hit) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "embedding cache hit");
            return Ok(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let vector = self.inner.encode(text)?;
        self.cache.insert(key, vector.clone());
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
