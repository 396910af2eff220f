//! Embedding adapters.
//!
//! Only Ollama is wired today. The configured provider is wrapped in the
//! moka L1 cache unless `cache_size` is 0.

mod cache;
mod ollama;

pub use cache::{CacheStats, CachedEmbedder};
pub use ollama::OllamaEmbedder;

use std::sync::Arc;

use c3rag_core::config::EmbeddingConfig;
use c3rag_core::errors::{RagError, RagResult};
use c3rag_core::traits::IEmbedder;
use tracing::info;

/// Build the configured embedder.
pub fn create_embedder(config: &EmbeddingConfig) -> RagResult<Arc<dyn IEmbedder>> {
    match config.provider.as_str() {
        "ollama" => {
            let provider = OllamaEmbedder::new(config)?;
            provider.warm_up()?;
            info!(provider = "ollama", model = %config.model, "embedding provider ready");
            if config.cache_size == 0 {
                Ok(Arc::new(provider))
            } else {
                Ok(Arc::new(CachedEmbedder::new(provider, config.cache_size)))
            }
        }
        other => Err(RagError::ConfigError(format!(
            "unknown embedding provider: {other}"
        ))),
    }
}
