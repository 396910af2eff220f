pub mod defaults;
mod retrieval_config;
mod service_config;

pub use retrieval_config::{DedupKey, RetrievalConfig};
pub use service_config::{EmbeddingConfig, LlmConfig, ObservabilityConfig, VectorStoreConfig};

use serde::{Deserialize, Serialize};

use crate::errors::{RagError, RagResult};
use crate::partitions::{default_partitions, Partition};

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub observability: ObservabilityConfig,
    pub partitions: Vec<Partition>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            vector_store: VectorStoreConfig::default(),
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            retrieval: RetrievalConfig::default(),
            observability: ObservabilityConfig::default(),
            partitions: default_partitions(),
        }
    }
}

impl RagConfig {
    /// Parse a TOML document. Missing sections and fields keep their defaults.
    pub fn from_toml(toml_str: &str) -> RagResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| RagError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the deployment environment variables on top of this config.
    pub fn apply_env_overrides(&mut self) -> RagResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Recognized keys:
    /// `QDRANT_HOST`, `QDRANT_PORT`, `EMBEDDING_MODEL`, `LLM_MODEL`, `LLM_BASE_URL`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> RagResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("QDRANT_HOST") {
            self.vector_store.host = host;
        }
        if let Some(port) = lookup("QDRANT_PORT") {
            self.vector_store.port = port
                .trim()
                .parse()
                .map_err(|_| RagError::ConfigError(format!("QDRANT_PORT is not a port: {port}")))?;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        Ok(())
    }

    fn validate(&self) -> RagResult<()> {
        if self.partitions.is_empty() {
            return Err(RagError::ConfigError(
                "at least one partition must be configured".into(),
            ));
        }
        if self.retrieval.final_k == 0 {
            return Err(RagError::ConfigError("retrieval.final_k must be > 0".into()));
        }
        if let DedupKey::Prefix { chars: 0 } = self.retrieval.rerank_dedup {
            return Err(RagError::ConfigError(
                "retrieval.rerank_dedup prefix must be > 0 chars".into(),
            ));
        }
        if let DedupKey::Prefix { chars: 0 } = self.retrieval.fusion_dedup {
            return Err(RagError::ConfigError(
                "retrieval.fusion_dedup prefix must be > 0 chars".into(),
            ));
        }
        Ok(())
    }
}
