use serde::{Deserialize, Serialize};

use super::defaults;

/// Qdrant connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub host: String,
    pub port: u16,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl VectorStoreConfig {
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_QDRANT_HOST.to_string(),
            port: defaults::DEFAULT_QDRANT_PORT,
            timeout_secs: defaults::DEFAULT_VECTOR_STORE_TIMEOUT_SECS,
        }
    }
}

/// Embedding endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider: "ollama".
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Expected vector width; mismatching embeddings are rejected. 0 accepts any.
    pub dimensions: usize,
    /// L1 in-memory cache max entries. 0 disables the cache.
    pub cache_size: u64,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            model: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: defaults::DEFAULT_LLM_BASE_URL.to_string(),
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            cache_size: defaults::DEFAULT_EMBEDDING_CACHE_SIZE,
            timeout_secs: defaults::DEFAULT_EMBEDDING_TIMEOUT_SECS,
        }
    }
}

/// Chat model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    /// Timeout for a full (non-streaming) generation.
    pub timeout_secs: u64,
    /// Timeout for health probes.
    pub health_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_LLM_MODEL.to_string(),
            base_url: defaults::DEFAULT_LLM_BASE_URL.to_string(),
            timeout_secs: defaults::DEFAULT_LLM_TIMEOUT_SECS,
            health_timeout_secs: defaults::DEFAULT_HEALTH_TIMEOUT_SECS,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json_logs: defaults::DEFAULT_JSON_LOGS,
        }
    }
}
