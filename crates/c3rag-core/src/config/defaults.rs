// Single source of truth for all default values.

// --- Vector store ---
pub const DEFAULT_QDRANT_HOST: &str = "localhost";
pub const DEFAULT_QDRANT_PORT: u16 = 6333;
pub const DEFAULT_VECTOR_STORE_TIMEOUT_SECS: u64 = 10;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "ollama";
pub const DEFAULT_EMBEDDING_MODEL: &str = "bge-m3";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1024;
pub const DEFAULT_EMBEDDING_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;

// --- Language model ---
pub const DEFAULT_LLM_MODEL: &str = "qwen3:30b";
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

// --- Retrieval ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_PER_PARTITION_K: usize = 5;
pub const DEFAULT_FINAL_K: usize = 10;
pub const DEFAULT_EXPANDED_PER_PARTITION_K: usize = 10;
pub const DEFAULT_EXPANDED_FINAL_K: usize = 20;
pub const DEFAULT_ADAPTIVE_MIN_RESULTS: usize = 2;
pub const DEFAULT_COMPLEX_MIN_RESULTS: usize = 5;
pub const DEFAULT_RERANK_DEDUP_CHARS: usize = 100;
pub const DEFAULT_FUSION_DEDUP_CHARS: usize = 150;
pub const DEFAULT_QUERY_REWRITE: bool = true;
pub const DEFAULT_CODE_EXAMPLES_K: usize = 5;
pub const DEFAULT_CHAT_PER_PARTITION_K: usize = 2;

// --- Partitions ---
pub const DEFAULT_PARTITION_TOP_K: usize = 5;
pub const DEFAULT_TERMS_TOP_K: usize = 10;
pub const DEFAULT_TERMS_SCORE_THRESHOLD: f64 = 0.3;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
