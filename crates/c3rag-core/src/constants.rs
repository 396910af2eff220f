/// c3rag version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Floor for the adaptive relevance threshold.
pub const MIN_SCORE_THRESHOLD: f64 = 0.3;

/// Default per-partition similarity cutoff passed to the vector store.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

/// Below this many results the adaptive threshold is not computed.
pub const ADAPTIVE_MIN_SAMPLE: usize = 3;

/// Weight of the standard deviation subtracted from the mean.
pub const ADAPTIVE_STDDEV_WEIGHT: f64 = 0.5;

/// Fewer results than this selects the cautious low-relevance prompt.
pub const MIN_RESULTS_FOR_CONFIDENT_PROMPT: usize = 3;

/// Characters of snippet text kept in a `SourceRef`.
pub const SOURCE_PREVIEW_CHARS: usize = 100;

/// Upper bound on query rewrites requested from the model.
pub const MAX_QUERY_REWRITES: usize = 3;

/// Sub-query bounds for decomposition.
pub const MIN_SUB_QUERIES: usize = 2;
pub const MAX_SUB_QUERIES: usize = 4;

/// Service names used in health maps.
pub const SERVICE_VECTOR_STORE: &str = "vector_store";
pub const SERVICE_LANGUAGE_MODEL: &str = "language_model";
