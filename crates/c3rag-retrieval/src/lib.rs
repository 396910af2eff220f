//! # c3rag-retrieval
//!
//! Evidence gathering across the knowledge partitions. Raw similarity scores
//! are only comparable inside one partition, so everything that mixes
//! partitions goes through normalization or rank fusion first.
//!
//! ## Architecture
//!
//! ```text
//! HybridRetriever
//! ├── Search
//! │   ├── Partition search (embed once, fan out)
//! │   └── RRF Fusion (prefix-keyed, rank based)
//! ├── Ranking
//! │   ├── Normalization (per-partition min-max + authority boost)
//! │   ├── Deduplication (prefix or content hash)
//! │   └── Adaptive threshold (mean - 0.5 * stddev)
//! └── Context
//!     ├── Grouped context (chat path)
//!     └── Numbered evidence blocks (citation prompts)
//! ```

pub mod context;
pub mod ranking;
pub mod retriever;
pub mod search;

pub use context::{format_context, format_evidence_blocks};
pub use ranking::adaptive::{compute_adaptive_threshold, filter_by_adaptive_threshold};
pub use retriever::HybridRetriever;
pub use search::rrf_fusion::reciprocal_rank_fusion;
pub use search::PartitionResults;
