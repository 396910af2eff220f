//! # c3rag-core
//!
//! Foundation crate for the c3rag assistant.
//! Defines the shared types, gateway traits, errors, config, and the
//! partition registry. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod partitions;
pub mod stream;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::RagConfig;
pub use errors::{RagError, RagResult, Service};
pub use models::{
    ConfidenceLevel, Metadata, QueryRoute, QueryType, RagResponse, SearchResult, ServiceStatus,
    SourceRef, VectorHit,
};
pub use partitions::{Partition, PartitionRegistry};
pub use stream::{StreamEnd, TextStream};
