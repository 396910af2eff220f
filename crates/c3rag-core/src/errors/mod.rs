//! Error taxonomy. Gateway adapters produce these; the orchestrator converts
//! them into `RagResponse` values and never hands them to callers.

mod rag_error;

pub use rag_error::{RagError, Service};

/// Convenience alias used throughout the workspace.
pub type RagResult<T> = Result<T, RagError>;
