//! # c3rag-orchestrator
//!
//! Turns a question into a verified, cited answer.
//!
//! ## Architecture
//!
//! ```text
//! AnswerOrchestrator
//! ├── Classification (IQueryClassifier; KeywordClassifier by default)
//! ├── Expansion (LLM rewrites and sub-queries)
//! ├── HybridRetriever (c3rag-retrieval)
//! ├── Prompts (strict citation, low relevance, event generation)
//! ├── Reflection (structured verdict parser + citation audit)
//! └── Degradation (fallback responses, DegradationTracker)
//! ```

pub mod classification;
pub mod engine;
pub mod expansion;
pub mod prompts;
pub mod reflection;

pub use classification::KeywordClassifier;
pub use engine::AnswerOrchestrator;
pub use reflection::{audit_citations, parse_verification};
