//! # c3rag-observability
//!
//! Structured tracing setup, event helpers, degradation tracking, and the
//! service health report.

pub mod degradation;
pub mod health;
pub mod tracing_setup;

pub use degradation::{DegradationEvent, DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use health::{HealthReport, HealthReporter, HealthStatus};
