//! Aggregate service health reporting.

mod reporter;

pub use reporter::{HealthReport, HealthReporter, HealthStatus};
