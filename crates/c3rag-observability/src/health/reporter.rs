//! Aggregate health report generation.

use std::collections::BTreeMap;

use c3rag_core::models::ServiceStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::degradation::DegradationTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub services: BTreeMap<String, ServiceStatus>,
    /// Degradations not yet marked recovered.
    pub active_degradations: usize,
    pub generated_at: DateTime<Utc>,
}

/// Builds a [`HealthReport`] from per-service probe results.
pub struct HealthReporter;

impl HealthReporter {
    /// Healthy if every service is up, unhealthy if none is, degraded otherwise.
    pub fn build(services: &BTreeMap<String, ServiceStatus>) -> HealthReport {
        let up = services.values().filter(|s| s.ok).count();
        let overall_status = if services.is_empty() || up == services.len() {
            HealthStatus::Healthy
        } else if up == 0 {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };
        HealthReport {
            overall_status,
            services: services.clone(),
            active_degradations: 0,
            generated_at: Utc::now(),
        }
    }

    /// Like [`HealthReporter::build`], but open degradations downgrade an
    /// otherwise healthy report.
    pub fn build_with_degradations(
        services: &BTreeMap<String, ServiceStatus>,
        tracker: &DegradationTracker,
    ) -> HealthReport {
        let mut report = Self::build(services);
        report.active_degradations = tracker.active_degradations().len();
        if report.active_degradations > 0 && report.overall_status == HealthStatus::Healthy {
            report.overall_status = HealthStatus::Degraded;
        }
        report
    }
}
