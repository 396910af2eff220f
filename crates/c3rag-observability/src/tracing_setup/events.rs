//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a completed retrieval pass.
pub fn retrieval_completed(path: &str, results: usize, elapsed_ms: u64) {
    tracing::info!(
        event = "retrieval_completed",
        path = %path,
        results = results,
        elapsed_ms = elapsed_ms,
        "retrieval completed"
    );
}

/// Log the route chosen for a query.
pub fn query_classified(route: &str, complex: bool) {
    tracing::debug!(
        event = "query_classified",
        route = %route,
        complex = complex,
        "query classified"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// Log a self-verification verdict.
pub fn reflection_verdict(attempt: u32, verdict: &str, issues: usize, parsed_from: &str) {
    tracing::info!(
        event = "reflection_verdict",
        attempt = attempt,
        verdict = %verdict,
        issues = issues,
        parsed_from = %parsed_from,
        "answer reflected"
    );
}

/// Log a response produced by a degraded path.
pub fn fallback_engaged(query_type: &str, reason: &str) {
    tracing::warn!(
        event = "fallback_engaged",
        query_type = %query_type,
        reason = %reason,
        "fallback response"
    );
}

/// Log the end of a generation stream.
pub fn stream_released(path: &str, end: &str) {
    tracing::debug!(
        event = "stream_released",
        path = %path,
        end = %end,
        "generation stream released"
    );
}

/// Log the final shape of a response.
pub fn answer_completed(query_type: &str, confidence: &str, sources: usize, elapsed_ms: u64) {
    tracing::info!(
        event = "answer_completed",
        query_type = %query_type,
        confidence = %confidence,
        sources = sources,
        elapsed_ms = elapsed_ms,
        "answer completed"
    );
}
