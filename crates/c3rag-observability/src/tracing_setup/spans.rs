//! Span definitions per operation.

/// Create an answer span.
#[macro_export]
macro_rules! answer_span {
    ($path:expr, $query_chars:expr) => {
        tracing::info_span!("c3rag.answer", path = %$path, query_chars = $query_chars)
    };
}

/// Create a retrieval span.
#[macro_export]
macro_rules! retrieval_span {
    ($k_per_partition:expr, $final_k:expr) => {
        tracing::info_span!(
            "c3rag.retrieval",
            k_per_partition = $k_per_partition,
            final_k = $final_k
        )
    };
}

/// Create a reflection span.
#[macro_export]
macro_rules! reflection_span {
    ($attempt:expr) => {
        tracing::info_span!("c3rag.reflection", attempt = $attempt)
    };
}

