use std::fmt;

use serde::{Deserialize, Serialize};

/// External collaborator a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    VectorStore,
    LanguageModel,
    Embedder,
}

impl Service {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VectorStore => "vector_store",
            Self::LanguageModel => "language_model",
            Self::Embedder => "embedder",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error for the c3rag workspace.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("{service} unavailable: {reason}")]
    ServiceUnavailable { service: Service, reason: String },

    #[error("no relevant results found for query")]
    NoRelevantResults,

    #[error("answer failed verification: {reason}")]
    LowConfidenceAnswer { reason: String },

    #[error("malformed response from {service}: {reason}")]
    MalformedUpstreamResponse { service: Service, reason: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl RagError {
    pub fn unavailable(service: Service, reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn malformed(service: Service, reason: impl Into<String>) -> Self {
        Self::MalformedUpstreamResponse {
            service,
            reason: reason.into(),
        }
    }

    /// The collaborator this error came from, if any.
    pub fn service(&self) -> Option<Service> {
        match self {
            Self::ServiceUnavailable { service, .. }
            | Self::MalformedUpstreamResponse { service, .. } => Some(*service),
            _ => None,
        }
    }
}
