use std::fmt;

use serde::{Deserialize, Serialize};

use super::search_result::{Metadata, SearchResult};
use crate::constants::SOURCE_PREVIEW_CHARS;

/// Coarse reliability label attached to a synthesized answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// No usable evidence.
    None,
    /// A dependency degraded.
    Low,
    /// Generated but unverified, or failed self-check.
    Medium,
    /// Self-verified against cited evidence.
    High,
}

impl ConfidenceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag describing which path produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Qa,
    Code,
    QaLowConfidence,
    QaNoResults,
    QaComplexWorkflow,
    FallbackLlmUnavailable,
    FallbackQdrantUnavailable,
    Chat,
}

impl QueryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qa => "qa",
            Self::Code => "code",
            Self::QaLowConfidence => "qa_low_confidence",
            Self::QaNoResults => "qa_no_results",
            Self::QaComplexWorkflow => "qa_complex_workflow",
            Self::FallbackLlmUnavailable => "fallback_llm_unavailable",
            Self::FallbackQdrantUnavailable => "fallback_qdrant_unavailable",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for QueryType {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Route chosen by a query classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryRoute {
    Qa,
    Code,
}

/// A piece of evidence as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// 1-based evidence number, as cited in the answer.
    pub id: usize,
    pub partition: String,
    /// Snippet preview.
    pub text: String,
    pub score: f64,
    pub metadata: Metadata,
}

impl SourceRef {
    pub fn from_result(id: usize, result: &SearchResult) -> Self {
        Self {
            id,
            partition: result.source.clone(),
            text: preview(&result.text, SOURCE_PREVIEW_CHARS),
            score: result.score,
            metadata: result.metadata.clone(),
        }
    }
}

/// Truncate to `max_chars` characters, marking the cut with "...".
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// The only value any answer entry point returns. Failures are encoded in
/// `query_type`, `confidence`, and `verification_notes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub query_type: QueryType,
    pub confidence: ConfidenceLevel,
    #[serde(default)]
    pub verification_notes: Vec<String>,
}

impl RagResponse {
    pub fn new(answer: impl Into<String>, query_type: QueryType, confidence: ConfidenceLevel) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
            query_type,
            confidence,
            verification_notes: Vec::new(),
        }
    }

    /// Attach evidence, numbered in order starting at 1.
    pub fn with_sources(mut self, results: &[SearchResult]) -> Self {
        self.sources = results
            .iter()
            .enumerate()
            .map(|(i, r)| SourceRef::from_result(i + 1, r))
            .collect();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.verification_notes.push(note.into());
        self
    }

    pub fn with_notes<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verification_notes
            .extend(notes.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_by_chars_not_bytes() {
        let text = "精灵".repeat(80);
        let p = preview(&text, 100);
        assert_eq!(p.chars().count(), 103);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short", 100), "short");
    }

    #[test]
    fn query_type_compares_with_tag() {
        assert!(QueryType::FallbackQdrantUnavailable == "fallback_qdrant_unavailable");
        assert_eq!(
            serde_json::to_string(&QueryType::QaComplexWorkflow).unwrap(),
            "\"qa_complex_workflow\""
        );
        assert_eq!(
            serde_json::to_string(&ConfidenceLevel::None).unwrap(),
            "\"none\""
        );
    }

    #[test]
    fn sources_are_numbered_from_one() {
        let results = vec![
            SearchResult::new("a", 0.9, "c3_guide"),
            SearchResult::new("b", 0.8, "c3_plugins"),
        ];
        let resp = RagResponse::new("x", QueryType::Qa, ConfidenceLevel::High).with_sources(&results);
        assert_eq!(resp.sources[0].id, 1);
        assert_eq!(resp.sources[1].id, 2);
        assert_eq!(resp.sources[1].partition, "c3_plugins");
    }
}
