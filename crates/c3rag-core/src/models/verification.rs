use serde::{Deserialize, Serialize};

/// Outcome of the self-reflection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Reliable,
    Unreliable,
    /// The reflection output could not be interpreted.
    Unknown,
}

/// How the verdict was extracted from the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseSource {
    Structured,
    LegacyText,
    Unparsed,
}

/// Structured verification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verdict: Verdict,
    pub issues: Vec<String>,
    pub corrected_answer: Option<String>,
    pub parsed_from: ParseSource,
}

impl VerificationResult {
    pub fn is_reliable(&self) -> bool {
        self.verdict == Verdict::Reliable
    }

    /// Result used when no reflection could be obtained.
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Unknown,
            issues: vec![reason.into()],
            corrected_answer: None,
            parsed_from: ParseSource::Unparsed,
        }
    }

    /// Force the verdict to unreliable and record why.
    pub fn downgrade(mut self, issue: impl Into<String>) -> Self {
        self.verdict = Verdict::Unreliable;
        self.issues.push(issue.into());
        self
    }
}
