//! Verdict extraction.
//!
//! The reflection prompt asks for a JSON object. Models do not always comply,
//! so the parser tries, in order: a fenced JSON block, the outermost `{...}`
//! span, then the legacy `可靠性：可靠 / 不可靠` text format. "Unreliable"
//! tokens are checked before "reliable" ones because the latter is a substring
//! of the former in both languages.

use std::sync::LazyLock;

use c3rag_core::models::{ParseSource, Verdict, VerificationResult};
use regex::Regex;
use serde::Deserialize;

static FENCED_JSON: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").ok());

static BULLET: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)、])\s+").ok());

#[derive(Debug, Deserialize)]
struct StructuredVerdict {
    reliable: bool,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    corrected_answer: Option<String>,
}

pub fn parse_verification(output: &str) -> VerificationResult {
    if let Some(structured) = parse_structured(output) {
        return structured;
    }
    parse_legacy(output)
}

fn parse_structured(output: &str) -> Option<VerificationResult> {
    let candidates = fenced_block(output)
        .into_iter()
        .chain(outer_braces(output));
    for candidate in candidates {
        if let Ok(v) = serde_json::from_str::<StructuredVerdict>(candidate) {
            return Some(VerificationResult {
                verdict: if v.reliable {
                    Verdict::Reliable
                } else {
                    Verdict::Unreliable
                },
                issues: v
                    .issues
                    .into_iter()
                    .map(|i| i.trim().to_string())
                    .filter(|i| !i.is_empty())
                    .collect(),
                corrected_answer: v
                    .corrected_answer
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty()),
                parsed_from: ParseSource::Structured,
            });
        }
    }
    None
}

fn fenced_block(output: &str) -> Option<&str> {
    FENCED_JSON
        .as_ref()?
        .captures(output)?
        .get(1)
        .map(|m| m.as_str())
}

fn outer_braces(output: &str) -> Option<&str> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    (end > start).then(|| &output[start..=end])
}

fn verdict_in(text: &str) -> Option<Verdict> {
    let lower = text.to_lowercase();
    if lower.contains("不可靠") || lower.contains("unreliable") || lower.contains("not reliable") {
        Some(Verdict::Unreliable)
    } else if lower.contains("可靠") || lower.contains("reliable") {
        Some(Verdict::Reliable)
    } else {
        None
    }
}

fn is_verdict_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("可靠性") || lower.contains("reliability") || lower.contains("verdict")
}

fn is_correction_heading(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("修正后") || lower.contains("corrected")
}

fn parse_legacy(output: &str) -> VerificationResult {
    // Prefer the labelled line so template echoes further down do not decide.
    let verdict = output
        .lines()
        .find(|l| is_verdict_line(l))
        .and_then(verdict_in)
        .or_else(|| verdict_in(output));

    let Some(verdict) = verdict else {
        return VerificationResult {
            verdict: Verdict::Unknown,
            issues: Vec::new(),
            corrected_answer: None,
            parsed_from: ParseSource::Unparsed,
        };
    };

    let mut issues = Vec::new();
    let mut corrected: Vec<&str> = Vec::new();
    let mut in_correction = false;
    for line in output.lines() {
        if in_correction {
            corrected.push(line);
        } else if is_correction_heading(line) {
            in_correction = true;
        } else if let Some(re) = BULLET.as_ref() {
            if re.is_match(line) {
                let issue = re.replace(line, "").trim().to_string();
                if !issue.is_empty() {
                    issues.push(issue);
                }
            }
        }
    }

    let corrected_answer = (verdict == Verdict::Unreliable)
        .then(|| corrected.join("\n").trim().to_string())
        .filter(|a| !a.is_empty());

    VerificationResult {
        verdict,
        issues,
        corrected_answer,
        parsed_from: ParseSource::LegacyText,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_wins() {
        let out = "核查完成。\n```json\n{\"reliable\": false, \"issues\": [\"[来源: 4] 不存在\"], \"corrected_answer\": \"修正版\"}\n```";
        let r = parse_verification(out);
        assert_eq!(r.verdict, Verdict::Unreliable);
        assert_eq!(r.parsed_from, ParseSource::Structured);
        assert_eq!(r.issues, vec!["[来源: 4] 不存在".to_string()]);
        assert_eq!(r.corrected_answer.as_deref(), Some("修正版"));
    }

    #[test]
    fn bare_json_inside_prose() {
        let r = parse_verification("结果：{\"reliable\": true, \"issues\": [], \"corrected_answer\": null} 完毕");
        assert!(r.is_reliable());
        assert_eq!(r.parsed_from, ParseSource::Structured);
        assert!(r.corrected_answer.is_none());
    }

    #[test]
    fn legacy_unreliable_with_correction() {
        let out = "可靠性：不可靠\n\n核查发现：\n- “双击跳跃”在资料中不存在\n\n如果不可靠，给出修正后的版本：\n根据资料，Platform 行为支持二段跳 [来源: 1]";
        let r = parse_verification(out);
        assert_eq!(r.verdict, Verdict::Unreliable);
        assert_eq!(r.parsed_from, ParseSource::LegacyText);
        assert_eq!(r.issues.len(), 1);
        assert_eq!(
            r.corrected_answer.as_deref(),
            Some("根据资料，Platform 行为支持二段跳 [来源: 1]")
        );
    }

    #[test]
    fn legacy_reliable_ignores_template_echo() {
        let out = "可靠性：可靠\n\n核查发现：\n- 所有引用均存在\n\n如果不可靠，给出修正后的版本：\n（无）";
        let r = parse_verification(out);
        assert_eq!(r.verdict, Verdict::Reliable);
        assert!(r.corrected_answer.is_none());
    }

    #[test]
    fn unreadable_output_is_unknown() {
        let r = parse_verification("I cannot tell.");
        assert_eq!(r.verdict, Verdict::Unknown);
        assert_eq!(r.parsed_from, ParseSource::Unparsed);
        assert!(!r.is_reliable());
    }
}
