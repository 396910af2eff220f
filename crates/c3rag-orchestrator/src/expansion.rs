//! Parsing of model-proposed query variants (rewrites and sub-queries).

use std::sync::LazyLock;

use c3rag_core::constants::{MAX_QUERY_REWRITES, MAX_SUB_QUERIES};
use regex::Regex;

/// Leading list markers: "1.", "2)", "3、", "-", "*", "•", "Q1:".
static LIST_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:[Qq]?\d+\s*[.)、:：])|[-*•])\s*").ok()
});

fn clean_line(line: &str) -> String {
    let stripped = match LIST_MARKER.as_ref() {
        Some(re) => re.replace(line, "").into_owned(),
        None => line.to_string(),
    };
    stripped
        .trim()
        .trim_matches(|c| c == '"' || c == '“' || c == '”' || c == '`')
        .trim()
        .to_string()
}

/// One query per line, list markers stripped, blanks and duplicates dropped,
/// the original query excluded, at most `limit` kept.
fn parse_variants(output: &str, original: &str, limit: usize) -> Vec<String> {
    let original = original.trim().to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for line in output.lines() {
        let q = clean_line(line);
        if q.is_empty() || q.to_lowercase() == original {
            continue;
        }
        if out.iter().any(|seen| seen.eq_ignore_ascii_case(&q)) {
            continue;
        }
        out.push(q);
        if out.len() == limit {
            break;
        }
    }
    out
}

/// Alternative phrasings, at most three.
pub fn parse_rewrites(output: &str, original: &str) -> Vec<String> {
    parse_variants(output, original, MAX_QUERY_REWRITES)
}

/// Focused sub-queries, at most four. The caller decides whether fewer than
/// two is usable.
pub fn parse_sub_queries(output: &str, original: &str) -> Vec<String> {
    parse_variants(output, original, MAX_SUB_QUERIES)
}
