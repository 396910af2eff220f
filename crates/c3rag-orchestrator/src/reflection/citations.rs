use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// `[来源: 1]`, `[来源：1,3]`, `[source: 2]`.
static CITATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\[\s*(?i:来源|source)\s*[:：]\s*([0-9][0-9,，、\s]*)\]").ok()
});

/// Every evidence number cited in `answer`.
pub fn cited_ids(answer: &str) -> BTreeSet<usize> {
    let Some(re) = CITATION.as_ref() else {
        return BTreeSet::new();
    };
    re.captures_iter(answer)
        .filter_map(|caps| caps.get(1))
        .flat_map(|list| {
            list.as_str()
                .split(|c: char| !c.is_ascii_digit())
                .filter_map(|n| n.parse::<usize>().ok())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Cited numbers with no matching evidence block (blocks are numbered 1..=count).
pub fn audit_citations(answer: &str, evidence_count: usize) -> Vec<usize> {
    cited_ids(answer)
        .into_iter()
        .filter(|id| *id == 0 || *id > evidence_count)
        .collect()
}
