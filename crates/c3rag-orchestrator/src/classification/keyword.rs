//! Keyword-driven classifier.
//!
//! Routing: any code keyword selects `code`. Complexity: step markers
//! ("然后", "and then", ...) and extra question marks are counted, and the
//! count is weighed against query length.

use c3rag_core::models::QueryRoute;
use c3rag_core::traits::IQueryClassifier;

const CODE_KEYWORDS: &[&str] = &[
    "生成",
    "写一个",
    "帮我写",
    "事件表",
    "代码",
    "generate",
    "write a",
    "write code",
    "event sheet",
];

const STEP_MARKERS: &[&str] = &[
    "首先",
    "然后",
    "接着",
    "之后",
    "最后",
    "同时",
    "并且",
    "步骤",
    "流程",
    "and then",
    "after that",
    "step by step",
    "workflow",
    "finally",
];

pub struct KeywordClassifier {
    code_keywords: Vec<String>,
    step_markers: Vec<String>,
    /// Markers alone that make a query complex.
    min_markers: usize,
    /// Length (chars) that makes a query complex on its own.
    long_query_chars: usize,
    /// Length (chars) that makes a query complex once it has one marker.
    marked_query_chars: usize,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            code_keywords: CODE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            step_markers: STEP_MARKERS.iter().map(|s| s.to_string()).collect(),
            min_markers: 2,
            long_query_chars: 60,
            marked_query_chars: 25,
        }
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add routing keywords on top of the defaults. Matching is case-insensitive.
    pub fn with_code_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.code_keywords
            .extend(keywords.into_iter().map(|k| k.into().to_lowercase()));
        self
    }

    pub fn with_long_query_chars(mut self, chars: usize) -> Self {
        self.long_query_chars = chars;
        self
    }

    /// Step markers present plus every question mark after the first.
    pub fn marker_count(&self, query: &str) -> usize {
        let lower = query.to_lowercase();
        let markers = self
            .step_markers
            .iter()
            .filter(|m| lower.contains(m.as_str()))
            .count();
        let questions = lower.chars().filter(|c| *c == '?' || *c == '？').count();
        markers + questions.saturating_sub(1)
    }
}

impl IQueryClassifier for KeywordClassifier {
    fn classify(&self, query: &str) -> QueryRoute {
        let lower = query.to_lowercase();
        if self
            .code_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()))
        {
            QueryRoute::Code
        } else {
            QueryRoute::Qa
        }
    }

    fn is_complex(&self, query: &str) -> bool {
        let chars = query.trim().chars().count();
        let markers = self.marker_count(query);
        markers >= self.min_markers
            || chars >= self.long_query_chars
            || (markers >= 1 && chars >= self.marked_query_chars)
    }
}
