//! Query routing and complexity detection.

mod keyword;

pub use keyword::KeywordClassifier;
