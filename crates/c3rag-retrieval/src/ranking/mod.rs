//! Cross-partition ranking: normalize, boost, dedup, threshold.

pub mod adaptive;
pub mod deduplication;
pub mod normalization;

pub use deduplication::{dedup_first_seen, dedup_key};
pub use normalization::normalize_and_boost;
