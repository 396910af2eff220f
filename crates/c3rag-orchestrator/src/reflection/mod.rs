//! Self-verification: reading the model's audit of its own answer, and
//! checking its citations against the evidence it was given.

mod citations;
mod parser;

pub use citations::{audit_citations, cited_ids};
pub use parser::parse_verification;
