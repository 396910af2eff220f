mod chat;
mod response;
mod search_result;
mod service_status;
mod verification;

pub use chat::{ChatMessage, Role};
pub use response::{preview, ConfidenceLevel, QueryRoute, QueryType, RagResponse, SourceRef};
pub use search_result::{sort_by_score_desc, Metadata, SearchResult, VectorHit};
pub use service_status::ServiceStatus;
pub use verification::{ParseSource, Verdict, VerificationResult};
