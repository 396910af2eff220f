use crate::errors::RagResult;
use crate::models::{ServiceStatus, VectorHit};

/// Similarity search over named partitions.
pub trait IVectorStore: Send + Sync {
    /// Return up to `k` hits from `partition` scoring at least `min_score`.
    fn search(
        &self,
        partition: &str,
        vector: &[f32],
        k: usize,
        min_score: f64,
    ) -> RagResult<Vec<VectorHit>>;

    fn health(&self) -> ServiceStatus;
}
