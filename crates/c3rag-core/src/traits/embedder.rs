use crate::errors::RagResult;

/// Text embedding gateway.
pub trait IEmbedder: Send + Sync {
    /// Embed a single text. Deterministic for a given model version.
    fn encode(&self, text: &str) -> RagResult<Vec<f32>>;

    /// The dimensionality of vectors produced.
    fn dimensions(&self) -> usize;

    /// Human-readable model name.
    fn name(&self) -> &str;
}
