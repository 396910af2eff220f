mod classifier;
mod embedder;
mod language_model;
mod vector_store;

pub use classifier::IQueryClassifier;
pub use embedder::IEmbedder;
pub use language_model::ILanguageModel;
pub use vector_store::IVectorStore;
