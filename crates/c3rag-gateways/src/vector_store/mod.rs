mod qdrant;

pub use qdrant::QdrantStore;
