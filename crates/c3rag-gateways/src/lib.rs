//! # c3rag-gateways
//!
//! Thin adapters for the external collaborators. They own no retrieval or
//! generation logic; they translate trait calls into HTTP requests and map
//! transport failures onto `RagError`.
//!
//! ## Architecture
//!
//! ```text
//! Gateways
//! ├── Embedder: LazyGateway → CachedEmbedder (moka L1) → OllamaEmbedder
//! ├── VectorStore: QdrantStore (REST)
//! └── LanguageModel: OllamaLanguageModel (/api/chat, NDJSON streaming)
//! ```

pub mod embeddings;
mod http;
pub mod lazy;
pub mod llm;
pub mod vector_store;

use std::sync::Arc;

use c3rag_core::config::RagConfig;
use c3rag_core::traits::{IEmbedder, ILanguageModel, IVectorStore};

pub use embeddings::{create_embedder, CacheStats, CachedEmbedder, OllamaEmbedder};
pub use lazy::LazyGateway;
pub use llm::OllamaLanguageModel;
pub use vector_store::QdrantStore;

/// The three collaborator handles the orchestrator is built from.
#[derive(Clone)]
pub struct Gateways {
    pub embedder: Arc<dyn IEmbedder>,
    pub vector_store: Arc<dyn IVectorStore>,
    pub language_model: Arc<dyn ILanguageModel>,
}

impl Gateways {
    /// Build handles from configuration. Nothing touches the network here:
    /// each handle initializes itself on first use.
    pub fn from_config(config: &RagConfig) -> Self {
        let embedding = config.embedding.clone();
        let embedder: LazyGateway<dyn IEmbedder> =
            LazyGateway::new("embedder", move || create_embedder(&embedding));

        let store_config = config.vector_store.clone();
        let vector_store: LazyGateway<dyn IVectorStore> = LazyGateway::new("vector_store", move || {
            Ok(Arc::new(QdrantStore::new(&store_config)?) as Arc<dyn IVectorStore>)
        });

        let llm_config = config.llm.clone();
        let language_model: LazyGateway<dyn ILanguageModel> =
            LazyGateway::new("language_model", move || {
                Ok(Arc::new(OllamaLanguageModel::new(&llm_config)?) as Arc<dyn ILanguageModel>)
            });

        Self {
            embedder: Arc::new(embedder),
            vector_store: Arc::new(vector_store),
            language_model: Arc::new(language_model),
        }
    }
}
