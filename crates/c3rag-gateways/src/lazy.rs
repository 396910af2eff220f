//! One-time initialization holder for heavy gateway handles.
//!
//! The factory runs on first use. Concurrent first callers are serialized so
//! exactly one successful initialization happens; a failed initialization is
//! not cached and the next call tries again.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;

use c3rag_core::errors::RagResult;
use c3rag_core::models::{ServiceStatus, VectorHit};
use c3rag_core::stream::TextStream;
use c3rag_core::traits::{IEmbedder, ILanguageModel, IVectorStore};
use tracing::{info, warn};

type Factory<T> = Box<dyn Fn() -> RagResult<Arc<T>> + Send + Sync>;

pub struct LazyGateway<T: ?Sized> {
    label: &'static str,
    cell: OnceLock<Arc<T>>,
    init_lock: Mutex<()>,
    factory: Factory<T>,
}

impl<T: ?Sized + Send + Sync> LazyGateway<T> {
    pub fn new<F>(label: &'static str, factory: F) -> Self
    where
        F: Fn() -> RagResult<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            label,
            cell: OnceLock::new(),
            init_lock: Mutex::new(()),
            factory: Box::new(factory),
        }
    }

    /// Get the handle, building it if this is the first use.
    pub fn get(&self) -> RagResult<Arc<T>> {
        if let Some(handle) = self.cell.get() {
            return Ok(Arc::clone(handle));
        }

        // A poisoned lock only means another initializer panicked; the cell is still consistent.
        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = self.cell.get() {
            return Ok(Arc::clone(handle));
        }

        let started = Instant::now();
        info!(gateway = self.label, "initializing gateway");
        match (self.factory)() {
            Ok(handle) => {
                let _ = self.cell.set(Arc::clone(&handle));
                info!(
                    gateway = self.label,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "gateway initialized"
                );
                Ok(handle)
            }
            Err(e) => {
                warn!(gateway = self.label, error = %e, "gateway initialization failed");
                Err(e)
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl IEmbedder for LazyGateway<dyn IEmbedder> {
    fn encode(&self, text: &str) -> RagResult<Vec<f32>> {
        self.get()?.encode(text)
    }

    fn dimensions(&self) -> usize {
        self.get().map(|e| e.dimensions()).unwrap_or(0)
    }

    fn name(&self) -> &str {
        self.cell.get().map(|e| e.name()).unwrap_or(self.label)
    }
}

impl IVectorStore for LazyGateway<dyn IVectorStore> {
    fn search(
        &self,
        partition: &str,
        vector: &[f32],
        k: usize,
        min_score: f64,
    ) -> RagResult<Vec<VectorHit>> {
        self.get()?.search(partition, vector, k, min_score)
    }

    fn health(&self) -> ServiceStatus {
        match self.get() {
            Ok(store) => store.health(),
            Err(e) => ServiceStatus::unhealthy(e.to_string()),
        }
    }
}

impl ILanguageModel for LazyGateway<dyn ILanguageModel> {
    fn generate(&self, prompt: &str, system: &str) -> RagResult<String> {
        self.get()?.generate(prompt, system)
    }

    fn generate_stream(&self, prompt: &str, system: &str) -> RagResult<TextStream> {
        self.get()?.generate_stream(prompt, system)
    }

    fn health(&self) -> ServiceStatus {
        match self.get() {
            Ok(model) => model.health(),
            Err(e) => ServiceStatus::unhealthy(e.to_string()),
        }
    }

    fn chat(&self, messages: &[c3rag_core::models::ChatMessage]) -> RagResult<String> {
        self.get()?.chat(messages)
    }
}
