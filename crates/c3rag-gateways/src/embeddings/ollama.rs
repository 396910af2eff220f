//! Ollama embedding adapter (`POST /api/embed`).

use std::time::Duration;

use c3rag_core::config::EmbeddingConfig;
use c3rag_core::errors::{RagError, RagResult, Service};
use c3rag_core::traits::IEmbedder;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> RagResult<Self> {
        let client = http::build_client(
            Service::Embedder,
            Some(Duration::from_secs(config.timeout_secs)),
        )?;
        Ok(Self {
            client,
            base_url: http::trim_base_url(&config.base_url),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Embed a probe string so a missing model fails at startup rather than
    /// on the first user query.
    pub fn warm_up(&self) -> RagResult<()> {
        let probe = self.request_embeddings(&["warm up"])?;
        debug!(model = %self.model, vectors = probe.len(), "embedding model warmed up");
        Ok(())
    }

    /// Embed several texts in one request.
    pub fn encode_batch(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        self.request_embeddings(texts)
    }

    fn request_embeddings(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: texts.to_vec(),
        };
        let response: EmbedResponse =
            http::post_json(&self.client, Service::Embedder, &url, &request)?;

        if response.embeddings.len() != texts.len() {
            return Err(RagError::malformed(
                Service::Embedder,
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            ));
        }

        check_dimensions(response.embeddings, self.dimensions)
    }
}

/// Reject vectors whose length disagrees with the configured index width.
/// A width of 0 accepts whatever the model returns.
fn check_dimensions(embeddings: Vec<Vec<f32>>, expected: usize) -> RagResult<Vec<Vec<f32>>> {
    if expected == 0 {
        return Ok(embeddings);
    }
    if let Some(bad) = embeddings.iter().find(|v| v.len() != expected) {
        return Err(RagError::malformed(
            Service::Embedder,
            format!(
                "embedding has {} dimensions, index expects {expected}",
                bad.len()
            ),
        ));
    }
    Ok(embeddings)
}

impl IEmbedder for OllamaEmbedder {
    fn encode(&self, text: &str) -> RagResult<Vec<f32>> {
        self.request_embeddings(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::malformed(Service::Embedder, "empty Ollama response"))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }
}
