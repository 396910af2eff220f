//! Qdrant REST adapter.
//!
//! Each partition maps to one Qdrant collection. The point payload's `text`
//! field becomes the snippet; every other payload field is carried through as
//! metadata.

use std::time::{Duration, Instant};

use c3rag_core::config::VectorStoreConfig;
use c3rag_core::errors::{RagResult, Service};
use c3rag_core::models::{Metadata, ServiceStatus, VectorHit};
use c3rag_core::traits::IVectorStore;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::http;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct QdrantStore {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_threshold: Option<f64>,
    with_payload: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: f64,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct CollectionsResponse {
    result: CollectionsResult,
}

#[derive(Deserialize)]
struct CollectionsResult {
    #[serde(default)]
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

impl QdrantStore {
    pub fn new(config: &VectorStoreConfig) -> RagResult<Self> {
        let client = http::build_client(
            Service::VectorStore,
            Some(Duration::from_secs(config.timeout_secs)),
        )?;
        Ok(Self {
            client,
            base_url: http::trim_base_url(&config.base_url()),
        })
    }

    /// Names of the collections the server holds.
    pub fn collections(&self) -> RagResult<Vec<String>> {
        let url = format!("{}/collections", self.base_url);
        let response: CollectionsResponse =
            http::get_json(&self.client, Service::VectorStore, &url, HEALTH_TIMEOUT)?;
        Ok(response
            .result
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect())
    }
}

fn into_hit(point: ScoredPoint) -> VectorHit {
    let mut payload = point.payload.unwrap_or_default();
    let text = match payload.remove("text") {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let metadata: Metadata = payload.into_iter().collect();
    VectorHit {
        text,
        score: point.score,
        metadata,
    }
}

impl IVectorStore for QdrantStore {
    fn search(
        &self,
        partition: &str,
        vector: &[f32],
        k: usize,
        min_score: f64,
    ) -> RagResult<Vec<VectorHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let started = Instant::now();
        let url = format!("{}/collections/{partition}/points/search", self.base_url);
        let request = SearchRequest {
            vector,
            limit: k,
            score_threshold: (min_score > 0.0).then_some(min_score),
            with_payload: true,
        };
        let response: SearchResponse =
            http::post_json(&self.client, Service::VectorStore, &url, &request)?;

        let hits: Vec<VectorHit> = response.result.into_iter().map(into_hit).collect();
        debug!(
            collection = partition,
            hits = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "qdrant search"
        );
        Ok(hits)
    }

    fn health(&self) -> ServiceStatus {
        match self.collections() {
            Ok(names) => ServiceStatus::healthy(format!(
                "Qdrant is healthy ({} collections)",
                names.len()
            )),
            Err(e) => {
                warn!(error = %e, "qdrant health check failed");
                ServiceStatus::unhealthy(format!("Qdrant connection failed: {e}"))
            }
        }
    }
}
