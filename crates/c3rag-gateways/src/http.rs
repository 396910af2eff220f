//! Shared blocking HTTP plumbing for the adapters.

use std::time::Duration;

use c3rag_core::errors::{RagError, RagResult, Service};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn build_client(service: Service, timeout: Option<Duration>) -> RagResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| RagError::ConfigError(format!("{service} HTTP client: {e}")))
}

/// Reject non-2xx responses, keeping the body in the error for diagnosis.
pub(crate) fn check_status(service: Service, url: &str, response: Response) -> RagResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(RagError::unavailable(
        service,
        format!("{url} returned {status}: {}", body.trim()),
    ))
}

pub(crate) fn post_json<B, R>(client: &Client, service: Service, url: &str, body: &B) -> RagResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .map_err(|e| RagError::unavailable(service, format!("HTTP error: {e}")))?;
    check_status(service, url, response)?
        .json::<R>()
        .map_err(|e| RagError::malformed(service, format!("JSON parse error: {e}")))
}

pub(crate) fn get_json<R: DeserializeOwned>(
    client: &Client,
    service: Service,
    url: &str,
    timeout: Duration,
) -> RagResult<R> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .map_err(|e| RagError::unavailable(service, format!("HTTP error: {e}")))?;
    check_status(service, url, response)?
        .json::<R>()
        .map_err(|e| RagError::malformed(service, format!("JSON parse error: {e}")))
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
