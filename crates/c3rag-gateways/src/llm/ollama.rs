//! Ollama chat adapter (`POST /api/chat`).
//!
//! Streaming responses are newline-delimited JSON objects. The stream holds
//! the open response; dropping it closes the connection.

use std::io::{BufRead, BufReader, Lines};
use std::time::Duration;

use c3rag_core::config::LlmConfig;
use c3rag_core::errors::{RagError, RagResult, Service};
use c3rag_core::models::{ChatMessage, ServiceStatus};
use c3rag_core::stream::TextStream;
use c3rag_core::traits::ILanguageModel;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http;

pub struct OllamaLanguageModel {
    client: Client,
    /// No overall timeout: a stream lives as long as the consumer reads it.
    stream_client: Client,
    base_url: String,
    model: String,
    health_timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, PartialEq)]
struct StreamLine {
    content: String,
    done: bool,
}

fn parse_stream_line(line: &str) -> RagResult<StreamLine> {
    let chunk: ChatChunk = serde_json::from_str(line).map_err(|e| {
        RagError::malformed(Service::LanguageModel, format!("bad stream line: {e}"))
    })?;
    if let Some(error) = chunk.error {
        return Err(RagError::unavailable(Service::LanguageModel, error));
    }
    Ok(StreamLine {
        content: chunk.message.map(|m| m.content).unwrap_or_default(),
        done: chunk.done,
    })
}

/// `qwen3:30b` matches `qwen3:30b`; a bare `bge-m3` matches `bge-m3:latest`.
fn model_listed(listed: &[TagModel], model: &str) -> bool {
    listed.iter().any(|m| {
        m.name == model || (!model.contains(':') && m.name == format!("{model}:latest"))
    })
}

fn prompt_messages<'a>(prompt: &'a str, system: &'a str) -> Vec<WireMessage<'a>> {
    let mut messages = Vec::with_capacity(2);
    if !system.is_empty() {
        messages.push(WireMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(WireMessage {
        role: "user",
        content: prompt,
    });
    messages
}

/// Content chunks pulled from an NDJSON response body.
struct NdjsonChunks<R> {
    lines: Lines<BufReader<R>>,
    finished: bool,
}

impl<R: std::io::Read> NdjsonChunks<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            finished: false,
        }
    }
}

impl<R: std::io::Read> Iterator for NdjsonChunks<R> {
    type Item = RagResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(RagError::unavailable(
                        Service::LanguageModel,
                        format!("stream read error: {e}"),
                    )));
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_stream_line(&line) {
                Ok(parsed) => {
                    self.finished = parsed.done;
                    if !parsed.content.is_empty() {
                        return Some(Ok(parsed.content));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl OllamaLanguageModel {
    pub fn new(config: &LlmConfig) -> RagResult<Self> {
        Ok(Self {
            client: http::build_client(
                Service::LanguageModel,
                Some(Duration::from_secs(config.timeout_secs)),
            )?,
            stream_client: http::build_client(Service::LanguageModel, None)?,
            base_url: http::trim_base_url(&config.base_url),
            model: config.model.clone(),
            health_timeout: Duration::from_secs(config.health_timeout_secs),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn complete(&self, messages: Vec<WireMessage<'_>>) -> RagResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };
        let chunk: ChatChunk =
            http::post_json(&self.client, Service::LanguageModel, &self.chat_url(), &request)?;
        if let Some(error) = chunk.error {
            return Err(RagError::unavailable(Service::LanguageModel, error));
        }
        let content = chunk.message.map(|m| m.content).ok_or_else(|| {
            RagError::malformed(Service::LanguageModel, "response has no message")
        })?;
        debug!(model = %self.model, chars = content.chars().count(), "generation complete");
        Ok(content)
    }

    fn open_stream(&self, messages: Vec<WireMessage<'_>>) -> RagResult<Response> {
        let url = self.chat_url();
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: true,
        };
        let response = self
            .stream_client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| RagError::unavailable(Service::LanguageModel, format!("HTTP error: {e}")))?;
        http::check_status(Service::LanguageModel, &url, response)
    }
}

impl ILanguageModel for OllamaLanguageModel {
    fn generate(&self, prompt: &str, system: &str) -> RagResult<String> {
        self.complete(prompt_messages(prompt, system))
    }

    fn generate_stream(&self, prompt: &str, system: &str) -> RagResult<TextStream> {
        let response = self.open_stream(prompt_messages(prompt, system))?;
        let model = self.model.clone();
        Ok(TextStream::new(NdjsonChunks::new(response)).on_release(move |end| {
            debug!(model = %model, ?end, "generation stream released");
        }))
    }

    fn health(&self) -> ServiceStatus {
        let url = format!("{}/api/tags", self.base_url);
        let tags: RagResult<TagsResponse> =
            http::get_json(&self.client, Service::LanguageModel, &url, self.health_timeout);
        match tags {
            Ok(tags) if model_listed(&tags.models, &self.model) => {
                ServiceStatus::healthy(format!("Ollama is healthy, model {} available", self.model))
            }
            Ok(_) => ServiceStatus::unhealthy(format!(
                "model {} not found in Ollama; run `ollama pull {}`",
                self.model, self.model
            )),
            Err(e) => {
                warn!(error = %e, "ollama health check failed");
                ServiceStatus::unhealthy(format!("Ollama connection failed: {e}"))
            }
        }
    }

    fn chat(&self, messages: &[ChatMessage]) -> RagResult<String> {
        let wire = messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();
        self.complete(wire)
    }
}
