//! In-process gateway stubs with call accounting.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use c3rag_core::errors::{RagError, RagResult, Service};
use c3rag_core::models::{ChatMessage, Metadata, ServiceStatus, VectorHit};
use c3rag_core::stream::TextStream;
use c3rag_core::traits::{IEmbedder, ILanguageModel, IVectorStore};
use serde_json::Value;

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

// ---------------------------------------------------------------------------
// Embedder
// ---------------------------------------------------------------------------

/// Encodes text as its code points so a stub store can recover the query.
#[derive(Default)]
pub struct StubEmbedder {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let e = Self::default();
        e.fail.store(true, Ordering::SeqCst);
        e
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Inverse of `StubEmbedder::encode`.
pub fn decode_query(vector: &[f32]) -> String {
    vector
        .iter()
        .filter_map(|v| char::from_u32(*v as u32))
        .collect()
}

impl IEmbedder for StubEmbedder {
    fn encode(&self, text: &str) -> RagResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RagError::unavailable(Service::Embedder, "stub embedder down"));
        }
        Ok(text.chars().map(|c| c as u32 as f32).collect())
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "stub-embedder"
    }
}

// ---------------------------------------------------------------------------
// Vector store
// ---------------------------------------------------------------------------

pub fn hit(text: &str, score: f64) -> VectorHit {
    VectorHit {
        text: text.to_string(),
        score,
        metadata: Metadata::new(),
    }
}

pub fn hit_with(text: &str, score: f64, metadata: &[(&str, &str)]) -> VectorHit {
    VectorHit {
        text: text.to_string(),
        score,
        metadata: metadata
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect(),
    }
}

/// Collection-keyed canned hits. Hits registered for a specific query are
/// only returned for that query; the rest are returned for any query.
/// Hits are filtered by `min_score` and truncated to `k` like a real store.
#[derive(Default)]
pub struct StubVectorStore {
    any_query: Mutex<HashMap<String, Vec<VectorHit>>>,
    per_query: Mutex<HashMap<(String, String), Vec<VectorHit>>>,
    failing: Mutex<HashSet<String>>,
    unhealthy: AtomicBool,
    searches: Mutex<Vec<(String, String, usize)>>,
}

impl StubVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(self, collection: &str, hits: Vec<VectorHit>) -> Self {
        lock(&self.any_query)
            .entry(collection.to_string())
            .or_default()
            .extend(hits);
        self
    }

    pub fn with_query_hits(self, collection: &str, query: &str, hits: Vec<VectorHit>) -> Self {
        lock(&self.per_query)
            .entry((collection.to_string(), query.to_string()))
            .or_default()
            .extend(hits);
        self
    }

    pub fn failing_collection(self, collection: &str) -> Self {
        lock(&self.failing).insert(collection.to_string());
        self
    }

    pub fn unhealthy(self) -> Self {
        self.unhealthy.store(true, Ordering::SeqCst);
        self
    }

    pub fn search_count(&self) -> usize {
        lock(&self.searches).len()
    }

    /// `(collection, query, k)` for every search, in call order.
    pub fn searches(&self) -> Vec<(String, String, usize)> {
        lock(&self.searches).clone()
    }

    /// Distinct queries searched, in first-seen order.
    pub fn queries(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for (_, q, _) in lock(&self.searches).iter() {
            if !seen.contains(q) {
                seen.push(q.clone());
            }
        }
        seen
    }
}

impl IVectorStore for StubVectorStore {
    fn search(
        &self,
        partition: &str,
        vector: &[f32],
        k: usize,
        min_score: f64,
    ) -> RagResult<Vec<VectorHit>> {
        let query = decode_query(vector);
        lock(&self.searches).push((partition.to_string(), query.clone(), k));
        if lock(&self.failing).contains(partition) {
            return Err(RagError::unavailable(
                Service::VectorStore,
                format!("collection {partition} unreachable"),
            ));
        }

        let mut hits: Vec<VectorHit> = lock(&self.per_query)
            .get(&(partition.to_string(), query))
            .cloned()
            .unwrap_or_default();
        if let Some(general) = lock(&self.any_query).get(partition) {
            hits.extend(general.iter().cloned());
        }
        hits.retain(|h| h.score >= min_score);
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    fn health(&self) -> ServiceStatus {
        if self.unhealthy.load(Ordering::SeqCst) {
            ServiceStatus::unhealthy("Qdrant connection failed: stub offline")
        } else {
            ServiceStatus::healthy("Qdrant is healthy")
        }
    }
}

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

struct Rule {
    marker: String,
    replies: Vec<RagResult<String>>,
    cursor: usize,
}

impl Rule {
    fn next_reply(&mut self) -> RagResult<String> {
        let i = self.cursor.min(self.replies.len().saturating_sub(1));
        self.cursor += 1;
        match self.replies.get(i) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(e)) => Err(RagError::unavailable(Service::LanguageModel, e.to_string())),
            None => Ok(String::new()),
        }
    }
}

/// Replies chosen by the first rule whose marker appears in the prompt.
/// A rule with several replies hands them out in order, repeating the last.
pub struct ScriptedLanguageModel {
    rules: Mutex<Vec<Rule>>,
    default_reply: String,
    stream_chunks: Vec<String>,
    stream_fails_after: Option<usize>,
    chat_reply: String,
    unhealthy: AtomicBool,
    calls: Mutex<Vec<(String, String)>>,
    chats: Mutex<Vec<Vec<ChatMessage>>>,
    streams: AtomicUsize,
}

impl Default for ScriptedLanguageModel {
    fn default() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            default_reply: "stub answer".to_string(),
            stream_chunks: vec!["stub ".to_string(), "answer".to_string()],
            stream_fails_after: None,
            chat_reply: "stub chat reply".to_string(),
            unhealthy: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            chats: Mutex::new(Vec::new()),
            streams: AtomicUsize::new(0),
        }
    }
}

impl ScriptedLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_reply(mut self, reply: &str) -> Self {
        self.default_reply = reply.to_string();
        self
    }

    pub fn respond_when(self, marker: &str, reply: &str) -> Self {
        self.respond_in_sequence(marker, &[reply])
    }

    pub fn respond_in_sequence(self, marker: &str, replies: &[&str]) -> Self {
        lock(&self.rules).push(Rule {
            marker: marker.to_string(),
            replies: replies.iter().map(|r| Ok(r.to_string())).collect(),
            cursor: 0,
        });
        self
    }

    pub fn fail_when(self, marker: &str) -> Self {
        lock(&self.rules).push(Rule {
            marker: marker.to_string(),
            replies: vec![Err(RagError::unavailable(
                Service::LanguageModel,
                "stub model crashed",
            ))],
            cursor: 0,
        });
        self
    }

    pub fn with_stream_chunks(mut self, chunks: &[&str]) -> Self {
        self.stream_chunks = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Streams yield `n` chunks, then a transport error.
    pub fn fail_stream_after(mut self, n: usize) -> Self {
        self.stream_fails_after = Some(n);
        self
    }

    pub fn with_chat_reply(mut self, reply: &str) -> Self {
        self.chat_reply = reply.to_string();
        self
    }

    pub fn unhealthy(self) -> Self {
        self.unhealthy.store(true, Ordering::SeqCst);
        self
    }

    /// Every `(prompt, system)` passed to `generate`.
    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of `generate` prompts containing `marker`.
    pub fn calls_matching(&self, marker: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|(prompt, _)| prompt.contains(marker))
            .count()
    }

    pub fn chats(&self) -> Vec<Vec<ChatMessage>> {
        lock(&self.chats).clone()
    }

    pub fn streams_opened(&self) -> usize {
        self.streams.load(Ordering::SeqCst)
    }
}

impl ILanguageModel for ScriptedLanguageModel {
    fn generate(&self, prompt: &str, system: &str) -> RagResult<String> {
        lock(&self.calls).push((prompt.to_string(), system.to_string()));
        let mut rules = lock(&self.rules);
        match rules.iter_mut().find(|r| prompt.contains(&r.marker)) {
            Some(rule) => rule.next_reply(),
            None => Ok(self.default_reply.clone()),
        }
    }

    fn generate_stream(&self, prompt: &str, system: &str) -> RagResult<TextStream> {
        lock(&self.calls).push((prompt.to_string(), system.to_string()));
        self.streams.fetch_add(1, Ordering::SeqCst);
        match self.stream_fails_after {
            None => Ok(TextStream::from_chunks(self.stream_chunks.clone())),
            Some(n) => {
                let items: Vec<RagResult<String>> = self
                    .stream_chunks
                    .iter()
                    .take(n)
                    .cloned()
                    .map(Ok)
                    .chain(std::iter::once(Err(RagError::unavailable(
                        Service::LanguageModel,
                        "stub stream reset",
                    ))))
                    .collect();
                Ok(TextStream::new(items.into_iter()))
            }
        }
    }

    fn health(&self) -> ServiceStatus {
        if self.unhealthy.load(Ordering::SeqCst) {
            ServiceStatus::unhealthy("Ollama connection failed: stub offline")
        } else {
            ServiceStatus::healthy("Ollama is healthy")
        }
    }

    fn chat(&self, messages: &[ChatMessage]) -> RagResult<String> {
        lock(&self.chats).push(messages.to_vec());
        Ok(self.chat_reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedder_round_trips_through_store() {
        let embedder = StubEmbedder::new();
        let v = embedder.encode("精灵 sprite").unwrap();
        assert_eq!(decode_query(&v), "精灵 sprite");
    }

    #[test]
    fn store_prefers_query_specific_hits_and_filters() {
        let embedder = StubEmbedder::new();
        let store = StubVectorStore::new()
            .with_hits("c3_guide", vec![hit("general", 0.6), hit("weak", 0.2)])
            .with_query_hits("c3_guide", "tween", vec![hit("specific", 0.9)]);

        let tween = store
            .search("c3_guide", &embedder.encode("tween").unwrap(), 5, 0.5)
            .unwrap();
        let texts: Vec<&str> = tween.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["specific", "general"]);

        let other = store
            .search("c3_guide", &embedder.encode("other").unwrap(), 1, 0.5)
            .unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(store.queries(), vec!["tween".to_string(), "other".to_string()]);
    }

    #[test]
    fn scripted_replies_advance_and_repeat_last() {
        let llm = ScriptedLanguageModel::new().respond_in_sequence("REFLECT", &["bad", "good"]);
        assert_eq!(llm.generate("REFLECT 1", "").unwrap(), "bad");
        assert_eq!(llm.generate("REFLECT 2", "").unwrap(), "good");
        assert_eq!(llm.generate("REFLECT 3", "").unwrap(), "good");
        assert_eq!(llm.generate("other", "").unwrap(), "stub answer");
        assert_eq!(llm.calls_matching("REFLECT"), 3);
    }

    #[test]
    fn failing_rule_returns_error() {
        let llm = ScriptedLanguageModel::new().fail_when("boom");
        assert!(llm.generate("boom", "").is_err());
        assert!(llm.generate("fine", "").is_ok());
    }
}
