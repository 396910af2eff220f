//! AnswerOrchestrator: routes a query, drives retrieval, builds citation
//! prompts, verifies the answer, and degrades gracefully.
//!
//! Every public entry point returns a [`RagResponse`]. Collaborator failures
//! are turned into fixed messages and a lower confidence; evidence found
//! before a failure stays in the response.
//!
//! QA state machine:
//! RETRIEVE → (empty) REWRITE once → (still empty) `qa_no_results`
//!          → GENERATE → REFLECT → (unreliable) EXPAND_RETRY once → RETURN

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use c3rag_core::config::RagConfig;
use c3rag_core::constants::{
    MIN_RESULTS_FOR_CONFIDENT_PROMPT, MIN_SUB_QUERIES, SERVICE_LANGUAGE_MODEL,
    SERVICE_VECTOR_STORE, SOURCE_PREVIEW_CHARS,
};
use c3rag_core::models::{
    preview, sort_by_score_desc, ChatMessage, ConfidenceLevel, QueryRoute, QueryType, RagResponse,
    Role, SearchResult, ServiceStatus, VerificationResult,
};
use c3rag_core::partitions::PartitionRegistry;
use c3rag_core::stream::{StreamEnd, TextStream};
use c3rag_core::traits::{ILanguageModel, IQueryClassifier};
use c3rag_gateways::Gateways;
use c3rag_observability::tracing_setup::events;
use c3rag_observability::{DegradationEvent, DegradationTracker, HealthReport, HealthReporter};
use c3rag_retrieval::search::rrf_fusion::ORIGINAL_SCORE_KEY;
use c3rag_retrieval::{format_context, format_evidence_blocks, HybridRetriever};
use tracing::{debug, info, warn};

use crate::classification::KeywordClassifier;
use crate::expansion::{parse_rewrites, parse_sub_queries};
use crate::prompts;
use crate::reflection::{audit_citations, parse_verification};

/// Fused score stashed while the adaptive filter looks at pre-fusion scores.
pub const FUSED_SCORE_KEY: &str = "fused_score";

/// Evidence plus the query that actually found it.
struct Retrieved {
    results: Vec<SearchResult>,
    query: String,
    rewritten: bool,
}

pub struct AnswerOrchestrator {
    retriever: HybridRetriever,
    llm: Arc<dyn ILanguageModel>,
    classifier: Box<dyn IQueryClassifier>,
    degradation: Mutex<DegradationTracker>,
}

impl AnswerOrchestrator {
    pub fn new(retriever: HybridRetriever, llm: Arc<dyn ILanguageModel>) -> Self {
        Self {
            retriever,
            llm,
            classifier: Box::new(KeywordClassifier::new()),
            degradation: Mutex::new(DegradationTracker::new()),
        }
    }

    /// Wire the HTTP gateways described by `config`. No network I/O happens
    /// until the first query.
    pub fn from_config(config: &RagConfig) -> Self {
        let gateways = Gateways::from_config(config);
        Self::from_gateways(gateways, config)
    }

    pub fn from_gateways(gateways: Gateways, config: &RagConfig) -> Self {
        let retriever = HybridRetriever::new(
            gateways.embedder,
            gateways.vector_store,
            PartitionRegistry::new(config.partitions.clone()),
            config.retrieval.clone(),
        );
        Self::new(retriever, gateways.language_model)
    }

    pub fn with_classifier(mut self, classifier: Box<dyn IQueryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn retriever(&self) -> &HybridRetriever {
        &self.retriever
    }

    fn registry(&self) -> &PartitionRegistry {
        self.retriever.registry()
    }

    // ── Classification ───────────────────────────────────────────────────

    pub fn classify_query(&self, query: &str) -> QueryRoute {
        self.classifier.classify(query)
    }

    pub fn is_complex_query(&self, query: &str) -> bool {
        self.classifier.is_complex(query)
    }

    // ── Query variants ───────────────────────────────────────────────────

    /// Up to three alternative phrasings. Empty when the model is unavailable.
    pub fn rewrite_query(&self, query: &str) -> Vec<String> {
        match self.llm.generate(&prompts::query_rewrite(query), "") {
            Ok(output) => {
                let rewrites = parse_rewrites(&output, query);
                debug!(count = rewrites.len(), "query rewritten");
                rewrites
            }
            Err(e) => {
                warn!(error = %e, "query rewrite failed");
                Vec::new()
            }
        }
    }

    /// Two to four sub-queries, or none when the model gives fewer than two.
    pub fn decompose_query(&self, query: &str) -> Vec<String> {
        match self.llm.generate(&prompts::query_decompose(query), "") {
            Ok(output) => {
                let subs = parse_sub_queries(&output, query);
                if subs.len() < MIN_SUB_QUERIES {
                    debug!(count = subs.len(), "decomposition too shallow; using original query only");
                    Vec::new()
                } else {
                    subs
                }
            }
            Err(e) => {
                warn!(error = %e, "query decomposition failed");
                Vec::new()
            }
        }
    }

    // ── Entry points ─────────────────────────────────────────────────────

    /// Route by classification: code requests go to [`Self::answer_code`],
    /// everything else to [`Self::answer_qa`].
    pub fn answer(&self, query: &str) -> RagResponse {
        match self.classify_query(query) {
            QueryRoute::Code => self.answer_code(query),
            QueryRoute::Qa => self.answer_qa(query),
        }
    }

    /// Complex queries are decomposed; the rest take the health-checked path.
    pub fn answer_smart(&self, query: &str) -> RagResponse {
        let complex = self.is_complex_query(query);
        events::query_classified(if complex { "complex_workflow" } else { "fallback" }, complex);
        if complex {
            self.answer_complex_workflow(query)
        } else {
            self.answer_with_fallback(query)
        }
    }

    pub fn answer_qa(&self, query: &str) -> RagResponse {
        let started = Instant::now();
        let _span = c3rag_observability::answer_span!("qa", query.chars().count()).entered();
        let cfg = self.retriever.config();

        let retrieved = self.retrieve_reranked(query, false);
        events::retrieval_completed("qa", retrieved.results.len(), elapsed_ms(started));
        if retrieved.results.is_empty() {
            return self.finish(started, no_results_response());
        }

        let answer = match self.generate_answer(query, &retrieved.results) {
            Ok(answer) => answer,
            Err(reason) => {
                return self.finish(started, self.llm_unavailable(&retrieved.results, &reason))
            }
        };
        let first = self.reflect(query, &answer, &retrieved.results, 1);
        let mut notes = retrieval_notes(&retrieved);

        if first.is_reliable() {
            notes.push("verified by self-reflection".to_string());
            let resp = RagResponse::new(answer, QueryType::Qa, ConfidenceLevel::High)
                .with_sources(&retrieved.results)
                .with_notes(notes);
            return self.finish(started, resp);
        }

        // One expand-retry with a larger evidence budget.
        let expanded = self.retriever.search_all_with_rerank(
            &retrieved.query,
            cfg.expanded_per_partition_k,
            cfg.expanded_final_k,
        );
        info!(
            first_pass = retrieved.results.len(),
            expanded = expanded.len(),
            "self-check failed; retrying with expanded retrieval"
        );
        if !expanded.is_empty() {
            match self.generate_answer(query, &expanded) {
                Ok(retry_answer) => {
                    let second = self.reflect(query, &retry_answer, &expanded, 2);
                    if second.is_reliable() {
                        notes.push("verified by self-reflection after expanded retrieval".to_string());
                        let resp =
                            RagResponse::new(retry_answer, QueryType::Qa, ConfidenceLevel::High)
                                .with_sources(&expanded)
                                .with_notes(notes);
                        return self.finish(started, resp);
                    }
                    notes.extend(prefixed("retry", &second));
                }
                Err(reason) => notes.push(format!("expanded retry skipped: {reason}")),
            }
        }

        notes.push("self-reflection did not confirm the answer".to_string());
        notes.extend(prefixed("first pass", &first));
        let resp = RagResponse::new(answer, QueryType::Qa, ConfidenceLevel::Medium)
            .with_sources(&retrieved.results)
            .with_notes(notes);
        self.finish(started, resp)
    }

    pub fn answer_complex_workflow(&self, query: &str) -> RagResponse {
        let started = Instant::now();
        let _span = c3rag_observability::answer_span!("complex", query.chars().count()).entered();
        let cfg = self.retriever.config();

        let sub_queries = self.decompose_query(query);
        let fused = self.retriever.search_with_decomposition(
            &sub_queries,
            query,
            cfg.per_partition_k,
            cfg.final_k,
        );
        let results = self.filter_fused(fused, cfg.complex_min_results);
        events::retrieval_completed("complex", results.len(), elapsed_ms(started));
        if results.is_empty() {
            return self.finish(started, no_results_response());
        }

        let answer = match self.generate_answer(query, &results) {
            Ok(answer) => answer,
            Err(reason) => return self.finish(started, self.llm_unavailable(&results, &reason)),
        };
        let verification = self.reflect(query, &answer, &results, 1);

        let mut notes: Vec<String> = sub_queries
            .iter()
            .map(|q| format!("sub-query: {q}"))
            .collect();
        let confidence = if verification.is_reliable() {
            notes.push("verified by self-reflection".to_string());
            ConfidenceLevel::High
        } else {
            notes.extend(prefixed("self-check", &verification));
            ConfidenceLevel::Medium
        };
        let resp = RagResponse::new(answer, QueryType::QaComplexWorkflow, confidence)
            .with_sources(&results)
            .with_notes(notes);
        self.finish(started, resp)
    }

    pub fn answer_with_fallback(&self, query: &str) -> RagResponse {
        let started = Instant::now();
        let _span = c3rag_observability::answer_span!("fallback", query.chars().count()).entered();

        let store_status = self.retriever.store().health();
        if !store_status.ok {
            self.degrade(SERVICE_VECTOR_STORE, &store_status.message, "canned unavailable message");
            events::fallback_engaged(
                QueryType::FallbackQdrantUnavailable.as_str(),
                &store_status.message,
            );
            let resp = RagResponse::new(
                prompts::VECTOR_STORE_UNAVAILABLE_MESSAGE,
                QueryType::FallbackQdrantUnavailable,
                ConfidenceLevel::None,
            )
            .with_note(store_status.message);
            return self.finish(started, resp);
        }
        self.recovered(SERVICE_VECTOR_STORE);

        let retrieved = self.retrieve_reranked(query, true);
        events::retrieval_completed("fallback", retrieved.results.len(), elapsed_ms(started));
        if retrieved.results.is_empty() {
            return self.finish(started, no_results_response());
        }

        let llm_status = self.llm.health();
        if !llm_status.ok {
            return self.finish(
                started,
                self.llm_unavailable(&retrieved.results, &llm_status.message),
            );
        }

        let answer = match self.generate_answer(query, &retrieved.results) {
            Ok(answer) => answer,
            Err(reason) => {
                return self.finish(started, self.llm_unavailable(&retrieved.results, &reason))
            }
        };
        self.recovered(SERVICE_LANGUAGE_MODEL);

        let verification = self.reflect(query, &answer, &retrieved.results, 1);
        let mut notes = retrieval_notes(&retrieved);
        let resp = if verification.is_reliable() {
            notes.push("verified by self-reflection".to_string());
            RagResponse::new(answer, QueryType::Qa, ConfidenceLevel::High)
        } else {
            notes.extend(prefixed("self-check", &verification));
            RagResponse::new(
                format!("{answer}{}", prompts::LOW_CONFIDENCE_DISCLAIMER),
                QueryType::QaLowConfidence,
                ConfidenceLevel::Medium,
            )
        };
        self.finish(started, resp.with_sources(&retrieved.results).with_notes(notes))
    }

    /// Event-sheet generation grounded on the examples partition. Not reflected.
    pub fn answer_code(&self, query: &str) -> RagResponse {
        let started = Instant::now();
        let _span = c3rag_observability::answer_span!("code", query.chars().count()).entered();
        let cfg = self.retriever.config();

        let examples = self.retriever.search_examples(query, cfg.code_examples_k);
        events::retrieval_completed("code", examples.len(), elapsed_ms(started));
        let prompt = prompts::event_generation(&format_examples(&examples), query);

        match self.llm.generate(&prompt, "") {
            Ok(answer) => {
                self.recovered(SERVICE_LANGUAGE_MODEL);
                let mut resp = RagResponse::new(answer, QueryType::Code, ConfidenceLevel::Medium)
                    .with_sources(&examples);
                if examples.is_empty() {
                    resp = resp.with_note("no similar example projects found");
                }
                self.finish(started, resp)
            }
            Err(e) => self.finish(started, self.llm_unavailable(&examples, &e.to_string())),
        }
    }

    /// Same retrieval and prompt as [`Self::answer_qa`] (or [`Self::answer_code`]
    /// for code requests), streamed without reflection.
    pub fn answer_stream(&self, query: &str) -> TextStream {
        let cfg = self.retriever.config();
        let (prompt, system, path) = match self.classify_query(query) {
            QueryRoute::Code => {
                let examples = self.retriever.search_examples(query, cfg.code_examples_k);
                (
                    prompts::event_generation(&format_examples(&examples), query),
                    String::new(),
                    "code",
                )
            }
            QueryRoute::Qa => {
                let retrieved = self.retrieve_reranked(query, false);
                if retrieved.results.is_empty() {
                    return TextStream::once(prompts::NO_RESULTS_RESPONSE);
                }
                (
                    self.qa_prompt(query, &retrieved.results),
                    prompts::SYSTEM_MESSAGE.to_string(),
                    "qa",
                )
            }
        };

        match self.llm.generate_stream(&prompt, &system) {
            Ok(stream) => stream
                .with_interruption_notice(prompts::GENERATION_INTERRUPTED_NOTICE)
                .on_release(move |end| {
                    let end = match end {
                        StreamEnd::Exhausted => "exhausted",
                        StreamEnd::Failed => "failed",
                        StreamEnd::Abandoned => "abandoned",
                    };
                    events::stream_released(path, end);
                }),
            Err(e) => {
                self.degrade(SERVICE_LANGUAGE_MODEL, &e.to_string(), "canned unavailable message");
                TextStream::once(prompts::LANGUAGE_MODEL_UNAVAILABLE_MESSAGE)
            }
        }
    }

    /// Multi-turn chat. Context for the last user turn is injected as an
    /// extra system message ahead of the caller's transcript.
    pub fn chat(&self, messages: &[ChatMessage]) -> RagResponse {
        let started = Instant::now();
        let cfg = self.retriever.config();
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone());

        let (enhanced, evidence) = match last_user {
            Some(question) => {
                let grouped = self
                    .retriever
                    .search_all(&question, Some(cfg.chat_per_partition_k));
                let context = format_context(&grouped, self.registry());
                let mut enhanced = Vec::with_capacity(messages.len() + 1);
                enhanced.push(ChatMessage::system(prompts::chat_system(&context)));
                enhanced.extend_from_slice(messages);
                (enhanced, grouped.into_flat())
            }
            None => (messages.to_vec(), Vec::new()),
        };

        match self.llm.chat(&enhanced) {
            Ok(reply) => {
                let resp = RagResponse::new(reply, QueryType::Chat, ConfidenceLevel::Medium)
                    .with_sources(&evidence);
                self.finish(started, resp)
            }
            Err(e) => self.finish(started, self.llm_unavailable(&evidence, &e.to_string())),
        }
    }

    /// Probe both collaborators: `{"vector_store": .., "language_model": ..}`.
    pub fn check_services(&self) -> BTreeMap<String, ServiceStatus> {
        let mut services = BTreeMap::new();
        let store = self.retriever.store().health();
        let llm = self.llm.health();
        for (name, status) in [(SERVICE_VECTOR_STORE, &store), (SERVICE_LANGUAGE_MODEL, &llm)] {
            if status.ok {
                self.recovered(name);
            }
        }
        services.insert(SERVICE_VECTOR_STORE.to_string(), store);
        services.insert(SERVICE_LANGUAGE_MODEL.to_string(), llm);
        services
    }

    /// Service probes folded into one report, downgraded while any
    /// degradation is still open.
    pub fn health_report(&self) -> HealthReport {
        let services = self.check_services();
        HealthReporter::build_with_degradations(&services, &self.tracker())
    }

    /// Snapshot of recorded degradations.
    pub fn degradation_log(&self) -> DegradationTracker {
        self.tracker().clone()
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Reranked retrieval, optionally adaptive-filtered, with one round of
    /// rewrites when the original query finds nothing.
    fn retrieve_reranked(&self, query: &str, adaptive: bool) -> Retrieved {
        let cfg = self.retriever.config();
        let _span =
            c3rag_observability::retrieval_span!(cfg.per_partition_k, cfg.final_k).entered();
        let search = |q: &str| {
            let results = self
                .retriever
                .search_all_with_rerank(q, cfg.per_partition_k, cfg.final_k);
            if adaptive {
                self.retriever
                    .filter_by_adaptive_threshold(results, cfg.adaptive_min_results)
            } else {
                results
            }
        };

        let results = search(query);
        if !results.is_empty() || !cfg.query_rewrite {
            return Retrieved {
                results,
                query: query.to_string(),
                rewritten: false,
            };
        }

        info!("no results; trying rewritten queries");
        for rewrite in self.rewrite_query(query) {
            let results = search(rewrite.as_str());
            if !results.is_empty() {
                info!(rewrite = %rewrite, results = results.len(), "rewritten query found results");
                return Retrieved {
                    results,
                    query: rewrite,
                    rewritten: true,
                };
            }
        }
        Retrieved {
            results: Vec::new(),
            query: query.to_string(),
            rewritten: false,
        }
    }

    /// Adaptive filtering on fused results. RRF scores sit far below the
    /// threshold floor, so the filter reads the pre-fusion score and the
    /// survivors are put back in fused order.
    fn filter_fused(&self, fused: Vec<SearchResult>, min_results: usize) -> Vec<SearchResult> {
        let staged: Vec<SearchResult> = fused
            .into_iter()
            .map(|r| {
                let original = r
                    .metadata
                    .get(ORIGINAL_SCORE_KEY)
                    .and_then(|v| v.as_f64())
                    .unwrap_or(r.score);
                r.rescored(original).with_metadata(FUSED_SCORE_KEY, r.score)
            })
            .collect();
        let mut kept: Vec<SearchResult> = self
            .retriever
            .filter_by_adaptive_threshold(staged, min_results)
            .into_iter()
            .map(|r| {
                let fused = r
                    .metadata
                    .get(FUSED_SCORE_KEY)
                    .and_then(|v| v.as_f64())
                    .unwrap_or(r.score);
                r.rescored(fused)
            })
            .collect();
        sort_by_score_desc(&mut kept);
        kept
    }

    fn qa_prompt(&self, query: &str, results: &[SearchResult]) -> String {
        let evidence = format_evidence_blocks(results, self.registry());
        if results.len() < MIN_RESULTS_FOR_CONFIDENT_PROMPT {
            prompts::low_relevance(&evidence, query, results.len())
        } else {
            prompts::strict_qa(&evidence, query)
        }
    }

    /// Generate with the citation prompt. `Err` carries the failure text.
    fn generate_answer(&self, query: &str, results: &[SearchResult]) -> Result<String, String> {
        let prompt = self.qa_prompt(query, results);
        self.llm
            .generate(&prompt, prompts::SYSTEM_MESSAGE)
            .map_err(|e| e.to_string())
    }

    /// Ask the model to audit `answer`, then cross-check its citations.
    fn reflect(
        &self,
        query: &str,
        answer: &str,
        results: &[SearchResult],
        attempt: u32,
    ) -> VerificationResult {
        let _span = c3rag_observability::reflection_span!(attempt).entered();
        let evidence = format_evidence_blocks(results, self.registry());
        let prompt = prompts::self_reflection(query, answer, &evidence);
        let mut verification = match self.llm.generate(&prompt, "") {
            Ok(output) => parse_verification(&output),
            Err(e) => VerificationResult::unknown(format!("self-reflection unavailable: {e}")),
        };

        let missing = audit_citations(answer, results.len());
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
            verification = verification.downgrade(format!(
                "answer cites evidence that does not exist: [来源: {}]",
                ids.join(",")
            ));
        }

        events::reflection_verdict(
            attempt,
            verdict_str(&verification),
            verification.issues.len(),
            parse_source_str(&verification),
        );
        verification
    }

    /// Evidence without synthesis, confidence `low`.
    fn llm_unavailable(&self, results: &[SearchResult], reason: &str) -> RagResponse {
        self.degrade(SERVICE_LANGUAGE_MODEL, reason, "retrieved evidence without synthesis");
        events::fallback_engaged(QueryType::FallbackLlmUnavailable.as_str(), reason);

        let mut answer = prompts::LANGUAGE_MODEL_UNAVAILABLE_MESSAGE.to_string();
        for (i, r) in results.iter().enumerate() {
            answer.push_str(&format!("\n\n[{}] {}", i + 1, preview(&r.text, SOURCE_PREVIEW_CHARS)));
        }
        RagResponse::new(
            answer,
            QueryType::FallbackLlmUnavailable,
            ConfidenceLevel::Low,
        )
        .with_sources(results)
        .with_note(format!("language model unavailable: {reason}"))
    }

    fn tracker(&self) -> MutexGuard<'_, DegradationTracker> {
        self.degradation.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn degrade(&self, component: &str, failure: &str, fallback: &str) {
        self.tracker()
            .record(DegradationEvent::new(component, failure, fallback));
    }

    fn recovered(&self, component: &str) {
        self.tracker().mark_recovered(component);
    }

    fn finish(&self, started: Instant, resp: RagResponse) -> RagResponse {
        events::answer_completed(
            resp.query_type.as_str(),
            resp.confidence.as_str(),
            resp.sources.len(),
            elapsed_ms(started),
        );
        resp
    }
}

fn no_results_response() -> RagResponse {
    RagResponse::new(
        prompts::NO_RESULTS_RESPONSE,
        QueryType::QaNoResults,
        ConfidenceLevel::None,
    )
}

fn retrieval_notes(retrieved: &Retrieved) -> Vec<String> {
    if retrieved.rewritten {
        vec![format!("retrieved with rewritten query: {}", retrieved.query)]
    } else {
        Vec::new()
    }
}

/// Numbered example blocks for the event-generation prompt.
fn format_examples(examples: &[SearchResult]) -> String {
    examples
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let project = match r.meta_str("project") {
                "" => "Example",
                p => p,
            };
            format!("### [{}] {}\n{}", i + 1, project, r.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Verdict, issues, and the reviewer's suggested correction, if any.
fn prefixed(label: &str, verification: &VerificationResult) -> Vec<String> {
    let mut notes = vec![format!("{label}: {}", verdict_str(verification))];
    notes.extend(
        verification
            .issues
            .iter()
            .map(|issue| format!("{label}: {issue}")),
    );
    if let Some(corrected) = &verification.corrected_answer {
        notes.push(format!("{label}: suggested correction: {corrected}"));
    }
    notes
}

fn verdict_str(v: &VerificationResult) -> &'static str {
    use c3rag_core::models::Verdict;
    match v.verdict {
        Verdict::Reliable => "reliable",
        Verdict::Unreliable => "unreliable",
        Verdict::Unknown => "unknown",
    }
}

fn parse_source_str(v: &VerificationResult) -> &'static str {
    use c3rag_core::models::ParseSource;
    match v.parsed_from {
        ParseSource::Structured => "structured",
        ParseSource::LegacyText => "legacy_text",
        ParseSource::Unparsed => "unparsed",
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
