use std::sync::Arc;

use c3rag_core::config::RetrievalConfig;
use c3rag_core::models::{ParseSource, QueryRoute, Verdict};
use c3rag_core::partitions::{default_partitions, PartitionRegistry};
use c3rag_core::traits::IQueryClassifier;
use c3rag_orchestrator::{audit_citations, parse_verification, AnswerOrchestrator, KeywordClassifier};
use c3rag_retrieval::HybridRetriever;
use proptest::prelude::*;
use test_fixtures::stubs::hit;
use test_fixtures::{ScriptedLanguageModel, StubEmbedder, StubVectorStore};

proptest! {
    #[test]
    fn parse_never_panics(output in "\\PC{0,200}") {
        let _ = parse_verification(&output);
    }

    #[test]
    fn structured_verdicts_survive_parsing(
        reliable in any::<bool>(),
        issues in prop::collection::vec("[a-z][a-z ]{0,19}", 0..5),
    ) {
        let output = serde_json::json!({ "reliable": reliable, "issues": issues }).to_string();
        let parsed = parse_verification(&output);
        prop_assert_eq!(parsed.parsed_from, ParseSource::Structured);
        prop_assert_eq!(parsed.verdict == Verdict::Reliable, reliable);
        let expected: Vec<String> = issues.iter().map(|i| i.trim().to_string()).collect();
        prop_assert_eq!(parsed.issues, expected);
    }

    #[test]
    fn in_range_citations_pass_audit(
        count in 1usize..20,
        picks in prop::collection::vec(0usize..100, 0..6),
    ) {
        let answer: String = picks
            .iter()
            .map(|p| format!("事实 [来源: {}]。", p % count + 1))
            .collect();
        prop_assert!(audit_citations(&answer, count).is_empty());
        let bad = format!("{answer} 捏造 [来源: {}]", count + 1);
        prop_assert_eq!(audit_citations(&bad, count), vec![count + 1]);
    }

    #[test]
    fn event_sheet_keyword_always_routes_to_code(prefix in "[a-z ]{0,12}", suffix in "[a-z ]{0,12}") {
        let query = format!("{prefix}事件表{suffix}");
        prop_assert_eq!(KeywordClassifier::new().classify(&query), QueryRoute::Code);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn qa_generation_is_bounded(hits in 1usize..15, reliable_first in any::<bool>()) {
        let store = StubVectorStore::new().with_hits(
            "c3_guide",
            (0..hits)
                .map(|i| hit(&format!("snippet {i}"), 0.95 - i as f64 * 0.01))
                .collect(),
        );
        let reflection = if reliable_first {
            r#"{"reliable": true}"#
        } else {
            r#"{"reliable": false}"#
        };
        let llm = Arc::new(ScriptedLanguageModel::new().respond_when("事实核查员", reflection));
        let retriever = HybridRetriever::new(
            Arc::new(StubEmbedder::new()),
            Arc::new(store),
            PartitionRegistry::new(default_partitions()),
            RetrievalConfig::default(),
        );
        let orch = AnswerOrchestrator::new(retriever, llm.clone());
        let resp = orch.answer_qa("Sprite");

        let reflections = llm.calls_matching("事实核查员");
        let generations = llm.call_count() - reflections;
        prop_assert!(generations <= 2);
        prop_assert_eq!(generations, reflections);
        prop_assert_eq!(reflections, if reliable_first { 1 } else { 2 });
        prop_assert!(resp.sources.len() <= RetrievalConfig::default().final_k);
    }
}
