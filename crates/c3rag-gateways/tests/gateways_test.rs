//! Gateway wiring against endpoints that refuse connections.

use c3rag_core::config::RagConfig;
use c3rag_core::errors::Service;
use c3rag_gateways::Gateways;

fn unreachable_config() -> RagConfig {
    let mut config = RagConfig::default();
    config.vector_store.host = "127.0.0.1".into();
    config.vector_store.port = 9;
    config.vector_store.timeout_secs = 1;
    config.embedding.base_url = "http://127.0.0.1:9".into();
    config.embedding.timeout_secs = 1;
    config.llm.base_url = "http://127.0.0.1:9".into();
    config.llm.timeout_secs = 1;
    config.llm.health_timeout_secs = 1;
    config
}

#[test]
fn building_gateways_does_not_touch_the_network() {
    // Would fail if construction probed the endpoints.
    let _ = Gateways::from_config(&unreachable_config());
}

#[test]
fn embedder_failure_surfaces_as_embedder_error() {
    let gateways = Gateways::from_config(&unreachable_config());
    let err = gateways.embedder.encode("精灵").unwrap_err();
    assert_eq!(err.service(), Some(Service::Embedder));
    assert_eq!(gateways.embedder.dimensions(), 0);
}

#[test]
fn health_probes_report_unreachable_services() {
    let gateways = Gateways::from_config(&unreachable_config());
    assert!(!gateways.vector_store.health().ok);
    assert!(!gateways.language_model.health().ok);
}

#[test]
fn unknown_provider_is_a_config_error() {
    let mut config = unreachable_config();
    config.embedding.provider = "onnx".into();
    let err = match c3rag_gateways::create_embedder(&config.embedding) {
        Ok(_) => panic!("onnx provider should be rejected"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("unknown embedding provider"));
}
