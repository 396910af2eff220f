use c3rag_core::errors::*;

#[test]
fn service_unavailable_carries_service_and_reason() {
    let err = RagError::unavailable(Service::VectorStore, "connection refused");
    let msg = err.to_string();
    assert!(msg.contains("vector_store"));
    assert!(msg.contains("connection refused"));
    assert_eq!(err.service(), Some(Service::VectorStore));
}

#[test]
fn malformed_response_carries_service() {
    let err = RagError::malformed(Service::LanguageModel, "missing message.content");
    assert!(err.to_string().contains("language_model"));
    assert_eq!(err.service(), Some(Service::LanguageModel));
}

#[test]
fn non_gateway_errors_have_no_service() {
    assert_eq!(RagError::NoRelevantResults.service(), None);
    let err = RagError::LowConfidenceAnswer {
        reason: "cites [来源: 9]".into(),
    };
    assert!(err.to_string().contains("[来源: 9]"));
    assert_eq!(err.service(), None);
}

#[test]
fn serialization_error_converts_to_rag_error() {
    let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
    let err: RagError = json_err.into();
    assert!(matches!(err, RagError::SerializationError(_)));
}
