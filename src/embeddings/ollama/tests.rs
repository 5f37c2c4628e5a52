use super::*;
use crate::config::OllamaConfig;

#[test]
fn client_configuration() {
    let config = OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        batch_size: 128,
        embedding_dimension: 768,
    };
    let client = OllamaClient::new(&config).expect("should create client");

    assert_eq!(client.model, "test-model");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.model_name(), "test-model");
}

#[test]
fn embed_request_serialization() {
    let single = EmbedRequest {
        model: "nomic-embed-text:latest".to_string(),
        input: EmbedInput::Single("hello".to_string()),
    };
    let json = serde_json::to_string(&single).expect("should serialize");
    assert_eq!(
        json,
        r#"{"model":"nomic-embed-text:latest","input":"hello"}"#
    );

    let batch = EmbedRequest {
        model: "nomic-embed-text:latest".to_string(),
        input: EmbedInput::Batch(vec!["a".to_string(), "b".to_string()]),
    };
    let json = serde_json::to_string(&batch).expect("should serialize");
    assert_eq!(
        json,
        r#"{"model":"nomic-embed-text:latest","input":["a","b"]}"#
    );
}

#[test]
fn embed_response_parsing() {
    let body = r#"{"model":"nomic-embed-text:latest","embeddings":[[0.1,0.2],[0.3,0.4]]}"#;
    let response: EmbedResponse = serde_json::from_str(body).expect("should parse");
    assert_eq!(response.embeddings.len(), 2);
    assert_eq!(response.embeddings[0], vec![0.1, 0.2]);
}

#[test]
fn empty_batch_short_circuits() {
    let client = OllamaClient::new(&OllamaConfig::default()).expect("should create client");
    let results = client.embed_batch(&[]).expect("empty batch should succeed");
    assert!(results.is_empty());
}
