//! OpenAI image provider tests against a mock HTTP server.

use std::sync::Arc;

use serde_json::json;
use storyreel_error::{ProviderErrorKind, RetryableError};
use storyreel_interface::VisualProvider;
use storyreel_models::{OpenAiImageConfig, OpenAiImageProvider};
use storyreel_storage::{InMemoryStorage, MediaStorage};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer, key: Option<&str>, storage: InMemoryStorage) -> OpenAiImageProvider {
    let config = OpenAiImageConfig {
        base_url: server.uri(),
        ..OpenAiImageConfig::default()
    };
    OpenAiImageProvider::new(config, key.map(String::from), Arc::new(storage))
}

#[tokio::test]
async fn test_generates_and_stores_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "prompt": "A dragon wants friends",
            "response_format": "b64_json",
            "n": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{ "b64_json": "ZmFrZSBwbmcgYnl0ZXM=" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = InMemoryStorage::new();
    let provider = provider(&server, Some("test-key"), storage.clone());

    let reference = provider
        .synthesize_visual("A dragon wants friends")
        .await
        .unwrap();

    assert!(reference.as_str().starts_with("memory://images/"));
    assert_eq!(
        storage.retrieve(&reference).await.unwrap(),
        b"fake png bytes"
    );
    assert_eq!(provider.provider_name(), "openai");
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider(&server, None, InMemoryStorage::new());
    let err = provider.synthesize_visual("anything").await.unwrap_err();

    assert!(matches!(err.kind, ProviderErrorKind::MissingApiKey { .. }));
    assert!(err.kind.is_unavailable());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = provider(&server, Some("test-key"), InMemoryStorage::new());
    let err = provider.synthesize_visual("anything").await.unwrap_err();

    assert_eq!(
        err.kind,
        ProviderErrorKind::HttpError {
            status_code: 503,
            message: "overloaded".to_string()
        }
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_client_error_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("content policy"))
        .mount(&server)
        .await;

    let provider = provider(&server, Some("test-key"), InMemoryStorage::new());
    let err = provider.synthesize_visual("anything").await.unwrap_err();

    assert!(!err.is_retryable());
    assert!(!err.kind.is_unavailable());
}

#[tokio::test]
async fn test_response_without_image_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let provider = provider(&server, Some("test-key"), InMemoryStorage::new());
    let err = provider.synthesize_visual("anything").await.unwrap_err();

    assert!(matches!(err.kind, ProviderErrorKind::Parse(_)));
}
