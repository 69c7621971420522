use mockito::Matcher;
use serde_json::json;

use globetrotter_api::config::{ModelConfig, SamplingConfig};
use globetrotter_api::services::model_client::{
    CompletionClient, CompletionRequest, GroqClient, ModelError,
};

fn config(base_url: String, api_key: Option<&str>) -> ModelConfig {
    ModelConfig {
        api_key: api_key.map(str::to_string),
        base_url,
        ..Default::default()
    }
}

fn request() -> CompletionRequest {
    CompletionRequest::new(
        "Plan a day in Paris",
        "Output JSON only",
        SamplingConfig::new("llama-3.3-70b-versatile", 0.7, 512),
    )
}

#[tokio::test]
async fn test_returns_first_choice_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama-3.3-70b-versatile",
            "max_tokens": 512,
            "messages": [
                {"role": "system", "content": "Output JSON only"},
                {"role": "user", "content": "Plan a day in Paris"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"choices": [{"message": {"role": "assistant", "content": "{\"ok\":true}"}}]})
                .to_string(),
        )
        .create_async()
        .await;

    let client = GroqClient::new(&config(server.url(), Some("test-key"))).unwrap();
    let text = client.complete(&request()).await.unwrap();

    assert_eq!(text, "{\"ok\":true}");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_key_is_upstream_auth() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(json!({"error": {"message": "Invalid API Key"}}).to_string())
        .create_async()
        .await;

    let client = GroqClient::new(&config(server.url(), Some("bad-key"))).unwrap();
    let err = client.complete(&request()).await.unwrap_err();

    match err {
        ModelError::UpstreamAuth(message) => assert!(message.contains("Invalid API Key")),
        other => panic!("expected auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_upstream_unavailable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let client = GroqClient::new(&config(server.url(), Some("test-key"))).unwrap();
    let err = client.complete(&request()).await.unwrap_err();

    match err {
        ModelError::UpstreamUnavailable(message) => {
            assert!(message.contains("503"));
            assert!(message.contains("overloaded"));
        }
        other => panic!("expected unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_key_never_calls_out() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let client = GroqClient::new(&config(server.url(), None)).unwrap();
    let err = client.complete(&request()).await.unwrap_err();

    assert!(matches!(err, ModelError::UpstreamAuth(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_choices_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let client = GroqClient::new(&config(server.url(), Some("test-key"))).unwrap();
    let err = client.complete(&request()).await.unwrap_err();

    assert!(matches!(err, ModelError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_upstream_unavailable() {
    let client = GroqClient::new(&config("http://127.0.0.1:1".to_string(), Some("test-key"))).unwrap();
    let err = client.complete(&request()).await.unwrap_err();

    assert!(matches!(err, ModelError::UpstreamUnavailable(_)));
}
