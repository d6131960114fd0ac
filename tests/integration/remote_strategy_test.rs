//! Remote Strategy Integration Tests
//!
//! Both wire dialects against a local mock server: request shape and
//! headers, usage normalization, error bodies and mid-flight cancellation.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use undoctrinator_llm::{
    AnthropicStrategy, CompletionRequest, CompletionResponse, CompletionStrategy, LlmError,
    OpenAIStrategy, Prompt, Usage,
};

fn request() -> CompletionRequest {
    CompletionRequest::new(Prompt::new("You are an analyst.", "TEXT TO ANALYZE: hello"))
        .with_defaults()
}

fn openai(server: &MockServer) -> OpenAIStrategy {
    OpenAIStrategy::new("sk-test", None)
        .unwrap()
        .with_base_url(format!("{}/v1/chat/completions", server.uri()))
}

fn anthropic(server: &MockServer) -> AnthropicStrategy {
    AnthropicStrategy::new("sk-ant-test", None)
        .unwrap()
        .with_base_url(format!("{}/v1/messages", server.uri()))
}

#[tokio::test]
async fn test_openai_request_shape_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("x-api-key", "sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "You are an analyst."},
                {"role": "user", "content": "TEXT TO ANALYZE: hello"}
            ],
            "max_tokens": 4000,
            "response_format": {"type": "json_object"},
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"ok\":true}"}}],
            "usage": {"prompt_tokens": 30, "completion_tokens": 12, "total_tokens": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = openai(&server).get_completions(request()).await.unwrap();
    assert_eq!(response.text, "{\"ok\":true}");
    assert_eq!(
        response.usage,
        Some(Usage {
            input_tokens: 30,
            total_tokens: 42
        })
    );
}

#[tokio::test]
async fn test_anthropic_request_shape_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-opus-latest",
            "system": "You are an analyst.",
            "messages": [{
                "role": "user",
                "content": [{"type": "text", "text": "TEXT TO ANALYZE: hello"}]
            }],
            "max_tokens": 4000,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "{\"ok\":"}, {"type": "text", "text": "true}"}],
            "usage": {"input_tokens": 25, "output_tokens": 8}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = anthropic(&server).get_completions(request()).await.unwrap();
    assert_eq!(response.text, "{\"ok\":true}");
    assert_eq!(
        response.usage,
        Some(Usage {
            input_tokens: 25,
            total_tokens: 33
        })
    );
}

#[tokio::test]
async fn test_error_body_becomes_message() {
    let server = MockServer::start().await;
    let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(body))
        .mount(&server)
        .await;

    let err = openai(&server).get_completions(request()).await.unwrap_err();
    match &err {
        LlmError::Transport { status, message } => {
            assert_eq!(*status, 401);
            assert_eq!(message, body);
        }
        other => panic!("Expected Transport, got {:?}", other),
    }
    assert_eq!(err.to_string(), body);

    let err = anthropic(&server).get_completions(request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Transport { status: 401, .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let strategy = OpenAIStrategy::new("sk-test", None)
        .unwrap()
        .with_base_url("http://127.0.0.1:1/v1/chat/completions");
    let err = strategy.get_completions(request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Network { .. }));
}

#[tokio::test]
async fn test_malformed_success_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = anthropic(&server).get_completions(request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Parse { .. }));
}

async fn assert_cancellation_resolves_empty(strategy: Arc<dyn CompletionStrategy>) {
    let call = {
        let strategy = strategy.clone();
        tokio::spawn(async move { strategy.get_completions(request()).await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    strategy.stop_generation();

    let response = tokio::time::timeout(Duration::from_secs(5), call)
        .await
        .expect("cancelled call should resolve promptly")
        .unwrap()
        .unwrap();
    assert_eq!(response, CompletionResponse::cancelled());
    assert_eq!(
        response.usage,
        Some(Usage {
            input_tokens: 0,
            total_tokens: 0
        })
    );
    assert!(response.text.is_empty());
}

#[tokio::test]
async fn test_cancellation_mid_flight_resolves_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [], "content": []}))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    assert_cancellation_resolves_empty(Arc::new(openai(&server))).await;
    assert_cancellation_resolves_empty(Arc::new(anthropic(&server))).await;
}

#[tokio::test]
async fn test_stop_is_idempotent_and_scoped_to_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "fresh"}],
            "usage": {"input_tokens": 1, "output_tokens": 1}
        })))
        .mount(&server)
        .await;

    let strategy = anthropic(&server);
    strategy.stop_generation();
    strategy.stop_generation();

    let response = strategy.get_completions(request()).await.unwrap();
    assert_eq!(response.text, "fresh");
}
