mod common;

use blogsmith_llm::gemini::GeminiClient;
use blogsmith_llm::traits::{LlmClient, LlmError};
use blogsmith_llm::blog::BlogGenerator;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-1.5-flash";
const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

async fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::with_endpoint(
        "test-key".into(),
        MODEL.into(),
        &format!("{}/v1beta", server.uri()),
    )
    .expect("client")
}

#[tokio::test]
async fn generate_sends_prompt_and_returns_candidate_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Write about Widget 3000"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "<h2>Widget"}, {"text": " 3000</h2>"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 7, "totalTokenCount": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let resp = client
        .generate("Write about Widget 3000", None, None, None)
        .await
        .expect("generate ok");

    assert_eq!(resp.text, "<h2>Widget 3000</h2>");
    assert_eq!(resp.tokens_used, Some(12));
}

#[tokio::test]
async fn blog_generator_is_a_pass_through() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let body = "```html\n<h2>Hi</h2>\n```\n  ";
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": body}]}, "finishReason": "STOP"}]
        })))
        .mount(&server)
        .await;

    let generator = BlogGenerator::new(Arc::new(client_for(&server).await));
    let out = generator.generate("anything").await.unwrap();
    assert_eq!(out, body);
}

#[tokio::test]
async fn quota_errors_map_to_rate_limit_without_retry() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generator = BlogGenerator::new(Arc::new(client_for(&server).await));
    let err = generator.generate("anything").await.unwrap_err();
    match err.source {
        LlmError::RateLimit(msg) => assert!(msg.contains("exhausted")),
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_key_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .generate("x", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Auth(_)));
}

#[tokio::test]
async fn blocked_prompt_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .generate("x", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Blocked(_)));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .generate("x", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Malformed(_)));
}

#[tokio::test]
#[ignore]
#[cfg(feature = "e2e")]
async fn gemini_live_smoketest() {
    common::init_test_tracing();
    let key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY for e2e");
    let client = GeminiClient::new(key, MODEL.into()).unwrap();
    assert!(client.health_check().await.unwrap());
}
