//! Gemini client tests against a wiremock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use casebook::providers::GeminiClient;
use casebook::{CaseGateway, CaseRequestOptions, Casebook, CasebookError};

const MODEL: &str = "gemini-3-flash-preview";
const ENDPOINT: &str = "/models/gemini-3-flash-preview:generateContent";

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": text}]
            },
            "finishReason": "STOP"
        }]
    })
}

async fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::with_base_url("test_key", server.uri()).unwrap()
}

#[tokio::test]
async fn generate_content_sends_key_and_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test_key"))
        .and(body_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Say hi"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("hi")))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server)
        .await
        .generate_content(MODEL, "Say hi")
        .await
        .unwrap();
    assert_eq!(text, "hi");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("k", format!("{}/", server.uri())).unwrap();
    assert_eq!(client.generate_content(MODEL, "x").await.unwrap(), "ok");
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .generate_content(MODEL, "x")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::AuthenticationFailed));
}

#[tokio::test]
async fn not_found_maps_to_model_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/no-such-model:generateContent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .generate_content("no-such-model", "x")
        .await
        .unwrap_err();
    match err {
        CasebookError::ModelNotFound(model) => assert_eq!(model, "no-such-model"),
        other => panic!("expected ModelNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn too_many_requests_carries_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .generate_content(MODEL, "x")
        .await
        .unwrap_err();
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert!(matches!(err, CasebookError::RateLimited { .. }));
}

#[tokio::test]
async fn server_error_uses_api_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "backend overloaded", "status": "INTERNAL"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .generate_content(MODEL, "x")
        .await
        .unwrap_err();
    match err {
        CasebookError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "backend overloaded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_candidate_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("   ")))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .generate_content(MODEL, "x")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::EmptyResponse));
}

#[tokio::test]
async fn casebook_generates_case_through_gemini() {
    let server = MockServer::start().await;

    let case = r#"```json
{"id": "512", "title": "The Case of the Endless Email",
 "backstory": "Sam needed a quick note.", "faultyPrompt": "Write an email.",
 "faultyOutput": "Dear Sir, (three pages later)...", "botchedElement": "Response",
 "botchedExplanation": "No length or format was requested.",
 "idealPrompt": "Write a two-line email."}
```"#;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(case)))
        .expect(1)
        .mount(&server)
        .await;

    let casebook = Casebook::builder()
        .gemini("test_key")
        .gemini_base_url(server.uri())
        .build()
        .unwrap();

    let first = casebook
        .generate_case(Some("s1"), CaseRequestOptions::default())
        .await
        .unwrap();
    assert_eq!(first.id, "512");
    assert_eq!(first.botched_element.as_str(), "response");

    // Served from cache; the mock's `expect(1)` verifies on drop.
    let second = casebook
        .generate_case(Some("s1"), CaseRequestOptions::default())
        .await
        .unwrap();
    assert_eq!(first, second);
}
