//! OpenAI-compatible backend against a local stub server.
//!
//! Run with: cargo test --package biostructx-llm --test test_backend

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{json, Value};

use biostructx_common::HttpClient;
use biostructx_llm::{LlmBackend, LlmError, LlmRequest, Message, OpenAiCompatibleBackend};

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, String) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return (StatusCode::UNAUTHORIZED, json!({"error": {"message": "Incorrect API key"}}).to_string());
    }
    let question = body["messages"][1]["content"].as_str().unwrap_or_default();
    let reply = json!({
        "model": body["model"],
        "choices": [ { "message": { "role": "assistant", "content": format!("echo: {}", question) } } ],
        "usage": { "prompt_tokens": 12, "completion_tokens": 4 }
    });
    (StatusCode::OK, reply.to_string())
}

fn request() -> LlmRequest {
    LlmRequest {
        messages: vec![Message::system("sys"), Message::user("What is a kinase?")],
        model: Some("gpt-4".into()),
        max_tokens: Some(256),
        temperature: Some(0.2),
    }
}

#[tokio::test]
async fn test_completion_roundtrip() {
    let base = spawn_stub(Router::new().route("/v1/chat/completions", post(completions))).await;
    let backend = OpenAiCompatibleBackend::new(
        HttpClient::new().unwrap(),
        base,
        "gpt-3.5-turbo",
        Some(SecretString::from("sk-test".to_string())),
    );
    let resp = backend.complete(request()).await.unwrap();
    assert_eq!(resp.content, "echo: What is a kinase?");
    assert_eq!(resp.model, "gpt-4");
    assert_eq!(resp.prompt_tokens, 12);
}

#[tokio::test]
async fn test_api_error_surfaces_message() {
    let base = spawn_stub(Router::new().route("/v1/chat/completions", post(completions))).await;
    let backend = OpenAiCompatibleBackend::new(
        HttpClient::new().unwrap(),
        base,
        "gpt-3.5-turbo",
        Some(SecretString::from("sk-wrong".to_string())),
    );
    match backend.complete(request()).await {
        Err(LlmError::ApiError { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key");
        }
        other => panic!("expected API error, got {:?}", other.map(|r| r.content)),
    }
}

#[tokio::test]
async fn test_blocked_host() {
    let backend = OpenAiCompatibleBackend::new(HttpClient::new().unwrap(), "https://llm.example.net", "m", None);
    assert!(matches!(backend.complete(request()).await, Err(LlmError::Client(_))));
}
