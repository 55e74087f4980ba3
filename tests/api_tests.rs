mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::mocks::{EchoModel, FailingModel, SlowModel};
use kidtutor::{AppState, LanguageModel, TutorConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> TutorConfig {
    let mut config = TutorConfig::default();
    config.llm.retry_backoff_ms = 1;
    config.llm.request_timeout_secs = 5;
    config
}

fn server_with(model: Arc<dyn LanguageModel>) -> (TestServer, AppState) {
    let state = AppState::new(test_config(), model).unwrap();
    let server = TestServer::new(state.router()).unwrap();
    (server, state)
}

#[tokio::test]
async fn test_home_reports_running() {
    let (server, _) = server_with(Arc::new(EchoModel::new()));

    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("Backend is running");
}

#[tokio::test]
async fn test_ask_returns_question_and_answer() {
    let model = EchoModel::new();
    let (server, state) = server_with(Arc::new(model.clone()));

    let response = server
        .post("/ask")
        .json(&json!({ "question": "Why is the sky blue?", "session_id": "kid42" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["question"], "Why is the sky blue?");
    assert!(!body["answer"].as_str().unwrap().is_empty());

    // First turn has no context; the prompt carries the tutor template.
    let answers = model.answer_calls();
    assert_eq!(answers.len(), 1);
    assert!(answers[0].0.is_empty());
    assert!(answers[0].1.contains("fun and friendly tutor"));
    assert!(answers[0].1.contains("Question: Why is the sky blue?"));

    let record = state.engine.sessions().get("kid42").unwrap().snapshot();
    assert_eq!(record.turns, 1);
    assert!(record.summary.contains("Why is the sky blue?"));
}

#[tokio::test]
async fn test_follow_up_sees_previous_summary() {
    let model = EchoModel::new();
    let (server, _) = server_with(Arc::new(model.clone()));

    for question in ["What is a volcano?", "Tell me more"] {
        server
            .post("/ask")
            .json(&json!({ "question": question, "session_id": "kid42" }))
            .await
            .assert_status_ok();
    }

    let answers = model.answer_calls();
    assert_eq!(answers.len(), 2);
    assert!(answers[1].0.contains("What is a volcano?"));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let model = EchoModel::new();
    let (server, state) = server_with(Arc::new(model.clone()));

    server
        .post("/ask")
        .json(&json!({ "question": "Why do cats purr?", "session_id": "alice" }))
        .await
        .assert_status_ok();
    server
        .post("/ask")
        .json(&json!({ "question": "How big is the moon?", "session_id": "bob" }))
        .await
        .assert_status_ok();

    let answers = model.answer_calls();
    assert!(answers[1].0.is_empty());

    let bob = state.engine.sessions().get("bob").unwrap().snapshot();
    assert!(!bob.summary.contains("cats"));
}

#[tokio::test]
async fn test_missing_session_id_uses_default() {
    let (server, state) = server_with(Arc::new(EchoModel::new()));

    server
        .post("/ask")
        .json(&json!({ "question": "What do bees eat?" }))
        .await
        .assert_status_ok();

    assert!(state.engine.sessions().contains("default"));
}

#[tokio::test]
async fn test_empty_question_is_rejected() {
    let model = EchoModel::new();
    let (server, state) = server_with(Arc::new(model.clone()));

    for body in [
        json!({ "question": "" }),
        json!({ "question": "   " }),
        json!({ "session_id": "kid42" }),
        json!({}),
    ] {
        let response = server.post("/ask").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No question provided" }));
    }

    assert!(model.calls().is_empty());
    assert!(state.engine.sessions().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let (server, _) = server_with(Arc::new(EchoModel::new()));

    let response = server
        .post("/ask")
        .text("{not json")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_upstream_failure_returns_500_and_keeps_memory() {
    let model = FailingModel::permanent("API key not valid");
    let (server, state) = server_with(Arc::new(model.clone()));

    let response = server
        .post("/ask")
        .json(&json!({ "question": "Why is grass green?", "session_id": "kid7" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "API key not valid" }));
    assert_eq!(model.attempts(), 1);

    let record = state.engine.sessions().get("kid7").unwrap().snapshot();
    assert!(record.is_empty());
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let model = FailingModel::transient("503 Service Unavailable");
    let (server, _) = server_with(Arc::new(model.clone()));

    server
        .post("/ask")
        .json(&json!({ "question": "Why is grass green?" }))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    // Default policy: one attempt plus two retries.
    assert_eq!(model.attempts(), 3);
}

#[tokio::test]
async fn test_session_memory_endpoint() {
    let (server, _) = server_with(Arc::new(EchoModel::new()));

    server
        .get("/sessions/kid42/memory")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/ask")
        .json(&json!({ "question": "What is rain?", "session_id": "kid42" }))
        .await
        .assert_status_ok();

    let response = server.get("/sessions/kid42/memory").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["session_id"], "kid42");
    assert_eq!(body["turns"], 1);
    assert!(body["summary"].as_str().unwrap().contains("What is rain?"));
}

#[tokio::test]
async fn test_concurrent_first_requests_share_one_session() {
    let (server, state) = server_with(Arc::new(EchoModel::new()));

    let requests = (0..16).map(|i| {
        let server = &server;
        async move {
            server
                .post("/ask")
                .json(&json!({ "question": format!("Question number {}", i), "session_id": "race" }))
                .await
        }
    });

    for response in futures::future::join_all(requests).await {
        response.assert_status_ok();
    }

    assert_eq!(state.engine.sessions().len(), 1);
    let record = state.engine.sessions().get("race").unwrap().snapshot();
    assert_eq!(record.turns, 16);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (server, _) = server_with(Arc::new(EchoModel::new()));

    let response = server
        .get("/")
        .add_header(
            axum::http::header::ORIGIN,
            axum::http::HeaderValue::from_static("http://kids.example"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let model = EchoModel::new();
    let (server, _) = server_with(Arc::new(model.clone()));

    let question = "why ".repeat(20_000);
    let response = server
        .post("/ask")
        .json(&json!({ "question": question }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_415() {
    let (server, _) = server_with(Arc::new(EchoModel::new()));

    let response = server.post("/ask").text("question=hi").await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_memory_endpoint_answers_during_running_turn() {
    let (server, state) = server_with(Arc::new(SlowModel::new(Duration::from_millis(500))));

    let running = {
        let engine = Arc::clone(&state.engine);
        tokio::spawn(async move { engine.ask(Some("kid"), "Why do owls hoot?").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = tokio::time::timeout(Duration::from_millis(250), async {
        server.get("/sessions/kid/memory").await
    })
    .await
    .expect("memory endpoint waited for the running turn");

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["turns"], 0);

    running.await.unwrap().unwrap();
    let body: Value = server.get("/sessions/kid/memory").await.json();
    assert_eq!(body["turns"], 1);
}
