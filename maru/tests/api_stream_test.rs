//! Router-level tests: session auth, the NDJSON wire format, and history.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use maru::api::create_router;
use maru::db::ConversationStore;
use serde_json::Value;
use tower::ServiceExt;

async fn body_lines(response: axum::response::Response) -> Vec<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("each line is a JSON event"))
        .collect()
}

#[tokio::test]
async fn stream_endpoint_emits_ndjson_with_terminal_done() {
    let h = harness().await;
    h.insert_session("session-abc", 42).await;
    mock_llm_stream(&h.llm_server, &["Seoul ", "or Busan?"]).await;

    let app = create_router(h.state.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/chat/send/stream")
                .header("content-type", "application/json")
                .header("Authorization", "Bearer session-abc")
                .body(Body::from(r#"{"message":"seoul vs busan"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/x-ndjson"
    );

    let events = body_lines(response).await;
    assert_single_terminal(&events);
    let done = events.last().unwrap();
    assert_eq!(done["type"], "done");
    assert_eq!(done["full_response"], "Seoul or Busan?");

    // History reflects the streamed exchange for the session's user.
    let history = h.state.chat.history(42, 10).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "seoul vs busan");
}

#[tokio::test]
async fn stream_endpoint_rejects_without_session() {
    let h = harness().await;
    let app = create_router(h.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/chat/send/stream")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"message":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_message_is_rejected_before_streaming() {
    let h = harness().await;
    h.insert_session("session-abc", 42).await;
    let app = create_router(h.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/chat/send/stream")
                .header("content-type", "application/json")
                .header("Authorization", "Bearer session-abc")
                .body(Body::from(r#"{"message":""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_endpoint_returns_newest_first() {
    let h = harness().await;
    h.insert_session("session-abc", 42).await;

    h.state
        .db
        .append_conversation(42, "first question", "first answer")
        .await
        .expect("append");
    h.state
        .db
        .append_conversation(42, "second question", "second answer")
        .await
        .expect("append");
    // Another user's conversation must not leak in.
    h.state
        .db
        .append_conversation(7, "someone else", "answer")
        .await
        .expect("append");

    let app = create_router(h.state.clone());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/chat/history?limit=10")
                .header("Authorization", "Bearer session-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    let items = json["data"].as_array().expect("data array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["message"], "second question");
    assert_eq!(items[1]["message"], "first question");
    assert!(items[0].get("conversation_id").is_some());
    assert!(items[0].get("created_at").is_some());
}
