#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::{Stream, StreamExt};
use libsql::params;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use maru::api::AppState;
use maru::config::{
    Config, DatabaseConfig, EmbeddingsConfig, LlmConfig, ServerConfig, VectorConfig,
};
use maru::db::{Database, DatabaseBackend, LibSqlBackend};
use maru::embeddings::EmbeddingProvider;
use maru::llm::LlmProvider;
use maru::models::StreamEvent;
use maru::vector::VectorSearchProvider;

pub struct TestHarness {
    pub state: AppState,
    pub embed_server: MockServer,
    pub vector_server: MockServer,
    pub llm_server: MockServer,
    db_url: String,
    _dir: tempfile::TempDir,
}

/// Full application state wired against mock collaborators and a
/// file-backed database (`:memory:` is private per connection).
pub async fn harness() -> TestHarness {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_url = format!("file:{}", dir.path().join("maru-test.db").display());

    let embed_server = MockServer::start().await;
    let vector_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: db_url.clone(),
            auth_token: None,
            local_path: None,
        },
        embeddings: EmbeddingsConfig {
            model: "openai/text-embedding-3-small".to_string(),
            dimensions: 4,
            api_key: Some("test-key".to_string()),
            base_url: Some(embed_server.uri()),
            timeout_secs: 5,
        },
        vector: VectorConfig {
            url: vector_server.uri(),
            api_key: None,
            festival_collection: "festivals".to_string(),
            attraction_collection: "attractions".to_string(),
            restaurant_collection: "restaurants".to_string(),
            top_k: 5,
            min_score: 0.3,
            timeout_secs: 5,
        },
        llm: Some(LlmConfig {
            model: "openai/gpt-4o-mini".to_string(),
            api_key: Some("test-key".to_string()),
            base_url: Some(llm_server.uri()),
            timeout_secs: 10,
        }),
    };

    let raw_db = Database::new(&config.database).await.expect("database");
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));
    let embeddings = EmbeddingProvider::new(&config.embeddings).expect("embeddings");
    let vector = VectorSearchProvider::new(&config.vector).expect("vector");
    let llm = LlmProvider::new(config.llm.as_ref());

    TestHarness {
        state: AppState::new(config, db, embeddings, vector, llm),
        embed_server,
        vector_server,
        llm_server,
        db_url,
        _dir: dir,
    }
}

impl TestHarness {
    /// Insert a session token through a second connection to the same file.
    pub async fn insert_session(&self, token: &str, user_id: i64) {
        let db = Database::new(&DatabaseConfig {
            url: self.db_url.clone(),
            auth_token: None,
            local_path: None,
        })
        .await
        .expect("session database");
        let conn = db.connect().expect("connect");
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                token.to_string(),
                user_id,
                Utc::now().to_rfc3339(),
                Some((Utc::now() + Duration::hours(1)).to_rfc3339()),
            ],
        )
        .await
        .expect("insert session");
    }
}

pub async fn mock_embeddings(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.1, 0.2, 0.3, 0.4]}]
        })))
        .mount(server)
        .await;
}

pub async fn mock_search(server: &MockServer, collection: &str, hits: Value) {
    Mock::given(method("POST"))
        .and(path(format!("/collections/{collection}/points/search")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": hits })))
        .mount(server)
        .await;
}

pub async fn mock_empty_search(server: &MockServer, collections: &[&str]) {
    for collection in collections {
        mock_search(server, collection, json!([])).await;
    }
}

pub async fn mock_scroll(server: &MockServer, collection: &str, points: Value) {
    Mock::given(method("POST"))
        .and(path(format!("/collections/{collection}/points/scroll")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"points": points, "next_page_offset": null}
        })))
        .mount(server)
        .await;
}

/// OpenAI-style SSE body for a streamed chat completion.
pub fn sse_body(chunks: &[&str]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        let payload = json!({
            "id": "chatcmpl-test",
            "object": "chat.completion.chunk",
            "created": 0,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {"content": chunk}, "finish_reason": null}]
        });
        body.push_str(&format!("data: {payload}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

pub async fn mock_llm_stream(server: &MockServer, chunks: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(chunks), "text/event-stream"),
        )
        .mount(server)
        .await;
}

/// SSE body that fails mid-stream: two good chunks, then a frame that does
/// not deserialize as a completion chunk.
pub async fn mock_llm_stream_failing_after(server: &MockServer, chunks: &[&str]) {
    let mut body = sse_body(chunks);
    body.truncate(body.len() - "data: [DONE]\n\n".len());
    body.push_str("data: {\"bogus\": true}\n\n");
    body.push_str("data: [DONE]\n\n");

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

pub async fn mock_llm_error(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(server)
        .await;
}

/// Drain a reply stream into serialized event values.
pub async fn collect_events(stream: impl Stream<Item = StreamEvent>) -> Vec<Value> {
    futures::pin_mut!(stream);
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(serde_json::to_value(&event).expect("serialize event"));
    }
    events
}

/// Assert the protocol invariant: exactly one terminal event, and it is
/// the last one.
pub fn assert_single_terminal(events: &[Value]) {
    let terminal_count = events
        .iter()
        .filter(|e| e["type"] == "done" || e["type"] == "error")
        .count();
    assert_eq!(terminal_count, 1, "expected exactly one terminal event: {events:#?}");
    let last = events.last().expect("at least one event");
    assert!(
        last["type"] == "done" || last["type"] == "error",
        "terminal event must be last: {events:#?}"
    );
}
