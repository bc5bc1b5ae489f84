use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaruError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector search error: {0}")]
    VectorSearch(String),

    #[error("No candidate found: {0}")]
    NoCandidate(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),
}

impl IntoResponse for MaruError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MaruError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            MaruError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            MaruError::NoCandidate(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            MaruError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            MaruError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            MaruError::VectorSearch(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            MaruError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            MaruError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            MaruError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            MaruError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            MaruError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            MaruError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            MaruError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, MaruError>;
