//! v1 Chat handlers.

use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use futures::StreamExt;
use validator::Validate;

use crate::api::v1::dto::chat::{ChatMessageRequest, ConversationSummaryDto, HistoryQuery};
use crate::api::v1::middleware::AuthUser;
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `POST /api/v1/chat/send/stream`
///
/// Streams the reply as newline-delimited JSON events. The stream always
/// ends with exactly one terminal event (`done` or `error`); disconnecting
/// before the terminal event aborts generation and skips persistence.
#[utoipa::path(
    post,
    path = "/api/v1/chat/send/stream",
    tag = "chat",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Newline-delimited JSON event stream", body = String, content_type = "application/x-ndjson"),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Missing or invalid session token", body = ApiError),
    )
)]
pub async fn send_message_stream(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    axum::Json(req): axum::Json<ChatMessageRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return ApiResponse::<()>::error(ErrorCode::InvalidRequest, format!("Invalid message: {e}"))
            .into_response();
    }

    let events = state.chat.stream_reply(user.user_id, req.message);
    let lines = events.map(|event| {
        let mut line = serde_json::to_string(&event).unwrap_or_else(|_| {
            r#"{"type":"error","message":"Failed to encode stream event"}"#.to_string()
        });
        line.push('\n');
        Ok::<_, Infallible>(Bytes::from(line))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(lines))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// `GET /api/v1/chat/history`
///
/// Most-recent-first conversation history for the authenticated user.
#[utoipa::path(
    get,
    path = "/api/v1/chat/history",
    tag = "chat",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Conversation history", body = Vec<ConversationSummaryDto>),
        (status = 401, description = "Missing or invalid session token", body = ApiError),
    )
)]
pub async fn get_chat_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> ApiResponse<Vec<ConversationSummaryDto>> {
    let limit = query.limit.clamp(1, 200);

    match state.chat.history(user.user_id, limit).await {
        Ok(conversations) => {
            ApiResponse::success(conversations.into_iter().map(Into::into).collect())
        }
        Err(e) => e.into(),
    }
}
