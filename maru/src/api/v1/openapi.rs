use axum::response::Html;
use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::Redoc;

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Maru API",
        version = "1.0.0",
        description = "Self-hostable AI travel assistant. Streams answers about festivals, attractions, and restaurants in Korea.",
    ),
    paths(
        handlers::health::health_check,
        handlers::chat::send_message_stream,
        handlers::chat::get_chat_history,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Chat
        dto::chat::ChatMessageRequest,
        dto::chat::ConversationSummaryDto,
        // Health
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::EmbeddingsStatus,
        handlers::health::VectorStatus,
        handlers::health::LlmStatus,
    )),
    tags(
        (name = "chat", description = "Streaming travel chat and history"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// `GET /api/v1/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// `GET /api/v1/docs`
pub async fn redoc_html() -> Html<String> {
    Html(Redoc::new(ApiDoc::openapi()).to_html())
}
