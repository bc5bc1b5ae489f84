use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let chat = Router::new()
        .route("/send/stream", post(handlers::chat::send_message_stream))
        .route("/history", get(handlers::chat::get_chat_history));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .route("/docs", get(super::openapi::redoc_html));

    let protected_routes = Router::new()
        .nest("/chat", chat)
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
