//! # V1 Session Authentication Middleware
//!
//! Protects the chat routes with Bearer session tokens. Tokens are issued
//! elsewhere; this side only validates them against the sessions table and
//! attaches the resolved [`AuthUser`] to the request extensions.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::db::SessionStore;

use super::response::{ApiResponse, ErrorCode};

/// The authenticated caller, available to handlers via `Extension<AuthUser>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Axum middleware that enforces Bearer session-token authentication.
///
/// - Missing or malformed `Authorization: Bearer <token>` header → 401.
/// - Unknown or expired token → 401.
/// - Valid token → `AuthUser` inserted into extensions, request passes.
pub async fn v1_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        Some(_) => {
            return ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Invalid authorization header format. Expected: Bearer <token>",
            )
            .into_response();
        }
        None => {
            return ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Missing authorization header",
            )
            .into_response();
        }
    };

    match state.db.verify_session(token).await {
        Ok(Some(user_id)) => {
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        Ok(None) => ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            "Invalid or expired session token",
        )
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "session lookup failed");
            ApiResponse::<()>::error(ErrorCode::InternalError, "An internal error occurred")
                .into_response()
        }
    }
}
