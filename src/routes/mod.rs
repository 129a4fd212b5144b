//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS,
//! and HTTP tracing.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::engine::EngineError;
use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws` (one implicit session per socket)
/// - REST-ish API under `/api/v1/...` (explicit session ids)
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/session", post(http::http_new_session))
        .route("/api/v1/challenges", get(http::http_list_challenges))
        .route("/api/v1/challenge", get(http::http_get_challenge))
        .route("/api/v1/submit", post(http::http_post_submit))
        .route("/api/v1/reveal", post(http::http_post_reveal))
        .route("/api/v1/reset", post(http::http_post_reset))
        .route("/api/v1/progress", get(http::http_get_progress))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

/// Map engine errors onto HTTP statuses. Learner-facing verdicts are never
/// errors; this only covers bad ids, the locked reveal, and content defects.
pub struct ApiError(pub EngineError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::UnknownSession(_) | EngineError::UnknownChallenge(_) => {
                StatusCode::NOT_FOUND
            }
            EngineError::RevealLocked { .. } => StatusCode::CONFLICT,
            EngineError::AnswerUnresolvable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self(e)
    }
}
