// Web server — Axum-based HTTP surface for the moderation API.
//
// Routes:
//   POST /api/moderate  — run moderation
//   GET  /health, /     — liveness probe
//   anything else       — 404 envelope (INVALID_REQUEST)
//   OPTIONS *           — CORS preflight, 204
//
// All bodies, success and failure alike, are envelope-shaped JSON.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::Request;
use axum::http::{StatusCode, Uri};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::moderation::Moderator;

pub mod cors;
pub mod envelope;
pub mod handlers;
pub mod validation;

use envelope::ErrorCode;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub moderator: Arc<Moderator>,
    pub config: Arc<Config>,
}

/// Start the moderation API server and block until it exits.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Cinder moderation API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the full router. Public so tests can drive it with
/// `tower::ServiceExt::oneshot` and an injected backend.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/moderate", post(handlers::moderate::moderate))
        .route("/health", get(handlers::health::health))
        .route("/", get(handlers::health::health))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(axum::middleware::from_fn(cors::apply_cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unknown path — 404 envelope.
async fn not_found(uri: Uri) -> Response {
    envelope::error(
        ErrorCode::InvalidRequest,
        &format!("Route not found: {}", uri.path()),
        StatusCode::NOT_FOUND,
    )
}

/// Known path, wrong method — the moderation endpoint is POST-only.
async fn method_not_allowed(request: Request) -> Response {
    let method = request.method().clone();
    envelope::error(
        ErrorCode::InvalidRequest,
        &format!("Method {method} is not allowed on this route"),
        StatusCode::BAD_REQUEST,
    )
}
