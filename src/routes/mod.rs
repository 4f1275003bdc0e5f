//! Router assembly: round endpoints, static clip files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::AppConfig;
use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - one round per `GET`/`POST` at `/` (and `/api/v1/round`)
/// - `/api/v1/health` and `/api/v1/tones`
/// - clip files from `cfg.sounds_dir` under `cfg.sounds_url_prefix`
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, cfg: &AppConfig) -> Router {
    let sounds = ServeDir::new(&cfg.sounds_dir);

    Router::new()
        .route("/", get(http::http_get_round).post(http::http_post_round))
        .route("/api/v1/round", get(http::http_get_round).post(http::http_post_round))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/tones", get(http::http_get_tones))
        .nest_service(&cfg.sounds_url_prefix, sounds)
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
}
