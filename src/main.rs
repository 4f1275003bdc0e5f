//! Tones · Chinese tone drill backend
//!
//! - Axum HTTP API: one quiz round per request, state carried in a signed cookie
//! - Corpus of clips loaded once from a directory (`jie2_guo3.ogg` style names)
//! - Clip files served under the configured URL prefix
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   SOUNDS_DIR        : clip directory (default "sounds")
//!   SESSION_SECRET    : token signing secret (random per process if unset)
//!   TONES_CONFIG_PATH : optional TOML config file
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod corpus;
mod answer;
mod grader;
mod session;
mod pinyin;
mod protocol;
mod round;
mod state;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::corpus::CorpusIndex;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = AppConfig::load_from_env().map_err(|e| {
    error!(target: "tones_backend", error = %e, "Invalid configuration");
    e
  })?;

  // No corpus, no drill: refuse to start rather than serve broken rounds.
  let corpus = CorpusIndex::load(&cfg.sounds_dir).map_err(|e| {
    error!(target: "tones_backend", error = %e, "Cannot load sound corpus");
    e
  })?;

  let state = Arc::new(AppState::new(&cfg, corpus)?);
  let app = build_router(state, &cfg);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "tones_backend", %addr, sounds_dir = %cfg.sounds_dir.display(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
