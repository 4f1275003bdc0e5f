//! Application state: the round controller plus the bits of config the HTTP layer needs.
//!
//! Everything here is immutable after startup and shared via `Arc`; per-client
//! state lives only in the session token.

use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::corpus::{CorpusError, CorpusIndex};
use crate::round::RoundController;
use crate::session::SessionCodec;

const GENERATED_SECRET_LEN: usize = 48;

#[derive(Debug, Clone)]
pub struct AppState {
    pub rounds: RoundController,
    pub cookie_name: String,
    pub cookie_max_age_secs: u64,
}

impl AppState {
    /// Build state from config and an already loaded corpus.
    #[instrument(level = "info", skip_all, fields(entries = corpus.len()))]
    pub fn new(cfg: &AppConfig, corpus: CorpusIndex) -> Result<Self, CorpusError> {
        let secret = if cfg.session_secret.is_empty() {
            warn!(target: "tones_backend", "SESSION_SECRET not set; generated a random one (sessions will not survive a restart)");
            rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(GENERATED_SECRET_LEN)
                .map(char::from)
                .collect::<String>()
        } else {
            cfg.session_secret.clone()
        };

        let rounds = RoundController::new(Arc::new(corpus), SessionCodec::new(secret), cfg.sounds_url_prefix.clone())?;
        info!(target: "tones_backend", entries = rounds.corpus().len(), prefix = %cfg.sounds_url_prefix, "Application state ready");

        Ok(Self {
            rounds,
            cookie_name: cfg.cookie_name.clone(),
            cookie_max_age_secs: cfg.cookie_max_age_secs,
        })
    }
}
