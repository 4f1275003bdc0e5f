//! Round controller: one request = one full transition of a client's session.
//!
//! Flow per request:
//!   1. read session token (bad/absent → fresh state)
//!   2. decode the submitted answer
//!   3. grade it against the pending entry
//!   4. pick the next clip uniformly at random (repeats allowed)
//!   5. bump counters, rewrite the token, build the view model

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, instrument};

use crate::answer;
use crate::corpus::{CorpusError, CorpusIndex};
use crate::grader;
use crate::pinyin::to_pinyin_diacritics;
use crate::protocol::{tone_name_map, RoundView};
use crate::session::{SessionCodec, SessionState};
use crate::util::{format_percentage, trunc_for_log};

/// Result of one round: the view to render and the token to hand back.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub view: RoundView,
    pub token: String,
    #[allow(dead_code)]
    pub state: SessionState,
}

/// Owns the immutable collaborators a round needs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RoundController {
    corpus: Arc<CorpusIndex>,
    codec: SessionCodec,
    clip_url_prefix: String,
}

impl RoundController {
    /// Fails only for an empty corpus, so every round has something to serve.
    pub fn new(
        corpus: Arc<CorpusIndex>,
        codec: SessionCodec,
        clip_url_prefix: impl Into<String>,
    ) -> Result<Self, CorpusError> {
        if corpus.is_empty() {
            return Err(CorpusError::NoEntries);
        }
        Ok(Self { corpus, codec, clip_url_prefix: clip_url_prefix.into() })
    }

    pub fn corpus(&self) -> &CorpusIndex {
        &self.corpus
    }

    /// Run one round with the thread-local RNG.
    pub fn play(&self, token: Option<&str>, fields: &HashMap<String, String>) -> RoundOutcome {
        self.play_with_rng(token, fields, &mut rand::thread_rng())
    }

    #[instrument(level = "info", skip_all, fields(has_token = token.is_some(), field_count = fields.len()))]
    pub fn play_with_rng<R: Rng + ?Sized>(
        &self,
        token: Option<&str>,
        fields: &HashMap<String, String>,
        rng: &mut R,
    ) -> RoundOutcome {
        let mut state = self.codec.read(token);
        let decoded = answer::decode(fields);
        let verdict = grader::grade(&decoded, state.pending_entry.as_ref());
        if verdict.is_correct() {
            state.score = state.score.saturating_add(1);
        }
        let revealed = state
            .pending_entry
            .as_ref()
            .map(|e| to_pinyin_diacritics(&e.syllables, &e.tones));

        info!(target: "round", verdict = verdict.kind(), answered = %trunc_for_log(&decoded.display(), 32), score = state.score, "Round graded");

        // `new` guarantees a non-empty corpus.
        let next = match self.corpus.choose(rng) {
            Some(e) => e.clone(),
            None => unreachable!("round controller built over an empty corpus"),
        };
        debug!(target: "round", clip = %next.clip, syllables = next.syllables.len(), "Next clip chosen");

        state.pending_entry = Some(next.clone());
        state.questions_asked = state.questions_asked.saturating_add(1);
        let token = self.codec.write(&state);

        let view = RoundView {
            clip_url: format!("{}/{}", self.clip_url_prefix.trim_end_matches('/'), next.clip),
            verdict: verdict.kind(),
            message: verdict.message(),
            revealed,
            syllable_count: next.syllables.len(),
            syllables: next.syllables,
            score: state.score,
            questions_asked: state.questions_asked,
            percentage: format_percentage(state.score, state.questions_asked),
            tone_names: tone_name_map(),
            token: token.clone(),
        };
        RoundOutcome { view, token, state }
    }
}
