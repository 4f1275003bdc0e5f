//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::TONE_NAMES;

/// Everything a view needs to render one round.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    /// URL of the clip to play.
    pub clip_url: String,
    /// "welcome" | "correct" | "incorrect"
    pub verdict: &'static str,
    pub message: String,
    /// Previous word with tone marks, present whenever a pending entry was graded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed: Option<String>,
    /// Tone-stripped syllables of the clip to play; one answer row per syllable.
    pub syllables: Vec<String>,
    pub syllable_count: usize,
    pub score: u32,
    pub questions_asked: u32,
    /// Accuracy, e.g. "50.00%".
    pub percentage: String,
    pub tone_names: BTreeMap<String, &'static str>,
    /// Session token for clients that do not keep cookies.
    pub token: String,
}

/// Tone digit → display name, keyed by the digit as a string ("1" → "flat").
pub fn tone_name_map() -> BTreeMap<String, &'static str> {
    TONE_NAMES.iter().map(|(t, n)| (t.to_string(), *n)).collect()
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub entries: usize,
}

#[derive(Serialize)]
pub struct TonesOut {
    pub tones: BTreeMap<String, &'static str>,
}
