//! Domain models used by the drill: sound entries, decoded answers and verdicts.

use serde::{Deserialize, Serialize};

use crate::util::tones_to_string;

/// Tone digits and their display names, in button order.
pub const TONE_NAMES: [(u8, &str); 5] = [
  (1, "flat"),
  (2, "rising"),
  (3, "dipping"),
  (4, "falling"),
  (5, "neutral"),
];

/// One drillable audio clip, e.g. `jie2_guo3.ogg` → syllables `["jie", "guo"]`, tones `[2, 3]`.
///
/// Built once by the corpus index and never mutated afterwards. The same shape is
/// carried inside the session token as the pending entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundEntry {
  /// File name inside the sounds directory (with extension).
  pub clip: String,
  /// Tone-stripped syllables, left to right.
  pub syllables: Vec<String>,
  /// One digit per syllable for well-authored names. May be empty.
  pub tones: Vec<u8>,
}

impl SoundEntry {
  pub fn tones_display(&self) -> String {
    tones_to_string(&self.tones)
  }
}

/// The user's guess for the clip shown in the previous round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedAnswer {
  pub tones: Vec<u8>,
}

impl DecodedAnswer {
  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool { self.tones.is_empty() }

  pub fn display(&self) -> String {
    tones_to_string(&self.tones)
  }
}

/// Outcome of grading a round. Derived per request, never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
  /// No pending entry: first contact (or a reset session).
  Welcome,
  Correct,
  Incorrect { expected: String, got: String },
}

impl Verdict {
  pub fn is_correct(&self) -> bool { matches!(self, Verdict::Correct) }

  /// Short machine-readable tag used in the view model and logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Verdict::Welcome => "welcome",
      Verdict::Correct => "correct",
      Verdict::Incorrect { .. } => "incorrect",
    }
  }

  /// Human-readable message shown above the next clip.
  pub fn message(&self) -> String {
    match self {
      Verdict::Welcome => "Welcome to Chinese Tones".into(),
      Verdict::Correct => "Correct!".into(),
      Verdict::Incorrect { expected, got } => {
        let got = if got.is_empty() { "nothing" } else { got.as_str() };
        format!("Incorrect. You answered {}, but the correct answer was {}", got, expected)
      }
    }
  }
}
