//! Round grading: compare a decoded answer with the previously shown entry.

use crate::domain::{DecodedAnswer, SoundEntry, Verdict};

/// Pure: identical inputs always give identical verdicts.
pub fn grade(decoded: &DecodedAnswer, pending: Option<&SoundEntry>) -> Verdict {
  match pending {
    None => Verdict::Welcome,
    Some(entry) if entry.tones == decoded.tones => Verdict::Correct,
    Some(entry) => Verdict::Incorrect { expected: entry.tones_display(), got: decoded.display() },
  }
}
