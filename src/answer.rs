//! Answer decoding from submitted form fields.
//!
//! Wire contract: one field per selected tone button, named
//! `answer-<position>-<tone>` with `position` counted from 0 and `tone` in 1..=5.
//! Any non-empty value marks the button as selected.
//!
//! Positions are scanned from 0 upwards; the first position with no selection ends
//! the answer, so words of any length decode without declaring a syllable count.
//! When several tones are selected for one position, the lowest one wins.

use std::collections::HashMap;

use crate::domain::DecodedAnswer;

pub const FIELD_PREFIX: &str = "answer";
pub const MIN_TONE: u8 = 1;
pub const MAX_TONE: u8 = 5;

/// Field name for one tone button, e.g. `answer_field(1, 3)` → `"answer-1-3"`.
pub fn answer_field(position: usize, tone: u8) -> String {
  format!("{}-{}-{}", FIELD_PREFIX, position, tone)
}

fn selected(fields: &HashMap<String, String>, position: usize, tone: u8) -> bool {
  fields
    .get(&answer_field(position, tone))
    .map(|v| !v.is_empty())
    .unwrap_or(false)
}

/// Rebuild the per-syllable tone choice from arbitrary form fields. Never fails.
pub fn decode(fields: &HashMap<String, String>) -> DecodedAnswer {
  let mut tones = Vec::new();
  // Every answered position consumes at least one distinct field, so the scan
  // is bounded by the number of submitted fields.
  for position in 0..=fields.len() {
    match (MIN_TONE..=MAX_TONE).find(|&t| selected(fields, position, t)) {
      Some(tone) => tones.push(tone),
      None => break,
    }
  }
  DecodedAnswer { tones }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn decodes_two_syllables_in_order() {
    let f = form(&[("answer-1-3", "on"), ("answer-0-2", "on")]);
    assert_eq!(decode(&f).tones, vec![2, 3]);
  }

  #[test]
  fn stops_at_first_unanswered_position() {
    let f = form(&[("answer-0-4", "on"), ("answer-2-1", "on")]);
    assert_eq!(decode(&f).tones, vec![4]);
  }

  #[test]
  fn empty_or_unrelated_fields_decode_to_empty() {
    assert!(decode(&HashMap::new()).is_empty());
    let f = form(&[("token", "abc"), ("answer-0-6", "on"), ("answer-0-0", "on"), ("answer-x-1", "on")]);
    assert!(decode(&f).is_empty());
  }

  #[test]
  fn empty_value_is_not_a_selection() {
    let f = form(&[("answer-0-1", ""), ("answer-0-5", "on")]);
    assert_eq!(decode(&f).tones, vec![5]);
  }

  #[test]
  fn multi_select_picks_lowest_tone() {
    let f = form(&[("answer-0-4", "on"), ("answer-0-2", "on"), ("answer-1-5", "on")]);
    assert_eq!(decode(&f).tones, vec![2, 5]);
  }

  #[test]
  fn long_words_are_supported() {
    let pairs: Vec<(String, String)> = (0..12).map(|p| (answer_field(p, (p % 5) as u8 + 1), "on".into())).collect();
    let f: HashMap<String, String> = pairs.into_iter().collect();
    let d = decode(&f);
    assert_eq!(d.tones.len(), 12);
    assert_eq!(d.display(), "123451234512");
  }

  #[test]
  fn decoding_is_idempotent() {
    let f = form(&[("answer-0-3", "on"), ("answer-1-1", "on")]);
    assert_eq!(decode(&f), decode(&f));
  }
}
