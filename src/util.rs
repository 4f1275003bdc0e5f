//! Small utility helpers used across modules.

/// Render tone digits as a compact string: `[2, 3]` → `"23"`.
pub fn tones_to_string(tones: &[u8]) -> String {
  tones.iter().map(|t| char::from(b'0' + (t % 10))).collect()
}

/// Accuracy as `"50.00%"`. Zero questions reads as `"0.00%"` rather than dividing by zero.
pub fn format_percentage(score: u32, questions: u32) -> String {
  let perc = if questions == 0 { 0.0 } else { 100.0 * f64::from(score) / f64::from(questions) };
  format!("{:.2}%", perc)
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn percentage_formats_two_decimals() {
    assert_eq!(format_percentage(1, 2), "50.00%");
    assert_eq!(format_percentage(1, 3), "33.33%");
    assert_eq!(format_percentage(0, 0), "0.00%");
  }

  #[test]
  fn tones_render_as_digits() {
    assert_eq!(tones_to_string(&[2, 3]), "23");
    assert_eq!(tones_to_string(&[]), "");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let t = trunc_for_log("结果结果", 4);
    assert!(t.starts_with("结…"));
  }
}
