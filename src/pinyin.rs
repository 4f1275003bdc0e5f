//! Numbered pinyin → Hanyu Pinyin with tone diacritics.
//!
//! Example:
//!   syllables `["jie", "guo"]`, tones `[2, 3]` → "jié guǒ"
//!
//! Mark placement: `a` or `e` if present, `o` in `ou`, otherwise the last vowel.
//! `v` and `u:` are read as `ü`. Tone 5 (and anything outside 1..=4) is unmarked.

const VOWELS: &str = "aeiouü";

fn marked(vowel: char, tone: u8) -> Option<char> {
  let row = match vowel {
    'a' => ['ā', 'á', 'ǎ', 'à'],
    'e' => ['ē', 'é', 'ě', 'è'],
    'i' => ['ī', 'í', 'ǐ', 'ì'],
    'o' => ['ō', 'ó', 'ǒ', 'ò'],
    'u' => ['ū', 'ú', 'ǔ', 'ù'],
    'ü' => ['ǖ', 'ǘ', 'ǚ', 'ǜ'],
    _ => return None,
  };
  match tone {
    1..=4 => Some(row[usize::from(tone - 1)]),
    _ => None,
  }
}

/// Put the tone mark on one syllable.
pub fn mark_syllable(syllable: &str, tone: u8) -> String {
  let chars: Vec<char> = syllable.replace("u:", "ü").replace('v', "ü").chars().collect();
  let lower: Vec<char> = chars.iter().map(|c| c.to_lowercase().next().unwrap_or(*c)).collect();

  let target = lower
    .iter()
    .position(|&c| c == 'a' || c == 'e')
    .or_else(|| lower.windows(2).position(|w| w[0] == 'o' && w[1] == 'u'))
    .or_else(|| lower.iter().rposition(|&c| VOWELS.contains(c)));

  let mut out = String::with_capacity(syllable.len() + 2);
  for (i, c) in chars.iter().enumerate() {
    match target.filter(|&t| t == i).and_then(|_| marked(lower[i], tone)) {
      Some(m) if c.is_uppercase() => out.extend(m.to_uppercase()),
      Some(m) => out.push(m),
      None => out.push(*c),
    }
  }
  out
}

/// Render a whole word, space-separated. Extra syllables without a tone stay unmarked.
pub fn to_pinyin_diacritics(syllables: &[String], tones: &[u8]) -> String {
  syllables
    .iter()
    .enumerate()
    .map(|(i, s)| mark_syllable(s, tones.get(i).copied().unwrap_or(5)))
    .collect::<Vec<_>>()
    .join(" ")
}
