//! Corpus index: parses clip file names into `SoundEntry` values.
//!
//! Naming convention (as produced by the clip downloader):
//!   `jie2_guo3.ogg` → syllables `["jie", "guo"]`, tones `[2, 3]`
//!
//! Syllables are the maximal runs of non-digit, non-underscore characters in the
//! name before its first dot. Tones are every ASCII digit of the full file name,
//! in order. Parsing is total: any string yields an entry.

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::domain::SoundEntry;

#[derive(Debug, Error)]
pub enum CorpusError {
  #[error("sound directory {dir} is unreadable: {source}")]
  Unreadable { dir: PathBuf, #[source] source: std::io::Error },
  #[error("no sound entries available in {dir}")]
  Empty { dir: PathBuf },
  #[error("corpus index has no sound entries")]
  NoEntries,
}

/// Parse one clip file name. Never fails.
pub fn parse_clip_name(name: &str) -> SoundEntry {
  let stem = name.split('.').next().unwrap_or("");
  let syllables = stem
    .split(|c: char| c.is_ascii_digit() || c == '_')
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect();
  let tones = name
    .bytes()
    .filter(u8::is_ascii_digit)
    .map(|b| b - b'0')
    .collect();
  SoundEntry { clip: name.to_string(), syllables, tones }
}

/// Read-only set of drillable entries, shared by every request.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
  entries: Vec<SoundEntry>,
}

impl CorpusIndex {
  #[allow(dead_code)]
  pub fn from_entries(entries: Vec<SoundEntry>) -> Self {
    Self { entries }
  }

  /// Build the index from a directory of clips. Unreadable or empty directories are errors.
  #[instrument(level = "info", skip_all, fields(dir = %dir.as_ref().display()))]
  pub fn load(dir: impl AsRef<Path>) -> Result<Self, CorpusError> {
    let dir = dir.as_ref();
    let unreadable = |source: std::io::Error| CorpusError::Unreadable { dir: dir.to_path_buf(), source };

    let mut names = Vec::new();
    for item in std::fs::read_dir(dir).map_err(unreadable)? {
      let item = item.map_err(unreadable)?;
      // `metadata` follows symlinks, so linked clips count as files.
      match std::fs::metadata(item.path()) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => continue,
        Err(e) => {
          debug!(target: "corpus", path = %item.path().display(), error = %e, "Skipping unreadable corpus item");
          continue;
        }
      }
      let name = item.file_name().to_string_lossy().into_owned();
      if name.starts_with('.') {
        continue;
      }
      names.push(name);
    }
    names.sort();

    let entries: Vec<SoundEntry> = names.iter().map(|n| parse_clip_name(n)).collect();
    for e in entries.iter().filter(|e| e.syllables.len() != e.tones.len()) {
      debug!(target: "corpus", clip = %e.clip, syllables = e.syllables.len(), tones = e.tones.len(), "Syllable/tone count mismatch; entry can never be answered correctly");
    }

    if entries.is_empty() {
      return Err(CorpusError::Empty { dir: dir.to_path_buf() });
    }
    info!(target: "corpus", entries = entries.len(), "Corpus index loaded");
    Ok(Self { entries })
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  #[allow(dead_code)]
  pub fn entries(&self) -> &[SoundEntry] { &self.entries }

  /// Uniform pick with replacement. `None` only for an empty index.
  pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SoundEntry> {
    self.entries.choose(rng)
  }
}
