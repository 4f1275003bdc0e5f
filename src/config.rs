//! Service configuration: optional TOML file plus environment overrides.
//!
//! Resolution order (later wins):
//!   1. built-in defaults (`AppConfig::default`)
//!   2. TOML file at TONES_CONFIG_PATH, if set
//!   3. PORT, SOUNDS_DIR, SESSION_SECRET environment variables

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read { path: String, #[source] source: std::io::Error },
  #[error("failed to parse config file {path}: {source}")]
  Parse { path: String, #[source] source: toml::de::Error },
  #[error("invalid PORT value {0:?}")]
  InvalidPort(String),
}

/// Everything the server needs at startup. All fields have defaults so an
/// empty (or absent) TOML file is valid.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub port: u16,
  /// Directory holding the clip files, e.g. `sounds/jie2_guo3.ogg`.
  pub sounds_dir: PathBuf,
  /// URL prefix the clip directory is mounted under.
  pub sounds_url_prefix: String,
  /// Signing secret for session tokens. Empty means "generate one at startup".
  pub session_secret: String,
  pub cookie_name: String,
  pub cookie_max_age_secs: u64,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      sounds_dir: PathBuf::from("sounds"),
      sounds_url_prefix: "/sounds".into(),
      session_secret: String::new(),
      cookie_name: "tones_session".into(),
      cookie_max_age_secs: DEFAULT_COOKIE_MAX_AGE_SECS,
    }
  }
}

impl AppConfig {
  /// Parse a TOML document into a config (missing keys take defaults).
  pub fn from_toml_str(s: &str, path: &str) -> Result<Self, ConfigError> {
    toml::from_str::<AppConfig>(s).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
  }

  /// Load from TONES_CONFIG_PATH (if set) and apply environment overrides.
  pub fn load_from_env() -> Result<Self, ConfigError> {
    let mut cfg = match std::env::var("TONES_CONFIG_PATH").ok() {
      Some(path) => {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        let cfg = Self::from_toml_str(&raw, &path)?;
        info!(target: "tones_backend", %path, "Loaded config (TOML)");
        cfg
      }
      None => AppConfig::default(),
    };
    cfg.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(cfg)
  }

  /// Apply environment-style overrides from any lookup function.
  pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(p) = lookup("PORT") {
      self.port = p.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(p.clone()))?;
    }
    if let Some(dir) = lookup("SOUNDS_DIR").filter(|d| !d.is_empty()) {
      self.sounds_dir = PathBuf::from(dir);
    }
    if let Some(secret) = lookup("SESSION_SECRET").filter(|s| !s.is_empty()) {
      self.session_secret = secret;
    }
    // Normalize the prefix to "/foo" without a trailing slash; the clip
    // directory cannot be mounted at the root since rounds live there.
    let trimmed = self.sounds_url_prefix.trim_matches('/');
    self.sounds_url_prefix = if trimmed.is_empty() { "/sounds".into() } else { format!("/{}", trimmed) };
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn empty_toml_takes_defaults() {
    let cfg = AppConfig::from_toml_str("", "test.toml").expect("parse");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.sounds_dir, PathBuf::from("sounds"));
    assert_eq!(cfg.cookie_name, "tones_session");
    assert!(cfg.session_secret.is_empty());
  }

  #[test]
  fn toml_fields_and_env_overrides() {
    let mut cfg = AppConfig::from_toml_str(
      "port = 2137\nsounds_dir = \"/srv/clips\"\nsounds_url_prefix = \"audio/\"\n",
      "test.toml",
    )
    .expect("parse");
    let env: HashMap<&str, &str> = [("PORT", "8080"), ("SESSION_SECRET", "s3cret")].into_iter().collect();
    cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string())).expect("overrides");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.sounds_dir, PathBuf::from("/srv/clips"));
    assert_eq!(cfg.sounds_url_prefix, "/audio");
    assert_eq!(cfg.session_secret, "s3cret");
  }

  #[test]
  fn bad_port_is_rejected() {
    let mut cfg = AppConfig::default();
    let err = cfg.apply_overrides(|k| (k == "PORT").then(|| "not-a-port".to_string())).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPort(_)));
  }

  #[test]
  fn malformed_toml_is_a_parse_error() {
    let err = AppConfig::from_toml_str("port = \"x", "bad.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }
}
