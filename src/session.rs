//! Session state carried in a client-held, signed token.
//!
//! Token layout:
//!   `base64url(payload_json) "." base64url(hmac_sha256(secret, payload_json))`
//!
//! The payload is a versioned JSON envelope. Unknown fields are ignored and
//! missing fields take defaults, so adding fields later keeps older tokens
//! readable. Anything that fails to verify or parse reads as a fresh session.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::{instrument, warn};

use crate::domain::SoundEntry;

type HmacSha256 = Hmac<Sha256>;

/// Highest envelope version this build understands.
pub const TOKEN_VERSION: u32 = 1;

/// Per-client drill state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
  /// Rounds answered correctly.
  pub score: u32,
  /// Rounds presented, including the one currently on screen.
  pub questions_asked: u32,
  /// Entry shown in the previous response; graded on the next request.
  pub pending_entry: Option<SoundEntry>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("token is not of the form payload.signature")]
  Malformed,
  #[error("token signature does not match")]
  BadSignature,
  #[error("token payload or signature is not valid base64")]
  Encoding,
  #[error("token payload is not a valid envelope: {0}")]
  Payload(String),
  #[error("token version {0} is newer than supported")]
  UnsupportedVersion(u32),
}

#[derive(Serialize, Deserialize)]
struct Envelope {
  #[serde(default)]
  v: u32,
  #[serde(default)]
  score: u32,
  #[serde(default)]
  questions_asked: u32,
  #[serde(default)]
  pending: Option<SoundEntry>,
}

/// Encodes and verifies session tokens with a server-side secret.
#[derive(Clone)]
pub struct SessionCodec {
  secret: Vec<u8>,
}

impl std::fmt::Debug for SessionCodec {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionCodec").field("secret", &"<redacted>").finish()
  }
}

impl SessionCodec {
  pub fn new(secret: impl Into<Vec<u8>>) -> Self {
    Self { secret: secret.into() }
  }

  fn mac(&self, payload: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length, including empty.
    let mut mac = HmacSha256::new_from_slice(&self.secret).unwrap_or_else(|_| unreachable!());
    mac.update(payload);
    mac
  }

  fn sign(&self, payload: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(self.mac(payload).finalize().into_bytes())
  }

  /// Produce the opaque token for `state`.
  pub fn write(&self, state: &SessionState) -> String {
    let env = Envelope {
      v: TOKEN_VERSION,
      score: state.score,
      questions_asked: state.questions_asked,
      pending: state.pending_entry.clone(),
    };
    // Serializing plain structs of strings and integers cannot fail.
    let payload = serde_json::to_vec(&env).unwrap_or_default();
    format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), self.sign(&payload))
  }

  /// Strict decode, reporting why a token was rejected.
  pub fn decode(&self, token: &str) -> Result<SessionState, SessionError> {
    let (body, sig) = token.trim().split_once('.').ok_or(SessionError::Malformed)?;
    let payload = URL_SAFE_NO_PAD.decode(body).map_err(|_| SessionError::Encoding)?;
    let sig = URL_SAFE_NO_PAD.decode(sig).map_err(|_| SessionError::Encoding)?;
    // Constant-time comparison.
    self.mac(&payload).verify_slice(&sig).map_err(|_| SessionError::BadSignature)?;
    let env: Envelope = serde_json::from_slice(&payload).map_err(|e| SessionError::Payload(e.to_string()))?;
    if env.v > TOKEN_VERSION {
      return Err(SessionError::UnsupportedVersion(env.v));
    }
    Ok(SessionState { score: env.score, questions_asked: env.questions_asked, pending_entry: env.pending })
  }

  /// Lenient read used per request: absent or bad tokens give the zero state.
  #[instrument(level = "debug", skip_all, fields(token_len = token.map(str::len).unwrap_or(0)))]
  pub fn read(&self, token: Option<&str>) -> SessionState {
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
      return SessionState::default();
    };
    match self.decode(token) {
      Ok(state) => state,
      Err(e) => {
        warn!(target: "session", error = %e, "Discarding session token; starting fresh");
        SessionState::default()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::corpus::parse_clip_name;

  fn codec() -> SessionCodec {
    SessionCodec::new("test-secret")
  }

  #[test]
  fn round_trips_without_pending_entry() {
    let s = SessionState { score: 3, questions_asked: 7, pending_entry: None };
    assert_eq!(codec().read(Some(&codec().write(&s))), s);
  }

  #[test]
  fn round_trips_multi_syllable_entry() {
    let s = SessionState { score: 1, questions_asked: 2, pending_entry: Some(parse_clip_name("xue2_xi2_ban1.ogg")) };
    let back = codec().decode(&codec().write(&s)).expect("decode");
    assert_eq!(back, s);
    let e = back.pending_entry.expect("pending");
    assert_eq!(e.syllables, vec!["xue", "xi", "ban"]);
    assert_eq!(e.tones, vec![2, 2, 1]);
  }

  #[test]
  fn absent_and_garbage_tokens_read_as_fresh() {
    assert_eq!(codec().read(None), SessionState::default());
    assert_eq!(codec().read(Some("")), SessionState::default());
    assert_eq!(codec().read(Some("garbage")), SessionState::default());
    assert_eq!(codec().decode("garbage"), Err(SessionError::Malformed));
    assert_eq!(codec().decode("!!!.abc"), Err(SessionError::Encoding));
  }

  #[test]
  fn tampered_payload_is_rejected() {
    let s = SessionState { score: 1, questions_asked: 1, pending_entry: None };
    let token = codec().write(&s);
    let (_, sig) = token.split_once('.').unwrap();
    let forged = URL_SAFE_NO_PAD.encode(br#"{"v":1,"score":999,"questions_asked":1}"#);
    assert_eq!(codec().decode(&format!("{}.{}", forged, sig)), Err(SessionError::BadSignature));
  }

  #[test]
  fn altered_or_truncated_signature_is_rejected() {
    let c = codec();
    let token = c.write(&SessionState { score: 2, questions_asked: 3, pending_entry: None });
    let (body, sig) = token.split_once('.').unwrap();

    let mut raw = URL_SAFE_NO_PAD.decode(sig).expect("sig is base64");
    assert_eq!(raw.len(), 32);
    raw[31] ^= 0x01;
    let flipped = format!("{}.{}", body, URL_SAFE_NO_PAD.encode(&raw));
    assert_eq!(c.decode(&flipped), Err(SessionError::BadSignature));

    let short = format!("{}.{}", body, URL_SAFE_NO_PAD.encode(&raw[..16]));
    assert_eq!(c.decode(&short), Err(SessionError::BadSignature));

    // A hex-shaped signature decodes as base64 but never verifies.
    let hex_sig = "0".repeat(64);
    assert!(c.decode(&format!("{}.{}", body, hex_sig)).is_err());
  }

  #[test]
  fn other_secret_cannot_read_token() {
    let token = codec().write(&SessionState { score: 5, questions_asked: 5, pending_entry: None });
    let other = SessionCodec::new("different");
    assert_eq!(other.decode(&token), Err(SessionError::BadSignature));
    assert_eq!(other.read(Some(&token)), SessionState::default());
  }

  #[test]
  fn older_and_extended_envelopes_are_tolerated() {
    let c = codec();
    // Missing version and fields → defaults.
    let old = br#"{"score":2}"#;
    let token = format!("{}.{}", URL_SAFE_NO_PAD.encode(old), c.sign(old));
    assert_eq!(c.decode(&token).expect("old").score, 2);

    // Unknown field from a future minor addition → ignored.
    let ext = br#"{"v":1,"score":1,"questions_asked":4,"streak":3}"#;
    let token = format!("{}.{}", URL_SAFE_NO_PAD.encode(ext), c.sign(ext));
    assert_eq!(c.decode(&token).expect("ext").questions_asked, 4);
  }

  #[test]
  fn newer_version_is_rejected() {
    let c = codec();
    let future = br#"{"v":2,"score":1}"#;
    let token = format!("{}.{}", URL_SAFE_NO_PAD.encode(future), c.sign(future));
    assert_eq!(c.decode(&token), Err(SessionError::UnsupportedVersion(2)));
  }

  #[test]
  fn debug_output_hides_secret() {
    assert!(!format!("{:?}", codec()).contains("test-secret"));
  }
}
