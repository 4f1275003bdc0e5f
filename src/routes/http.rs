//! HTTP endpoint handlers. These are thin wrappers that forward to the round controller.
//! Each handler is instrumented; tokens are logged by length only.

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::{FromRequest, Multipart, Request, State},
  http::{header, HeaderMap, Uri},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{debug, instrument};

use crate::protocol::{tone_name_map, HealthOut, TonesOut};
use crate::state::AppState;

/// Form/query field that may carry the token for cookie-less clients.
pub const TOKEN_FIELD: &str = "token";

const MAX_FORM_BYTES: usize = 64 * 1024;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, entries: state.rounds.corpus().len() })
}

#[instrument(level = "info")]
pub async fn http_get_tones() -> impl IntoResponse {
  Json(TonesOut { tones: tone_name_map() })
}

#[instrument(level = "info", skip_all)]
pub async fn http_get_round(State(state): State<Arc<AppState>>, headers: HeaderMap, uri: Uri) -> Response {
  let fields = query_fields(&uri);
  run_round(&state, &headers, &fields)
}

/// Query string and body are merged; body fields win on duplicate names.
/// Bodies that cannot be read as a form contribute no fields.
#[instrument(level = "info", skip_all)]
pub async fn http_post_round(State(state): State<Arc<AppState>>, req: Request) -> Response {
  let headers = req.headers().clone();
  let mut fields = query_fields(req.uri());
  fields.extend(body_fields(req, &state).await);
  run_round(&state, &headers, &fields)
}

fn query_fields(uri: &Uri) -> HashMap<String, String> {
  let raw = uri.query().unwrap_or("");
  serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
    .map(|pairs| pairs.into_iter().collect())
    .unwrap_or_else(|e| {
      debug!(target: "round", error = %e, "Ignoring unparseable query string");
      HashMap::new()
    })
}

async fn body_fields(req: Request, state: &Arc<AppState>) -> HashMap<String, String> {
  let content_type = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("")
    .to_ascii_lowercase();

  if content_type.starts_with("multipart/form-data") {
    return multipart_fields(req, state).await;
  }

  let bytes = match axum::body::to_bytes(req.into_body(), MAX_FORM_BYTES).await {
    Ok(b) => b,
    Err(e) => {
      debug!(target: "round", error = %e, "Ignoring unreadable request body");
      return HashMap::new();
    }
  };
  serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
    .map(|pairs| pairs.into_iter().collect())
    .unwrap_or_else(|e| {
      debug!(target: "round", error = %e, body_len = bytes.len(), "Ignoring non-form request body");
      HashMap::new()
    })
}

async fn multipart_fields(req: Request, state: &Arc<AppState>) -> HashMap<String, String> {
  let mut fields = HashMap::new();
  let mut multipart = match Multipart::from_request(req, state).await {
    Ok(m) => m,
    Err(e) => {
      debug!(target: "round", error = %e, "Ignoring malformed multipart body");
      return fields;
    }
  };
  // Keep whatever parsed before the first broken part.
  while let Ok(Some(field)) = multipart.next_field().await {
    let Some(name) = field.name().map(str::to_string) else { continue };
    match field.text().await {
      Ok(value) => {
        fields.insert(name, value);
      }
      Err(_) => break,
    }
  }
  fields
}

fn run_round(state: &AppState, headers: &HeaderMap, fields: &HashMap<String, String>) -> Response {
  let token = cookie_value(headers, &state.cookie_name).or_else(|| fields.get(TOKEN_FIELD).cloned());
  if let Some(t) = &token {
    debug!(target: "session", token_len = t.len(), "Session token received");
  }

  let outcome = state.rounds.play(token.as_deref(), fields);
  let cookie = format!(
    "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
    state.cookie_name, outcome.token, state.cookie_max_age_secs
  );
  (
    [(header::SET_COOKIE, cookie), (header::CACHE_CONTROL, "no-store".to_string())],
    Json(outcome.view),
  )
    .into_response()
}

/// Find `name` in the request's Cookie headers. Empty values count as absent.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, v)| *k == name && !v.is_empty())
    .map(|(_, v)| v.trim_matches('"').to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  #[test]
  fn cookie_lookup_handles_multiple_pairs() {
    let mut h = HeaderMap::new();
    h.insert(header::COOKIE, HeaderValue::from_static("theme=dark; tones_session=abc.def; x=1"));
    assert_eq!(cookie_value(&h, "tones_session").as_deref(), Some("abc.def"));
    assert_eq!(cookie_value(&h, "missing"), None);
  }

  #[test]
  fn empty_cookie_counts_as_absent() {
    let mut h = HeaderMap::new();
    h.insert(header::COOKIE, HeaderValue::from_static("tones_session="));
    assert_eq!(cookie_value(&h, "tones_session"), None);
  }
}
