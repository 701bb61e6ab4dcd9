//! Session-bound transport tokens.
//!
//! The transport token is modeled as an explicit session object: an opaque
//! `sid` cookie keys an in-memory DashMap entry holding the AES-256 token
//! and an absolute expiry. Sessions are never persisted — a server restart
//! invalidates every outstanding client-cached token, and clients are
//! expected to re-fetch and retry once.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::crypto::transport;
use crate::error::ApiError;
use crate::state::AppState;

/// Cookie carrying the opaque session identifier.
pub const SESSION_COOKIE: &str = "pastebox_sid";

/// Per-client transport session.
#[derive(Debug, Clone)]
pub struct Session {
    /// AES-256 transport token for this session.
    pub transport_key: [u8; transport::KEY_BYTES],
    /// Absolute expiry; an expired session is treated as absent.
    pub expires_at: DateTime<Utc>,
    /// Id of the paste created in this session, if any.
    pub created_paste: Option<String>,
}

impl Session {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            transport_key: transport::generate_token(),
            expires_at: Utc::now() + Duration::seconds(ttl_secs),
            created_paste: None,
        }
    }

    pub fn expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Shared in-memory session store.
pub type SessionMap = Arc<DashMap<String, Session>>;

pub fn new_session_map() -> SessionMap {
    Arc::new(DashMap::new())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Hex-encoded 32-byte transport token
    pub key: String,
}

/// GET /api/token
///
/// Create or resume the caller's transport session and return its token.
/// Idempotent within the token's validity window: repeated calls with the
/// same cookie return the same key. Concurrent first calls for one session
/// converge on a single token because the DashMap entry is created under
/// its shard lock.
pub async fn get_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<TokenResponse>) {
    let sid = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let mut entry = state
        .sessions
        .entry(sid.clone())
        .or_insert_with(|| Session::new(state.token_ttl_secs));
    if entry.expired() {
        *entry = Session::new(state.token_ttl_secs);
    }
    let key_hex = hex::encode(entry.transport_key);
    drop(entry);

    let cookie = Cookie::build((SESSION_COOKIE, sid))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (jar.add(cookie), Json(TokenResponse { key: key_hex }))
}

/// GET /api/session
///
/// Plain-text id of the paste created in this session, empty if none.
pub async fn get_created_paste(State(state): State<AppState>, jar: CookieJar) -> String {
    live_session(&state, &jar)
        .and_then(|(_, s)| s.created_paste)
        .unwrap_or_default()
}

/// Look up the caller's live (unexpired) session.
fn live_session(state: &AppState, jar: &CookieJar) -> Option<(String, Session)> {
    let sid = jar.get(SESSION_COOKIE)?.value().to_string();
    let session = state.sessions.get(&sid)?;
    if session.expired() {
        return None;
    }
    Some((sid, session.value().clone()))
}

/// Decrypt and deserialize an inbound request body under the caller's
/// session token. Returns the typed request plus the token for sealing the
/// response.
///
/// Any failure — no session, stale token, undecryptable or non-JSON body —
/// collapses into [`ApiError::TransportDecrypt`], answered as an empty 204
/// so an untokened caller learns nothing about the endpoint.
pub fn open_request<T: DeserializeOwned>(
    state: &AppState,
    jar: &CookieJar,
    body: &str,
) -> Result<(T, [u8; transport::KEY_BYTES]), ApiError> {
    let (_, session) = live_session(state, jar).ok_or(ApiError::TransportDecrypt)?;
    let key = session.transport_key;

    // Clients that JSON.stringify the sealed string send it with quotes.
    let body = body.trim();
    let unquoted = serde_json::from_str::<String>(body).unwrap_or_else(|_| body.to_string());

    let plaintext = transport::open(&unquoted, &key).map_err(|_| ApiError::TransportDecrypt)?;
    let request = serde_json::from_slice(&plaintext).map_err(|_| ApiError::TransportDecrypt)?;
    Ok((request, key))
}

/// Serialize and encrypt a response body under the session token.
pub fn seal_response<T: Serialize>(response: &T, key: &[u8; transport::KEY_BYTES]) -> String {
    let json = serde_json::to_vec(response).expect("response types serialize infallibly");
    transport::seal(&json, key)
}

/// Record the paste created by this session (best-effort; the caller may
/// have let its session lapse between token fetch and submit).
pub fn remember_created_paste(state: &AppState, jar: &CookieJar, paste_id: &str) {
    if let Some(sid) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        if let Some(mut session) = state.sessions.get_mut(&sid) {
            session.created_paste = Some(paste_id.to_string());
        }
    }
}

/// Spawn a background task that evicts expired sessions.
pub fn spawn_session_sweep(sessions: SessionMap, interval_secs: u64) {
    let interval = std::time::Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let before = sessions.len();
            sessions.retain(|_, session| !session.expired());
            let evicted = before.saturating_sub(sessions.len());
            if evicted > 0 {
                tracing::debug!("Session sweep: evicted {} expired sessions", evicted);
            }
        }
    });
}
