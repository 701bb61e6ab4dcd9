//! HTTP handlers for the paste lifecycle.
//!
//! Every body crosses the transport envelope on the way in and (for read
//! and status) on the way out. Access control is decided per request from
//! the entry's persisted `protected` flag alone: unprotected entries derive
//! from the identifier, protected entries derive from the transiently
//! supplied password, and AEAD tag verification is the only authorization
//! signal. No unlock state survives the request.

use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use chrono::Utc;
use rand::Rng;

use crate::crypto::content::{self, ContentError};
use crate::crypto::kdf;
use crate::error::ApiError;
use crate::paste::id;
use crate::paste::model::{
    self, CreatePasteRequest, Entry, FilePlain, FileRecord, ReadPasteRequest, ReadPasteResponse,
    StatusRequest, StatusResponse,
};
use crate::session;
use crate::state::AppState;
use crate::store::{self, DbPool};

/// POST /api/submit
///
/// Create a paste. The response is the plain-text id with 201 Created —
/// the id is not secret to its own creator, so it skips the envelope.
pub async fn create_paste(
    State(state): State<AppState>,
    jar: CookieJar,
    body: String,
) -> Result<(StatusCode, String), ApiError> {
    let (req, _key): (CreatePasteRequest, _) = session::open_request(&state, &jar, &body)?;
    model::validate_create(&req, state.max_paste_bytes)?;

    // Argon2id and the store are both blocking work.
    let db = state.db.clone();
    let id = tokio::task::spawn_blocking(move || build_and_store(&db, req))
        .await
        .map_err(|_| ApiError::Internal)??;

    session::remember_created_paste(&state, &jar, &id);
    tracing::debug!("Created paste {}", id);
    Ok((StatusCode::CREATED, id))
}

/// Mint, encrypt, and persist a new entry in one store write.
fn build_and_store(db: &DbPool, req: CreatePasteRequest) -> Result<String, ApiError> {
    let id = id::mint(db);
    let salt: [u8; kdf::SALT_BYTES] = rand::rng().random();

    // Unprotected pastes use the identifier itself as password material:
    // anyone holding the retrieval URL can re-derive the key.
    let password = if req.pass_protect {
        req.pass.as_str()
    } else {
        id.as_str()
    };
    let key = kdf::derive(password.as_bytes(), &salt).map_err(|_| ApiError::Internal)?;

    let text = content::encrypt(req.paste_text.as_bytes(), &key);
    let mut files = Vec::with_capacity(req.files.len());
    for file in &req.files {
        let bytes = B64
            .decode(&file.data)
            .map_err(|_| ApiError::Validation("files (base64)"))?;
        files.push(FileRecord {
            name: file.name.clone(),
            size: file.size,
            blob: content::encrypt(&bytes, &key),
        });
    }

    let entry = Entry {
        id: id.clone(),
        timeout_unix: Utc::now().timestamp() + req.expiry,
        protected: req.pass_protect,
        salt: B64.encode(salt),
        text,
        files,
    };
    let value = serde_json::to_string(&entry).map_err(|_| ApiError::Internal)?;

    store::retry_once(|| store::set(db, &id, &value, req.expiry))?;

    // Best-effort statistics; never fail the request over them.
    if let Err(e) = store::add_to_counter(db, "created-count", 1.0) {
        tracing::warn!("Failed to bump created-count: {}", e);
    }
    if let Err(e) = store::add_to_counter(db, "cumulative-expiry-minutes", req.expiry as f64 / 60.0)
    {
        tracing::warn!("Failed to bump cumulative-expiry-minutes: {}", e);
    }

    Ok(id)
}

/// POST /api/read
///
/// Retrieve and decrypt a paste. Wrong password is 401, absent or expired
/// id is 404 — the two are never conflated. The decrypted response is
/// sealed under the caller's transport token.
pub async fn read_paste(
    State(state): State<AppState>,
    jar: CookieJar,
    body: String,
) -> Result<String, ApiError> {
    let (req, key): (ReadPasteRequest, _) = session::open_request(&state, &jar, &body)?;
    model::validate_read(&req)?;

    let db = state.db.clone();
    let response = tokio::task::spawn_blocking(move || unlock(&db, req))
        .await
        .map_err(|_| ApiError::Internal)??;

    Ok(session::seal_response(&response, &key))
}

/// Fetch an entry and run the per-request access decision.
fn unlock(db: &DbPool, req: ReadPasteRequest) -> Result<ReadPasteResponse, ApiError> {
    let raw = store::retry_once(|| store::get(db, &req.id))?.ok_or(ApiError::NotFound)?;
    let entry: Entry = serde_json::from_str(&raw).map_err(|_| ApiError::Internal)?;

    if entry.protected && req.pass.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    let salt = B64.decode(&entry.salt).map_err(|_| ApiError::Internal)?;
    let password = if entry.protected {
        req.pass.as_str()
    } else {
        req.id.as_str()
    };
    let key = kdf::derive(password.as_bytes(), &salt).map_err(|_| ApiError::Internal)?;

    let text = content::decrypt(&entry.text, &key).map_err(auth_or_internal)?;
    let text = String::from_utf8(text).map_err(|_| ApiError::Internal)?;

    let mut files = Vec::with_capacity(entry.files.len());
    for record in &entry.files {
        let plaintext = content::decrypt(&record.blob, &key).map_err(auth_or_internal)?;
        files.push(FilePlain {
            name: record.name.clone(),
            size: record.size,
            data: B64.encode(plaintext),
        });
    }

    Ok(ReadPasteResponse {
        id: entry.id,
        timeout_unix: entry.timeout_unix,
        protected: entry.protected,
        text: Some(text),
        files: if files.is_empty() { None } else { Some(files) },
        salt: Some(entry.salt),
    })
}

fn auth_or_internal(e: ContentError) -> ApiError {
    match e {
        ContentError::AuthenticationFailed => ApiError::Unauthorized,
        ContentError::Malformed => ApiError::Internal,
    }
}

/// POST /api/status
///
/// First contact for a reader: existence, expiry, and the protected flag
/// only. Ciphertext, salt, and key material are all withheld.
pub async fn paste_status(
    State(state): State<AppState>,
    jar: CookieJar,
    body: String,
) -> Result<String, ApiError> {
    let (req, key): (StatusRequest, _) = session::open_request(&state, &jar, &body)?;
    model::validate_status(&req)?;

    let db = state.db.clone();
    let paste_id = req.id;
    let response = tokio::task::spawn_blocking(move || -> Result<StatusResponse, ApiError> {
        let raw = store::retry_once(|| store::get(&db, &paste_id))?.ok_or(ApiError::NotFound)?;
        let entry: Entry = serde_json::from_str(&raw).map_err(|_| ApiError::Internal)?;
        Ok(StatusResponse {
            id: entry.id,
            timeout_unix: entry.timeout_unix,
            protected: entry.protected,
        })
    })
    .await
    .map_err(|_| ApiError::Internal)??;

    Ok(session::seal_response(&response, &key))
}
