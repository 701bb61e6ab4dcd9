//! Request/response schemas, the persisted entry layout, and boundary
//! validation. Every request is validated here before any cryptographic
//! work runs; validation failure names the offending field and never leaves
//! a partial entry behind.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Minimum paste lifetime in seconds (1 minute).
pub const MIN_EXPIRY_SECS: i64 = 60;

/// Maximum paste lifetime in seconds (7 days).
pub const MAX_EXPIRY_SECS: i64 = 604_800;

/// Maximum password length in characters.
pub const MAX_PASS_LEN: usize = 100;

/// Minimum paste identifier length accepted on read.
pub const MIN_ID_LEN: usize = 4;

// --- Request types (decrypted from the transport envelope) ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePasteRequest {
    /// Requested lifetime in seconds
    pub expiry: i64,
    pub pass_protect: bool,
    #[serde(default)]
    pub pass: String,
    pub paste_text: String,
    #[serde(default)]
    pub files: Vec<FileUpload>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpload {
    /// Declared file name; stored as-is, never parsed by the server
    pub name: String,
    /// Declared plaintext size in bytes
    pub size: u64,
    /// Base64 file bytes
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadPasteRequest {
    pub id: String,
    /// Empty for unprotected pastes
    #[serde(default)]
    pub pass: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub id: String,
}

// --- Persisted entry (JSON value in the TTL store) ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub timeout_unix: i64,
    pub protected: bool,
    /// Base64 per-entry salt; public, never reused across entries
    pub salt: String,
    /// Base64 nonce || ciphertext || tag
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    /// Base64 nonce || ciphertext || tag
    pub blob: String,
}

// --- Response types (sealed into the transport envelope) ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadPasteResponse {
    pub id: String,
    pub timeout_unix: i64,
    pub protected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FilePlain>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePlain {
    pub name: String,
    pub size: u64,
    /// Base64 decrypted file bytes
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub id: String,
    pub timeout_unix: i64,
    pub protected: bool,
}

// --- Validation ---

pub fn validate_create(req: &CreatePasteRequest, max_paste_bytes: usize) -> Result<(), ApiError> {
    if req.expiry < MIN_EXPIRY_SECS || req.expiry > MAX_EXPIRY_SECS {
        return Err(ApiError::Validation("expiry (int) out of bounds"));
    }
    if req.pass_protect && req.pass.is_empty() {
        return Err(ApiError::Validation("pass (string) invalid length"));
    }
    if req.pass.chars().count() > MAX_PASS_LEN {
        return Err(ApiError::Validation("pass (string) invalid length"));
    }
    if req.paste_text.len() > max_paste_bytes {
        return Err(ApiError::Validation("pasteText (string) too large"));
    }
    Ok(())
}

pub fn validate_read(req: &ReadPasteRequest) -> Result<(), ApiError> {
    if req.id.len() < MIN_ID_LEN {
        return Err(ApiError::Validation("id (string) too short"));
    }
    if req.pass.chars().count() > MAX_PASS_LEN {
        return Err(ApiError::Validation("pass (string) invalid length"));
    }
    Ok(())
}

pub fn validate_status(req: &StatusRequest) -> Result<(), ApiError> {
    if req.id.len() < MIN_ID_LEN {
        return Err(ApiError::Validation("id (string) too short"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_req(expiry: i64, pass_protect: bool, pass: &str) -> CreatePasteRequest {
        CreatePasteRequest {
            expiry,
            pass_protect,
            pass: pass.to_string(),
            paste_text: "hello".to_string(),
            files: Vec::new(),
        }
    }

    #[test]
    fn expiry_bounds_are_inclusive() {
        assert!(validate_create(&create_req(MIN_EXPIRY_SECS, false, ""), 1024).is_ok());
        assert!(validate_create(&create_req(MAX_EXPIRY_SECS, false, ""), 1024).is_ok());
        assert!(validate_create(&create_req(MIN_EXPIRY_SECS - 1, false, ""), 1024).is_err());
        assert!(validate_create(&create_req(MAX_EXPIRY_SECS + 1, false, ""), 1024).is_err());
    }

    #[test]
    fn protected_paste_requires_a_password() {
        assert!(validate_create(&create_req(3600, true, ""), 1024).is_err());
        assert!(validate_create(&create_req(3600, true, "s3cret"), 1024).is_ok());
    }

    #[test]
    fn overlong_password_is_rejected() {
        let long = "x".repeat(MAX_PASS_LEN + 1);
        assert!(validate_create(&create_req(3600, true, &long), 1024).is_err());
    }

    #[test]
    fn short_read_id_is_rejected() {
        let req = ReadPasteRequest {
            id: "abc".to_string(),
            pass: String::new(),
        };
        assert!(validate_read(&req).is_err());
    }

    #[test]
    fn oversized_paste_text_is_rejected() {
        let mut req = create_req(3600, false, "");
        req.paste_text = "x".repeat(32);
        assert!(validate_create(&req, 16).is_err());
    }
}
