//! Argon2id key derivation for paste content keys.
//!
//! Parameters are fixed so that derivation is reproducible bit-for-bit on
//! every retrieval: the server holds no derived-key cache, it re-derives
//! from (password, salt) each time. Changing these constants invalidates
//! every stored paste.

use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

/// Salt length in bytes, generated fresh per paste.
pub const SALT_BYTES: usize = 16;

/// Derived key length in bytes (XChaCha20-Poly1305 key size).
pub const KEY_BYTES: usize = 32;

/// Argon2id memory cost in KiB (64 MiB).
const MEMORY_KIB: u32 = 64 * 1024;

/// Argon2id iteration count.
const ITERATIONS: u32 = 3;

/// Argon2id parallelism lanes.
const PARALLELISM: u32 = 4;

/// Upper bound on password input length. The API validates user passwords
/// at 100 characters; this bound only guards against misuse of the unit.
const MAX_PASSWORD_BYTES: usize = 512;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KdfError {
    #[error("salt must not be empty")]
    EmptySalt,

    #[error("password exceeds {MAX_PASSWORD_BYTES} bytes")]
    PasswordTooLong,

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// Derive a 32-byte content key from a password and a per-paste salt.
///
/// Same (password, salt) always produces the same key; a different salt
/// produces an unrelated key even for identical passwords.
pub fn derive(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_BYTES], KdfError> {
    if salt.is_empty() {
        return Err(KdfError::EmptySalt);
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(KdfError::PasswordTooLong);
    }

    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, Some(KEY_BYTES))
        .expect("fixed Argon2 params are valid");
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_BYTES];
    argon
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| KdfError::Derivation(e.to_string()))?;
    Ok(key)
}
