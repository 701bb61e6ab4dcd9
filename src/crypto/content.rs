//! XChaCha20-Poly1305 authenticated encryption for paste content.
//!
//! Wire format: base64( nonce (24 bytes) || ciphertext (includes Poly1305 tag) ).
//! The nonce is generated fresh and uniformly at random for every call and
//! never reused under the same key; the 192-bit nonce space makes random
//! generation safe without any bookkeeping.
//!
//! Tag mismatch is surfaced as [`ContentError::AuthenticationFailed`], the
//! sole authorization signal for protected pastes. It must never be folded
//! into not-found or malformed-data outcomes.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::Rng;
use thiserror::Error;

/// XChaCha20 nonce length in bytes.
pub const NONCE_BYTES: usize = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    /// Blob is not valid base64 or is shorter than a nonce.
    #[error("malformed content blob")]
    Malformed,

    /// Poly1305 tag verification failed: wrong key or tampered ciphertext.
    #[error("content authentication failed")]
    AuthenticationFailed,
}

/// Encrypt plaintext under a derived key.
///
/// Returns `base64(nonce || ciphertext)` ready for storage.
pub fn encrypt(plaintext: &[u8], key: &[u8; 32]) -> String {
    let cipher = XChaCha20Poly1305::new(key.into());
    let nonce_bytes: [u8; NONCE_BYTES] = rand::rng().random();
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce_bytes), plaintext)
        .expect("XChaCha20-Poly1305 encryption is infallible for in-memory buffers");

    let mut blob = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    B64.encode(blob)
}

/// Decrypt a `base64(nonce || ciphertext)` blob.
///
/// Self-contained given only the blob and the key. Fails closed: either the
/// full plaintext comes back or nothing does.
pub fn decrypt(blob_b64: &str, key: &[u8; 32]) -> Result<Vec<u8>, ContentError> {
    let blob = B64.decode(blob_b64).map_err(|_| ContentError::Malformed)?;
    if blob.len() < NONCE_BYTES {
        return Err(ContentError::Malformed);
    }

    let (nonce, ciphertext) = blob.split_at(NONCE_BYTES);
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| ContentError::AuthenticationFailed)
}
