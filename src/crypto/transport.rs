//! AES-256-CBC transport envelope for API bodies.
//!
//! Wire format: base64( iv (16 bytes) || ciphertext ), PKCS7 padding, keyed
//! by the short-lived session token. This is a pure application-level wrap,
//! independent of both the content layer and whatever security the channel
//! itself provides — its job is to keep payloads (including transient
//! passwords) opaque to passive inspection.
//!
//! CBC carries no integrity tag; tampering surfaces either as a padding
//! error here or as a JSON parse failure in the caller. Both collapse into
//! the same silent-drop outcome, so an on-path tamperer learns nothing.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use rand::Rng;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Session token length in bytes (AES-256 key).
pub const KEY_BYTES: usize = 32;

/// CBC initialization vector length in bytes.
pub const IV_BYTES: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("transport envelope could not be opened")]
pub struct EnvelopeError;

/// Wrap a payload: fresh random IV, AES-256-CBC, base64.
pub fn seal(plaintext: &[u8], key: &[u8; KEY_BYTES]) -> String {
    let iv: [u8; IV_BYTES] = rand::rng().random();
    let ciphertext =
        Aes256CbcEnc::new(key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut blob = Vec::with_capacity(IV_BYTES + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    B64.encode(blob)
}

/// Unwrap a `base64(iv || ciphertext)` payload.
pub fn open(blob_b64: &str, key: &[u8; KEY_BYTES]) -> Result<Vec<u8>, EnvelopeError> {
    let blob = B64.decode(blob_b64.trim()).map_err(|_| EnvelopeError)?;
    if blob.len() < IV_BYTES || (blob.len() - IV_BYTES) % 16 != 0 {
        return Err(EnvelopeError);
    }

    let (iv, ciphertext) = blob.split_at(IV_BYTES);
    let iv: [u8; IV_BYTES] = iv.try_into().map_err(|_| EnvelopeError)?;
    Aes256CbcDec::new(key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| EnvelopeError)
}

/// Generate a fresh 256-bit session token.
pub fn generate_token() -> [u8; KEY_BYTES] {
    rand::rng().random()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = generate_token();
        let sealed = seal(b"{\"id\":\"happy-otter-42\"}", &key);
        assert_eq!(open(&sealed, &key).unwrap(), b"{\"id\":\"happy-otter-42\"}");
    }

    #[test]
    fn ivs_are_random_per_message() {
        let key = generate_token();
        assert_ne!(seal(b"same body", &key), seal(b"same body", &key));
    }

    #[test]
    fn corruption_never_yields_the_plaintext() {
        let key = generate_token();
        let sealed = seal(b"sensitive payload", &key);
        let mut raw = B64.decode(&sealed).unwrap();
        for index in 0..raw.len() {
            raw[index] ^= 0xff;
            let tampered = B64.encode(&raw);
            // Without the authentication tag of an AEAD, a corrupted CBC
            // blob may still unpad by chance; it must never reproduce the
            // original payload.
            if let Ok(plaintext) = open(&tampered, &key) {
                assert_ne!(plaintext, b"sensitive payload");
            }
            raw[index] ^= 0xff;
        }
    }

    #[test]
    fn truncated_and_garbage_inputs_are_rejected() {
        let key = generate_token();
        assert_eq!(open("", &key), Err(EnvelopeError));
        assert_eq!(open("@@@not-base64@@@", &key), Err(EnvelopeError));
        let short = B64.encode([0u8; IV_BYTES - 1]);
        assert_eq!(open(&short, &key), Err(EnvelopeError));
        // IV present but ciphertext not block-aligned
        let ragged = B64.encode([0u8; IV_BYTES + 5]);
        assert_eq!(open(&ragged, &key), Err(EnvelopeError));
    }
}
