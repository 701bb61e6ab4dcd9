//! Cryptographic building blocks.
//!
//! Two independent layers compose here:
//! - `kdf` + `content`: the paste's own confidentiality. An Argon2id-derived
//!   key (from the password, or the paste id for unprotected pastes)
//!   encrypts the content with XChaCha20-Poly1305. Decryption failure is the
//!   authorization signal — no separate password proof exists.
//! - `transport`: the session-token envelope wrapping every API body,
//!   independent of the content layer and of channel security.

pub mod content;
pub mod kdf;
pub mod transport;
