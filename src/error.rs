//! API error type and its HTTP mapping.
//!
//! Every handler returns `Result<_, ApiError>`. The mapping is deliberately
//! coarse on the wire: wrong password, missing paste, and transport failures
//! are each distinguishable, but store internals never leak to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range request field. Carries the offending
    /// field description, which is reported back to the caller.
    #[error("invalid property: {0}")]
    Validation(&'static str),

    /// The password-derived key failed to authenticate the content.
    /// Distinct from NotFound: the paste exists.
    #[error("incorrect password")]
    Unauthorized,

    /// Identifier absent from the store, or expired.
    #[error("paste not found")]
    NotFound,

    /// Inbound body could not be decrypted under the session's transport
    /// token (untokened caller, stale token, or on-path tampering).
    /// Answered with an empty 204 so the endpoint leaks nothing.
    #[error("transport decryption failed")]
    TransportDecrypt,

    /// Backing store failure. Fatal for this request only.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(field) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid property: {field}") })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Incorrect password" })),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Paste not found" })),
            )
                .into_response(),
            ApiError::TransportDecrypt => StatusCode::NO_CONTENT.into_response(),
            ApiError::Store(e) => {
                tracing::error!("Store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Server error" })),
                )
                    .into_response()
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Server error" })),
            )
                .into_response(),
        }
    }
}
