use crate::session::SessionMap;
use crate::store::DbPool;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// SQLite-backed TTL key-value store
    pub db: DbPool,
    /// In-memory transport sessions (DashMap for concurrent access)
    pub sessions: SessionMap,
    /// Transport token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Maximum accepted paste text size in bytes
    pub max_paste_bytes: usize,
}
