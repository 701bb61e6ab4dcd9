use rusqlite_migration::{Migrations, M};

/// Define all schema migrations.
/// Uses SQLite user_version pragma for tracking — no migration table needed.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "-- Migration 1: TTL key-value store and statistics counters

CREATE TABLE kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    expires_at INTEGER
);

CREATE INDEX idx_kv_expires_at ON kv(expires_at);

CREATE TABLE counters (
    name TEXT PRIMARY KEY,
    value REAL NOT NULL DEFAULT 0
);
",
    )])
}
