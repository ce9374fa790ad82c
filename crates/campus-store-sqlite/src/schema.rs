//! SQL schema for the Campus Connect SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Keyed JSON documents; writes replace the whole value.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL,
    key         TEXT NOT NULL,
    value_json  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,   -- ISO 8601 UTC
    PRIMARY KEY (collection, key)
);

CREATE TABLE IF NOT EXISTS accounts (
    uid            TEXT PRIMARY KEY,
    email          TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash  TEXT NOT NULL,   -- argon2 PHC string
    created_at     TEXT NOT NULL
);

-- The signed-in account, if any. A single row at most.
CREATE TABLE IF NOT EXISTS session (
    slot          INTEGER PRIMARY KEY CHECK (slot = 0),
    uid           TEXT NOT NULL REFERENCES accounts(uid),
    signed_in_at  TEXT NOT NULL
);

PRAGMA user_version = 1;
";
