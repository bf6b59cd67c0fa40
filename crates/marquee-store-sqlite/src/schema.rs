//! SQL schema for the Marquee SQLite store.
//!
//! The collaborator tables are created once at connection startup. The
//! engagement tables (`engagement_events`, `ratings`) are created lazily on
//! first write, so reading them on a fresh database fails with
//! `no such table`.

/// Collaborator DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,   -- 24 lowercase hex chars
    title       TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Favorites are a denormalised JSON array of subject ids.
CREATE TABLE IF NOT EXISTS identities (
    identity_id TEXT PRIMARY KEY,
    favorites   TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    subject_id  TEXT NOT NULL,
    identity_id TEXT,
    status      TEXT NOT NULL DEFAULT 'approved',  -- 'approved' | 'pending' | 'rejected'
    deleted     INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

-- Only the SHA-256 digest of a session token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT PRIMARY KEY,
    identity_id TEXT NOT NULL REFERENCES identities(identity_id),
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS comments_created_idx ON comments(created_at);

PRAGMA user_version = 1;
";

/// Run before every append. Events are strictly append-only: no UPDATE or
/// DELETE is ever issued against this table.
pub const EVENTS_DDL: &str = "
CREATE TABLE IF NOT EXISTS engagement_events (
    event_id    TEXT PRIMARY KEY,
    subject_id  TEXT NOT NULL,
    identity_id TEXT,               -- NULL for anonymous callers
    event_type  TEXT NOT NULL,      -- 'view' | 'favorite' | 'rating'
    value       INTEGER NOT NULL,
    mode        TEXT NOT NULL DEFAULT 'movie',
    created_at  TEXT NOT NULL       -- RFC 3339 UTC, fixed width
);

CREATE INDEX IF NOT EXISTS engagement_events_created_idx
    ON engagement_events(created_at);
CREATE INDEX IF NOT EXISTS engagement_events_subject_idx
    ON engagement_events(subject_id, event_type);
";

/// Run before creating any rating index.
pub const RATINGS_DDL: &str = "
CREATE TABLE IF NOT EXISTS ratings (
    rating_id   TEXT PRIMARY KEY,
    subject_id  TEXT NOT NULL,
    identity_id TEXT NOT NULL,
    rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
";

/// Deliberately without `IF NOT EXISTS`: a repeated attempt must report
/// that the index already exists.
pub const RATINGS_SUBJECT_IDENTITY_UQ: &str =
  "CREATE UNIQUE INDEX ratings_subject_identity_uq ON ratings(subject_id, identity_id)";

pub const RATINGS_SUBJECT_IDX: &str =
  "CREATE INDEX ratings_subject_idx ON ratings(subject_id)";
