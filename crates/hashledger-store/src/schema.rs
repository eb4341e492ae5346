//! The `receipts` table, shared by the SQL backends.
//!
//! `created_at` holds the output of `hashledger_core::format_timestamp`, whose text
//! order is chronological. `seq` increases with every write, so rows stamped with
//! the same instant still order by when they were registered. Earliest-by-hash
//! lookups rely on both.

pub(crate) const SQLITE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS receipts (
  session_id    TEXT PRIMARY KEY,
  session_hash  TEXT NOT NULL,
  hash_version  TEXT NOT NULL,
  receipt_id    TEXT NOT NULL,
  metadata      TEXT NOT NULL,
  created_at    TEXT NOT NULL,
  seq           INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_receipts_session_hash ON receipts(session_hash);
CREATE INDEX IF NOT EXISTS idx_receipts_receipt_id ON receipts(receipt_id);
"#;

pub(crate) const POSTGRES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS receipts (
  session_id    TEXT PRIMARY KEY,
  session_hash  TEXT NOT NULL,
  hash_version  TEXT NOT NULL,
  receipt_id    TEXT NOT NULL,
  metadata      TEXT NOT NULL,
  created_at    TEXT NOT NULL,
  seq           BIGSERIAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_receipts_session_hash ON receipts (session_hash);
CREATE INDEX IF NOT EXISTS idx_receipts_receipt_id ON receipts (receipt_id);
"#;

/// Upsert on the session key. The next `seq` is read inside the statement, which
/// SQLite runs under its single write lock.
pub(crate) const SQLITE_UPSERT: &str = r#"
INSERT INTO receipts (session_id, session_hash, hash_version, receipt_id, metadata, created_at, seq)
VALUES ($1, $2, $3, $4, $5, $6, (SELECT COALESCE(MAX(seq), 0) + 1 FROM receipts))
ON CONFLICT (session_id) DO UPDATE SET
  session_hash = excluded.session_hash,
  hash_version = excluded.hash_version,
  receipt_id   = excluded.receipt_id,
  metadata     = excluded.metadata,
  created_at   = excluded.created_at,
  seq          = excluded.seq
"#;

/// Upsert on the session key. `excluded.seq` carries the `nextval` default drawn
/// for the proposed row.
pub(crate) const POSTGRES_UPSERT: &str = r#"
INSERT INTO receipts (session_id, session_hash, hash_version, receipt_id, metadata, created_at)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (session_id) DO UPDATE SET
  session_hash = excluded.session_hash,
  hash_version = excluded.hash_version,
  receipt_id   = excluded.receipt_id,
  metadata     = excluded.metadata,
  created_at   = excluded.created_at,
  seq          = excluded.seq
"#;

pub(crate) const SELECT_BY_SESSION_ID: &str = "SELECT session_id, session_hash, hash_version, receipt_id, metadata, created_at
     FROM receipts WHERE session_id = $1";

pub(crate) const SELECT_EARLIEST_BY_HASH: &str = "SELECT session_id, session_hash, hash_version, receipt_id, metadata, created_at
     FROM receipts WHERE session_hash = $1
     ORDER BY created_at ASC, seq ASC LIMIT 1";

pub(crate) const SELECT_BY_RECEIPT_ID: &str = "SELECT session_id, session_hash, hash_version, receipt_id, metadata, created_at
     FROM receipts WHERE receipt_id = $1";
