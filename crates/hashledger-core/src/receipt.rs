use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Hash format tag assumed when a registration does not name one.
pub const DEFAULT_HASH_VERSION: &str = "v1";

/// Opaque client metadata. Stored and returned as-is, never interpreted.
pub type Metadata = serde_json::Map<String, Value>;

/// The live receipt for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub receipt_id: String,
    pub session_id: String,
    pub session_hash: String,
    pub hash_version: String,
    pub metadata: Metadata,
    /// Time of the registration that created or last overwrote this receipt.
    pub first_seen_at: DateTime<Utc>,
}

/// A registration request, before the ledger has issued an id for it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReceipt {
    pub session_id: String,
    pub session_hash: String,
    pub hash_version: String,
    pub metadata: Metadata,
}

impl NewReceipt {
    pub fn new(session_id: impl Into<String>, session_hash: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            session_hash: session_hash.into(),
            hash_version: DEFAULT_HASH_VERSION.to_string(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_hash_version(mut self, hash_version: impl Into<String>) -> Self {
        self.hash_version = hash_version.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Issues a receipt with a fresh UUIDv4 id, stamped with the current time.
    pub fn issue(self) -> Receipt {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(self, first_seen_at: DateTime<Utc>) -> Receipt {
        Receipt {
            receipt_id: Uuid::new_v4().to_string(),
            session_id: self.session_id,
            session_hash: self.session_hash,
            hash_version: self.hash_version,
            metadata: self.metadata,
            first_seen_at,
        }
    }
}

/// Renders a timestamp the way the ledger stores it.
///
/// Fixed nanosecond precision with a `Z` suffix keeps the text form sortable, so
/// `ORDER BY created_at` is chronological on every backend.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}
