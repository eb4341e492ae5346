//! The receipt ledger: one row per session binding it to a content hash.
//!
//! Every backend implements [`ReceiptLedger`] with the same contract:
//! - `register` is a single atomic upsert keyed on `session_id`
//! - lookups return `None` on a miss, never an error
//! - no locking beyond what the backing store's upsert provides
//!
//! [`conformance`] holds the shared behavioural suite every backend must pass.

pub mod conformance;
mod error;
mod memory_store;
mod postgres_store;
mod schema;
mod sqlite_store;
mod types;
mod verify;

pub use error::LedgerError;
pub use memory_store::InMemoryReceiptLedger;
pub use postgres_store::{PostgresReceiptLedger, PostgresReceiptLedgerOptions};
pub use sqlite_store::{SqliteReceiptLedger, SqliteReceiptLedgerOptions};
pub use types::{LedgerKind, LedgerOptions, ReceiptLedger, open_receipt_ledger};
pub use verify::{Verification, verify_claim};
