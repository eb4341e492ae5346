//! Core types shared across the hash ledger workspace.
//!
//! This crate intentionally avoids pulling in storage or HTTP dependencies so it can
//! be shared by the ledger backends, the wire types, and the daemon.

pub mod receipt;
pub mod sensitive;
pub mod verify;

pub use receipt::{
    DEFAULT_HASH_VERSION, Metadata, NewReceipt, Receipt, format_timestamp, parse_timestamp,
};
pub use sensitive::Sensitive;
pub use verify::{ReceiptClaim, VerificationStatus, classify};
