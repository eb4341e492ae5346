//! Hash ledger HTTP API types.
//!
//! This crate exists so the daemon and its clients share a stable wire contract.

pub mod types;

pub use types::*;
