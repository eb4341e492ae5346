//! Three-way classification of a claimed receipt against ledger state.

use serde::{Deserialize, Serialize};

use crate::Receipt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Mismatch,
    Unknown,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Mismatch => "mismatch",
            Self::Unknown => "unknown",
        }
    }
}

/// What a client asserts about a receipt it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptClaim {
    pub receipt_id: String,
    pub session_id: String,
    pub session_hash: String,
}

/// Classifies `claim` against the receipt currently stored under its id.
///
/// `stored` must be the result of looking up `claim.receipt_id`; an absent
/// receipt is `Unknown`. Both session id and hash must match byte for byte.
pub fn classify(claim: &ReceiptClaim, stored: Option<&Receipt>) -> VerificationStatus {
    match stored {
        None => VerificationStatus::Unknown,
        Some(r) if r.session_id == claim.session_id && r.session_hash == claim.session_hash => {
            VerificationStatus::Verified
        }
        Some(_) => VerificationStatus::Mismatch,
    }
}
