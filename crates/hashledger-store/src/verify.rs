use hashledger_core::{Receipt, ReceiptClaim, VerificationStatus, classify};

use crate::error::LedgerError;
use crate::types::ReceiptLedger;

/// Outcome of checking a claim against the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub status: VerificationStatus,
    /// The live receipt under the claimed id, when there is one.
    pub receipt: Option<Receipt>,
}

/// Looks up the claimed receipt id and classifies the claim. Read-only: an unknown
/// claim never creates a row.
pub async fn verify_claim<L: ReceiptLedger + ?Sized>(
    ledger: &L,
    claim: &ReceiptClaim,
) -> Result<Verification, LedgerError> {
    let receipt = ledger.get_by_receipt_id(&claim.receipt_id).await?;
    let status = classify(claim, receipt.as_ref());
    Ok(Verification { status, receipt })
}
