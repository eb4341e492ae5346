//! Behavioural suite every [`ReceiptLedger`] backend must pass.
//!
//! Each check namespaces its sessions and hashes with a fresh UUID, so the suite can
//! run repeatedly against a shared, long-lived database.

use hashledger_core::{Metadata, NewReceipt, ReceiptClaim, VerificationStatus};
use uuid::Uuid;

use crate::{LedgerError, ReceiptLedger, verify_claim};

/// Runs every conformance check against `ledger`.
pub async fn conformance<L: ReceiptLedger + ?Sized>(ledger: &L) -> Result<(), LedgerError> {
    test_missing_lookups(ledger).await?;
    test_register_round_trip(ledger).await?;
    test_default_hash_version(ledger).await?;
    test_overwrite_supersedes_receipt(ledger).await?;
    test_earliest_by_hash(ledger).await?;
    test_verification(ledger).await?;
    test_concurrent_registration(ledger).await?;
    Ok(())
}

fn unique(label: &str) -> String {
    format!("{label}-{}", Uuid::new_v4())
}

fn client_metadata() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("client".to_string(), serde_json::json!("test"));
    metadata.insert(
        "editor".to_string(),
        serde_json::json!({ "keystrokes": 42, "tags": ["a", "b"], "paused": null }),
    );
    metadata
}

/// Lookups on an unseen key return `None` rather than failing.
pub async fn test_missing_lookups<L: ReceiptLedger + ?Sized>(
    ledger: &L,
) -> Result<(), LedgerError> {
    let missing = unique("missing");
    assert!(ledger.get_by_session_id(&missing).await?.is_none());
    assert!(ledger.get_by_hash(&missing).await?.is_none());
    assert!(ledger.get_by_receipt_id(&missing).await?.is_none());
    Ok(())
}

/// Every lookup returns exactly what `register` reported.
pub async fn test_register_round_trip<L: ReceiptLedger + ?Sized>(
    ledger: &L,
) -> Result<(), LedgerError> {
    let session_id = unique("session");
    let session_hash = unique("hash");
    let registered = ledger
        .register(
            NewReceipt::new(&session_id, &session_hash)
                .with_hash_version("v2")
                .with_metadata(client_metadata()),
        )
        .await?;

    assert_eq!(registered.session_id, session_id);
    assert_eq!(registered.session_hash, session_hash);
    assert_eq!(registered.hash_version, "v2");
    assert_eq!(registered.metadata, client_metadata());
    assert!(!registered.receipt_id.is_empty());

    assert_eq!(
        ledger.get_by_session_id(&session_id).await?.as_ref(),
        Some(&registered)
    );
    assert_eq!(
        ledger.get_by_receipt_id(&registered.receipt_id).await?.as_ref(),
        Some(&registered)
    );
    assert_eq!(
        ledger.get_by_hash(&session_hash).await?.as_ref(),
        Some(&registered)
    );
    Ok(())
}

pub async fn test_default_hash_version<L: ReceiptLedger + ?Sized>(
    ledger: &L,
) -> Result<(), LedgerError> {
    let session_id = unique("session");
    ledger
        .register(NewReceipt::new(&session_id, unique("hash")))
        .await?;

    let stored = ledger
        .get_by_session_id(&session_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("registered session not found"))?;
    assert_eq!(stored.hash_version, hashledger_core::DEFAULT_HASH_VERSION);
    assert!(stored.metadata.is_empty());
    Ok(())
}

/// Re-registering a session replaces its receipt; the old id stops resolving.
pub async fn test_overwrite_supersedes_receipt<L: ReceiptLedger + ?Sized>(
    ledger: &L,
) -> Result<(), LedgerError> {
    let session_id = unique("session");
    let old_hash = unique("hash");
    let new_hash = unique("hash");

    let first = ledger
        .register(NewReceipt::new(&session_id, &old_hash).with_metadata(client_metadata()))
        .await?;
    let second = ledger
        .register(NewReceipt::new(&session_id, &new_hash).with_hash_version("v3"))
        .await?;

    assert_ne!(first.receipt_id, second.receipt_id);
    assert!(second.first_seen_at >= first.first_seen_at);

    assert_eq!(
        ledger.get_by_session_id(&session_id).await?.as_ref(),
        Some(&second)
    );
    assert!(ledger.get_by_receipt_id(&first.receipt_id).await?.is_none());
    assert_eq!(
        ledger.get_by_receipt_id(&second.receipt_id).await?.as_ref(),
        Some(&second)
    );
    assert!(ledger.get_by_hash(&old_hash).await?.is_none());
    assert_eq!(ledger.get_by_hash(&new_hash).await?.as_ref(), Some(&second));
    Ok(())
}

/// Sessions sharing a hash: the earliest registrant wins. Session ids sort
/// against registration order, so the answer cannot come from id order.
pub async fn test_earliest_by_hash<L: ReceiptLedger + ?Sized>(
    ledger: &L,
) -> Result<(), LedgerError> {
    let run = unique("shared");
    let shared_hash = format!("{run}-hash");

    let first = ledger
        .register(NewReceipt::new(format!("{run}-c"), &shared_hash))
        .await?;
    let second = ledger
        .register(NewReceipt::new(format!("{run}-b"), &shared_hash))
        .await?;
    ledger
        .register(NewReceipt::new(format!("{run}-a"), &shared_hash))
        .await?;

    assert_eq!(
        ledger.get_by_hash(&shared_hash).await?.as_ref(),
        Some(&first)
    );

    // Overwriting `first` restamps it, so `second` becomes the first registrant.
    ledger
        .register(NewReceipt::new(&first.session_id, &shared_hash))
        .await?;
    assert_eq!(
        ledger.get_by_hash(&shared_hash).await?.as_ref(),
        Some(&second)
    );
    Ok(())
}

pub async fn test_verification<L: ReceiptLedger + ?Sized>(
    ledger: &L,
) -> Result<(), LedgerError> {
    let good = ledger
        .register(NewReceipt::new(unique("session"), "good"))
        .await?;

    let claim = ReceiptClaim {
        receipt_id: good.receipt_id.clone(),
        session_id: good.session_id.clone(),
        session_hash: "good".to_string(),
    };
    let verified = verify_claim(ledger, &claim).await?;
    assert_eq!(verified.status, VerificationStatus::Verified);
    assert_eq!(verified.receipt.as_ref(), Some(&good));

    let tampered = ReceiptClaim {
        session_hash: "bad".to_string(),
        ..claim.clone()
    };
    let mismatch = verify_claim(ledger, &tampered).await?;
    assert_eq!(mismatch.status, VerificationStatus::Mismatch);
    assert_eq!(mismatch.receipt.as_ref(), Some(&good));

    let stranger = unique("session");
    let unknown = ReceiptClaim {
        receipt_id: unique("receipt"),
        session_id: stranger.clone(),
        session_hash: "good".to_string(),
    };
    let outcome = verify_claim(ledger, &unknown).await?;
    assert_eq!(outcome.status, VerificationStatus::Unknown);
    assert!(outcome.receipt.is_none());
    assert!(ledger.get_by_session_id(&stranger).await?.is_none());
    Ok(())
}

/// Two registrations racing on one session leave exactly one of them live.
pub async fn test_concurrent_registration<L: ReceiptLedger + ?Sized>(
    ledger: &L,
) -> Result<(), LedgerError> {
    let session_id = unique("session");
    let (left, right) = tokio::join!(
        ledger.register(NewReceipt::new(&session_id, "left")),
        ledger.register(NewReceipt::new(&session_id, "right")),
    );
    let (left, right) = (left?, right?);

    let live = ledger
        .get_by_session_id(&session_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("raced session not found"))?;
    assert!(live == left || live == right);

    let left_live = ledger.get_by_receipt_id(&left.receipt_id).await?.is_some();
    let right_live = ledger.get_by_receipt_id(&right.receipt_id).await?.is_some();
    assert!(left_live ^ right_live);
    Ok(())
}
