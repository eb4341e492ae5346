//! Runs the shared conformance suite against each ledger backend.

use hashledger_core::Sensitive;
use hashledger_store::conformance::conformance;
use hashledger_store::{
    InMemoryReceiptLedger, PostgresReceiptLedger, PostgresReceiptLedgerOptions,
    SqliteReceiptLedger, SqliteReceiptLedgerOptions,
};

#[tokio::test]
async fn memory_ledger_conformance() {
    let ledger = InMemoryReceiptLedger::default();
    conformance(&ledger).await.unwrap();
}

#[tokio::test]
async fn sqlite_in_memory_ledger_conformance() {
    let ledger = SqliteReceiptLedger::open_in_memory().await.unwrap();
    conformance(&ledger).await.unwrap();
}

#[tokio::test]
async fn sqlite_file_ledger_conformance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("hash_receipts.db");
    let ledger = SqliteReceiptLedger::open(SqliteReceiptLedgerOptions::new(path))
        .await
        .unwrap();
    conformance(&ledger).await.unwrap();
}

/// Needs a reachable server; skipped unless `HASHLEDGER_TEST_POSTGRES_URL` is set.
#[tokio::test]
async fn postgres_ledger_conformance() {
    let Ok(url) = std::env::var("HASHLEDGER_TEST_POSTGRES_URL") else {
        eprintln!("HASHLEDGER_TEST_POSTGRES_URL not set; skipping postgres conformance");
        return;
    };
    let ledger = PostgresReceiptLedger::connect(PostgresReceiptLedgerOptions {
        url: Sensitive::new(url),
        max_connections: 4,
    })
    .await
    .unwrap();
    conformance(&ledger).await.unwrap();
}
