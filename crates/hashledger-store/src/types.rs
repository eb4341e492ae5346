use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use hashledger_core::{NewReceipt, Receipt, Sensitive};

use crate::error::LedgerError;
use crate::memory_store::InMemoryReceiptLedger;
use crate::postgres_store::{PostgresReceiptLedger, PostgresReceiptLedgerOptions};
use crate::sqlite_store::{SqliteReceiptLedger, SqliteReceiptLedgerOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Sqlite,
    Postgres,
    Memory,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LedgerOptions {
    pub kind: LedgerKind,
    /// Database file for the `Sqlite` backend.
    pub sqlite_path: PathBuf,
    /// Required for the `Postgres` backend. May embed credentials.
    pub database_url: Option<Sensitive<String>>,
    pub max_connections: u32,
}

/// Storage for receipts, keyed by session id.
#[async_trait]
pub trait ReceiptLedger: Send + Sync {
    /// Issues a fresh receipt for the session and upserts it, replacing any receipt
    /// the session already had. Returns exactly what was persisted.
    async fn register(&self, new: NewReceipt) -> Result<Receipt, LedgerError>;

    async fn get_by_session_id(&self, session_id: &str) -> Result<Option<Receipt>, LedgerError>;

    /// The earliest registered receipt carrying `session_hash`.
    async fn get_by_hash(&self, session_hash: &str) -> Result<Option<Receipt>, LedgerError>;

    /// Resolves only live ids; an id replaced by re-registration is `None`.
    async fn get_by_receipt_id(&self, receipt_id: &str) -> Result<Option<Receipt>, LedgerError>;

    fn kind(&self) -> LedgerKind;
}

pub async fn open_receipt_ledger(
    opts: LedgerOptions,
) -> Result<Arc<dyn ReceiptLedger>, LedgerError> {
    match opts.kind {
        LedgerKind::Sqlite => Ok(Arc::new(
            SqliteReceiptLedger::open(SqliteReceiptLedgerOptions::new(opts.sqlite_path)).await?,
        )),
        LedgerKind::Postgres => {
            let url = opts.database_url.ok_or_else(|| {
                LedgerError::Config(
                    "missing database url for postgres ledger (set I_TYPED_THIS_DATABASE_URL)"
                        .to_string(),
                )
            })?;
            Ok(Arc::new(
                PostgresReceiptLedger::connect(PostgresReceiptLedgerOptions {
                    url,
                    max_connections: opts.max_connections,
                })
                .await?,
            ))
        }
        LedgerKind::Memory => Ok(Arc::new(InMemoryReceiptLedger::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(kind: LedgerKind, sqlite_path: PathBuf) -> LedgerOptions {
        LedgerOptions {
            kind,
            sqlite_path,
            database_url: None,
            max_connections: 4,
        }
    }

    #[tokio::test]
    async fn opens_sqlite_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hash_receipts.db");
        let ledger = open_receipt_ledger(options(LedgerKind::Sqlite, path.clone()))
            .await
            .unwrap();
        assert_eq!(ledger.kind(), LedgerKind::Sqlite);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn postgres_without_url_is_config_error() {
        let err = open_receipt_ledger(options(LedgerKind::Postgres, PathBuf::new()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[tokio::test]
    async fn memory_backend_round_trips() {
        let ledger = open_receipt_ledger(options(LedgerKind::Memory, PathBuf::new()))
            .await
            .unwrap();
        let r = ledger
            .register(NewReceipt::new("session-1", "abc"))
            .await
            .unwrap();
        assert_eq!(ledger.get_by_session_id("session-1").await.unwrap(), Some(r));
    }
}
