use std::path::PathBuf;

use anyhow::Context as _;
use async_trait::async_trait;
use hashledger_core::{NewReceipt, Receipt, format_timestamp, parse_timestamp};
use rusqlite::{OptionalExtension, Row, params};
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::error::LedgerError;
use crate::schema::{
    SELECT_BY_RECEIPT_ID, SELECT_BY_SESSION_ID, SELECT_EARLIEST_BY_HASH, SQLITE_SCHEMA,
    SQLITE_UPSERT,
};
use crate::types::{LedgerKind, ReceiptLedger};

#[derive(Debug, Clone)]
pub struct SqliteReceiptLedgerOptions {
    pub path: PathBuf,
}

impl SqliteReceiptLedgerOptions {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// File-backed ledger for single-process deployments.
#[derive(Debug, Clone)]
pub struct SqliteReceiptLedger {
    conn: Connection,
}

impl SqliteReceiptLedger {
    pub async fn open(opts: SqliteReceiptLedgerOptions) -> Result<Self, LedgerError> {
        if let Some(parent) = opts.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create ledger dir {}", parent.display()))?;
        }

        let conn = Connection::open(&opts.path).await?;
        Self::init(conn, true).await
    }

    /// A private database that disappears with the ledger. Used by tests.
    pub async fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn, false).await
    }

    async fn init(conn: Connection, wal: bool) -> Result<Self, LedgerError> {
        conn.call(move |conn| {
            if wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.execute_batch(SQLITE_SCHEMA)?;
            Ok(())
        })
        .await?;
        Ok(Self { conn })
    }

    async fn fetch_one(
        &self,
        sql: &'static str,
        key: &str,
    ) -> Result<Option<Receipt>, LedgerError> {
        let key = key.to_string();
        let receipt = self
            .conn
            .call(move |conn| {
                Ok(conn
                    .query_row(sql, params![key], receipt_from_row)
                    .optional()?)
            })
            .await?;
        Ok(receipt)
    }

    async fn upsert(&self, receipt: Receipt) -> Result<Receipt, LedgerError> {
        let metadata_json = serde_json::to_string(&receipt.metadata)?;
        let created_at = format_timestamp(&receipt.first_seen_at);

        let session_id = receipt.session_id.clone();
        let session_hash = receipt.session_hash.clone();
        let hash_version = receipt.hash_version.clone();
        let receipt_id = receipt.receipt_id.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    SQLITE_UPSERT,
                    params![
                        session_id,
                        session_hash,
                        hash_version,
                        receipt_id,
                        metadata_json,
                        created_at
                    ],
                )?;
                Ok(())
            })
            .await?;

        debug!(
            session_id = %receipt.session_id,
            receipt_id = %receipt.receipt_id,
            "sqlite receipt upserted"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl ReceiptLedger for SqliteReceiptLedger {
    async fn register(&self, new: NewReceipt) -> Result<Receipt, LedgerError> {
        self.upsert(new.issue()).await
    }

    async fn get_by_session_id(&self, session_id: &str) -> Result<Option<Receipt>, LedgerError> {
        self.fetch_one(SELECT_BY_SESSION_ID, session_id).await
    }

    async fn get_by_hash(&self, session_hash: &str) -> Result<Option<Receipt>, LedgerError> {
        self.fetch_one(SELECT_EARLIEST_BY_HASH, session_hash).await
    }

    async fn get_by_receipt_id(&self, receipt_id: &str) -> Result<Option<Receipt>, LedgerError> {
        self.fetch_one(SELECT_BY_RECEIPT_ID, receipt_id).await
    }

    fn kind(&self) -> LedgerKind {
        LedgerKind::Sqlite
    }
}

fn receipt_from_row(row: &Row<'_>) -> rusqlite::Result<Receipt> {
    let metadata_json: String = row.get(4)?;
    let metadata = serde_json::from_str(&metadata_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at: String = row.get(5)?;
    let first_seen_at = parse_timestamp(&created_at).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Receipt {
        session_id: row.get(0)?,
        session_hash: row.get(1)?,
        hash_version: row.get(2)?,
        receipt_id: row.get(3)?,
        metadata,
        first_seen_at,
    })
}
