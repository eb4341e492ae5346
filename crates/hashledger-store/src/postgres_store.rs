use async_trait::async_trait;
use hashledger_core::{NewReceipt, Receipt, Sensitive, format_timestamp, parse_timestamp};
use sqlx::Row as _;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use tracing::debug;

use crate::error::LedgerError;
use crate::schema::{
    POSTGRES_SCHEMA, POSTGRES_UPSERT, SELECT_BY_RECEIPT_ID, SELECT_BY_SESSION_ID,
    SELECT_EARLIEST_BY_HASH,
};
use crate::types::{LedgerKind, ReceiptLedger};

#[derive(Debug, Clone)]
pub struct PostgresReceiptLedgerOptions {
    /// `postgres://` connection string.
    pub url: Sensitive<String>,
    pub max_connections: u32,
}

/// Networked ledger backed by a shared PostgreSQL database.
///
/// Concurrent registrations for one session are serialized by the server's
/// `ON CONFLICT` handling.
#[derive(Debug, Clone)]
pub struct PostgresReceiptLedger {
    pool: PgPool,
}

impl PostgresReceiptLedger {
    pub async fn connect(opts: PostgresReceiptLedgerOptions) -> Result<Self, LedgerError> {
        let pool = PgPoolOptions::new()
            .max_connections(opts.max_connections.max(1))
            .connect(opts.url.expose())
            .await?;
        Self::new(pool).await
    }

    /// Wraps an existing pool, creating the table and indexes if missing.
    pub async fn new(pool: PgPool) -> Result<Self, LedgerError> {
        sqlx::raw_sql(POSTGRES_SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    async fn fetch_one(
        &self,
        sql: &'static str,
        key: &str,
    ) -> Result<Option<Receipt>, LedgerError> {
        let row = sqlx::query(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(receipt_from_row).transpose()
    }
}

#[async_trait]
impl ReceiptLedger for PostgresReceiptLedger {
    async fn register(&self, new: NewReceipt) -> Result<Receipt, LedgerError> {
        let receipt = new.issue();
        let metadata_json = serde_json::to_string(&receipt.metadata)?;

        sqlx::query(POSTGRES_UPSERT)
            .bind(&receipt.session_id)
            .bind(&receipt.session_hash)
            .bind(&receipt.hash_version)
            .bind(&receipt.receipt_id)
            .bind(metadata_json)
            .bind(format_timestamp(&receipt.first_seen_at))
            .execute(&self.pool)
            .await?;

        debug!(
            session_id = %receipt.session_id,
            receipt_id = %receipt.receipt_id,
            "postgres receipt upserted"
        );
        Ok(receipt)
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
        LedgerKind::Postgres
    }
}

fn receipt_from_row(row: &PgRow) -> Result<Receipt, LedgerError> {
    let metadata_json: String = row.try_get("metadata")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Receipt {
        session_id: row.try_get("session_id")?,
        session_hash: row.try_get("session_hash")?,
        hash_version: row.try_get("hash_version")?,
        receipt_id: row.try_get("receipt_id")?,
        metadata: serde_json::from_str(&metadata_json)?,
        first_seen_at: parse_timestamp(&created_at)?,
    })
}
