use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    #[error("postgres error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("metadata json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored timestamp is not rfc3339: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("ledger configuration error: {0}")]
    Config(String),
    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}
