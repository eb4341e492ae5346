use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use hashledger_core::Sensitive;
use hashledger_store::ReceiptLedger;

use crate::hashes::{health, register_hash, verify_hash};
use crate::middleware::{cors, require_api_key};
use crate::settings::{AllowedOrigins, Settings};

/// Shared by every handler. The ledger is opened once at startup and injected here.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn ReceiptLedger>,
    pub api_key: Arc<Sensitive<String>>,
    pub allowed_origins: Arc<AllowedOrigins>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn ReceiptLedger>, settings: &Settings) -> Self {
        Self {
            ledger,
            api_key: Arc::new(settings.api_key.clone()),
            allowed_origins: Arc::new(settings.allowed_origins.clone()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let registration = Router::new()
        .route("/api/v1/hashes", post(register_hash))
        .route("/api/v1/hashes/", post(register_hash))
        .route_layer(from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/hashes/verify", post(verify_hash))
        .merge(registration)
        .layer(from_fn_with_state(state.clone(), cors))
        .with_state(state)
}
