use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use hashledger_api::{
    ErrorResponse, HashRegistrationRequest, HashRegistrationResponse, HashVerificationRequest,
    HashVerificationResponse, HealthResponse,
};
use hashledger_core::ReceiptClaim;
use hashledger_store::{LedgerError, verify_claim};
use tracing::{debug, error, info};

use crate::app::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn register_hash(
    State(state): State<AppState>,
    payload: Result<Json<HashRegistrationRequest>, JsonRejection>,
) -> Result<Json<HashRegistrationResponse>, ApiError> {
    let Json(req) = payload.map_err(invalid_body)?;
    if let Some(field) = req.empty_field() {
        return Err(invalid_request(format!("{field} must not be empty")));
    }

    debug!(session_id = %req.session_id, session_hash = %req.session_hash, "registering hash");
    let receipt = state
        .ledger
        .register(req.into_new_receipt())
        .await
        .map_err(storage_error)?;

    info!(
        session_id = %receipt.session_id,
        receipt_id = %receipt.receipt_id,
        hash_version = %receipt.hash_version,
        "hash registered"
    );
    Ok(Json(HashRegistrationResponse::from(receipt)))
}

pub async fn verify_hash(
    State(state): State<AppState>,
    payload: Result<Json<HashVerificationRequest>, JsonRejection>,
) -> Result<Json<HashVerificationResponse>, ApiError> {
    let Json(req) = payload.map_err(invalid_body)?;

    let claim = ReceiptClaim::from(req);
    let verification = verify_claim(state.ledger.as_ref(), &claim)
        .await
        .map_err(storage_error)?;

    info!(
        receipt_id = %claim.receipt_id,
        status = verification.status.as_str(),
        "hash verified"
    );
    Ok(Json(HashVerificationResponse::new(
        verification.status,
        &claim,
        verification.receipt.as_ref(),
    )))
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    (
        rejection.status(),
        Json(ErrorResponse {
            code: "invalid_request".to_string(),
            message: rejection.body_text(),
        }),
    )
}

fn invalid_request(message: String) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            code: "invalid_request".to_string(),
            message,
        }),
    )
}

fn storage_error(e: LedgerError) -> ApiError {
    error!(error = %e, "receipt ledger failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            code: "internal_error".to_string(),
            message: "receipt ledger unavailable".to_string(),
        }),
    )
}
