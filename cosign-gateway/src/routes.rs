//! Axum route handlers for the cosign gateway API.
//!
//! The acting principal of every request comes from the
//! [`CALLER_HEADER`] header; the gateway trusts its host to set it.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use cosign_core::{Amount, Principal, TransferId, TransferRequest, TransferSummary};
use cosign_engine::SharedEngine;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::GatewayError;

/// Header naming the principal on whose behalf a request acts.
pub const CALLER_HEADER: &str = "x-cosign-principal";

// ── Shared state ─────────────────────────────────────────────────────────────

type Engine = Arc<SharedEngine>;

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddValidatorBody {
    pub principal: Principal,
}

#[derive(Debug, Serialize)]
pub struct ValidatorStatus {
    pub principal: Principal,
    pub is_validator: bool,
}

#[derive(Debug, Deserialize)]
pub struct InitiateTransferBody {
    pub recipient: Principal,
    pub amount: Amount,
    pub deposit: Amount,
}

#[derive(Debug, Serialize)]
pub struct CreatedTransfer {
    pub id: TransferId,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub id: TransferId,
    pub confirmations: u32,
    pub executed: bool,
}

#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct EscrowResponse {
    pub balance: Amount,
}

#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub principal: Principal,
    pub released: Amount,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router over the given engine.
pub fn create_router(engine: Engine) -> Router {
    Router::new()
        .route("/v1/validators", post(add_validator))
        .route("/v1/validators/{principal}", get(validator_status))
        .route("/v1/transfers", post(initiate_transfer).get(total_transactions))
        .route("/v1/transfers/{id}", get(transaction_details))
        .route("/v1/transfers/{id}/confirm", post(confirm_transaction))
        .route("/v1/pending", get(pending_transactions))
        .route("/v1/escrow", get(escrow_balance))
        .route("/v1/payouts/{principal}", get(released_to))
        .route("/health", get(health))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn caller(headers: &HeaderMap) -> Result<Principal, GatewayError> {
    let raw = headers
        .get(CALLER_HEADER)
        .ok_or(GatewayError::MissingCaller(CALLER_HEADER))?;
    let text = raw
        .to_str()
        .map_err(|e| GatewayError::InvalidRequest(format!("caller header: {e}")))?;
    Ok(text.parse()?)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `POST /v1/validators` — register a validator. Owner only.
///
/// # Errors
/// Returns [`GatewayError::Engine`] if the caller is not the owner, the
/// principal is zero, or it is already a validator.
pub async fn add_validator(
    State(engine): State<Engine>,
    headers: HeaderMap,
    Json(body): Json<AddValidatorBody>,
) -> Result<impl IntoResponse, GatewayError> {
    let caller = caller(&headers)?;
    engine.add_validator(caller, body.principal)?;
    let status = ValidatorStatus { principal: body.principal, is_validator: true };
    Ok((StatusCode::CREATED, Json(status)))
}

/// `GET /v1/validators/:principal` — membership check.
///
/// # Errors
/// Returns [`GatewayError::Core`] if the path is not a principal.
pub async fn validator_status(
    State(engine): State<Engine>,
    Path(principal): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let principal: Principal = principal.parse()?;
    let is_validator = engine.is_validator(&principal);
    Ok(Json(ValidatorStatus { principal, is_validator }))
}

/// `POST /v1/transfers` — deposit and open a pending transfer.
///
/// # Errors
/// Returns [`GatewayError::Engine`] if the deposit does not match the amount
/// or the amount is zero.
pub async fn initiate_transfer(
    State(engine): State<Engine>,
    headers: HeaderMap,
    Json(body): Json<InitiateTransferBody>,
) -> Result<impl IntoResponse, GatewayError> {
    let caller = caller(&headers)?;
    let id = engine.initiate_transfer(caller, body.recipient, body.amount, body.deposit)?;
    Ok((StatusCode::CREATED, Json(CreatedTransfer { id })))
}

/// `GET /v1/transfers` — number of transfers ever created.
pub async fn total_transactions(State(engine): State<Engine>) -> Json<TotalResponse> {
    Json(TotalResponse { total: engine.total_transactions() })
}

/// `GET /v1/transfers/:id` — full transfer details.
///
/// # Errors
/// Returns [`GatewayError::Engine`] with `NotFound` for an unknown id.
pub async fn transaction_details(
    State(engine): State<Engine>,
    Path(id): Path<u64>,
) -> Result<Json<TransferRequest>, GatewayError> {
    Ok(Json(engine.transaction_details(TransferId::new(id))?))
}

/// `POST /v1/transfers/:id/confirm` — confirm as the calling validator.
///
/// # Errors
/// Returns [`GatewayError::Engine`] for every rejected confirmation.
pub async fn confirm_transaction(
    State(engine): State<Engine>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<ConfirmResponse>, GatewayError> {
    let caller = caller(&headers)?;
    let outcome = engine.confirm(caller, TransferId::new(id))?;
    Ok(Json(ConfirmResponse {
        id: outcome.id,
        confirmations: outcome.confirmations,
        executed: outcome.executed,
    }))
}

/// `GET /v1/pending` — pending transfers. Validators only.
///
/// # Errors
/// Returns [`GatewayError::Engine`] with `Unauthorized` for non-validators.
pub async fn pending_transactions(
    State(engine): State<Engine>,
    headers: HeaderMap,
) -> Result<Json<Vec<TransferSummary>>, GatewayError> {
    let caller = caller(&headers)?;
    Ok(Json(engine.pending_transactions(caller)?))
}

/// `GET /v1/escrow` — value currently held in escrow.
pub async fn escrow_balance(State(engine): State<Engine>) -> Json<EscrowResponse> {
    Json(EscrowResponse { balance: engine.escrow_balance() })
}

/// `GET /v1/payouts/:principal` — value released to a recipient so far.
///
/// # Errors
/// Returns [`GatewayError::Core`] if the path is not a principal.
pub async fn released_to(
    State(engine): State<Engine>,
    Path(principal): Path<String>,
) -> Result<Json<PayoutResponse>, GatewayError> {
    let principal: Principal = principal.parse()?;
    let released = engine.released_to(&principal);
    Ok(Json(PayoutResponse { principal, released }))
}
