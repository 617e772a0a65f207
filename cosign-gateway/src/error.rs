//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cosign_core::CoreError;
use cosign_engine::EngineError;
use serde_json::json;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// An error propagated from the engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A principal or amount in the request could not be parsed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request did not name its caller.
    #[error("missing caller header '{0}'")]
    MissingCaller(&'static str),

    /// The request is malformed or contains invalid values.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::Engine(e) => engine_status(e),
            GatewayError::Core(_) | GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MissingCaller(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

fn engine_status(error: &EngineError) -> StatusCode {
    match error {
        EngineError::Unauthorized { .. } | EngineError::SelfApprovalForbidden { .. } => {
            StatusCode::FORBIDDEN
        }
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::AlreadyMember(_)
        | EngineError::AlreadyConfirmed { .. }
        | EngineError::AlreadyExecuted(_) => StatusCode::CONFLICT,
        EngineError::InvalidPrincipal
        | EngineError::AmountMismatch { .. }
        | EngineError::ZeroAmount => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
