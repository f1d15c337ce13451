use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::collaborators::{CollaboratorError, Operation};
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad user input. No external call was made and the input is preserved.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A precondition for the step is missing (no profile, interview not finished, ...).
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Another external call is still outstanding for this session.
    #[error("Busy: {0} is still in progress")]
    Busy(Operation),

    /// The caller drove the session out of sequence.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// A collaborator failed or timed out. Session state is unchanged; the step can be retried.
    #[error("{operation} failed: {source}")]
    ExternalCall {
        operation: Operation,
        #[source]
        source: CollaboratorError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn external(operation: Operation, source: CollaboratorError) -> Self {
        AppError::ExternalCall { operation, source }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::ContractViolation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotReady(msg) => (StatusCode::CONFLICT, "NOT_READY", msg.clone()),
            AppError::Busy(_) => (StatusCode::CONFLICT, "CALL_IN_FLIGHT", self.to_string()),
            AppError::ContractViolation(msg) => {
                tracing::error!("Contract violation: {msg}");
                (StatusCode::CONFLICT, "CONTRACT_VIOLATION", msg.clone())
            }
            AppError::ExternalCall { operation, source } => {
                tracing::warn!("{operation} failed: {source}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTERNAL_CALL_FAILED",
                    format!("{operation} failed, please try again"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
