use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use talent_core::error::CoreError;
use talent_dashboard::WorkflowError;
use talent_integration::ConnectorError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, the connector and workflow errors
/// of the onboarding flow, and HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent `{ "error", "code" }` bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `talent_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The integration platform failed or rejected the call.
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    /// An onboarding workflow transition was refused.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, id = %id, "Entity not found");
                    (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        format!("{entity} not found"),
                    )
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Onboarding flow ---
            AppError::Connector(err) => upstream(err),
            AppError::Workflow(err) => match err {
                WorkflowError::SubmitDisabled => {
                    (StatusCode::BAD_REQUEST, "SUBMIT_DISABLED", err.to_string())
                }
                WorkflowError::Closed => (StatusCode::CONFLICT, "SESSION_CLOSED", err.to_string()),
                WorkflowError::Connector(inner) => upstream(inner),
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Connector failures surface the upstream message as a 502.
fn upstream(err: &ConnectorError) -> (StatusCode, &'static str, String) {
    tracing::warn!(error = %err, "Connector call failed");
    let message = match err.user_message().trim() {
        "" => "The integration platform did not respond".to_string(),
        msg => msg.to_string(),
    };
    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message)
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
