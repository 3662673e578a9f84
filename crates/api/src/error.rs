use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use patrol_core::error::CoreError;
use patrol_core::store::StoreError;
use patrol_core::types::EntityId;
use patrol_engine::{EngineError, ScanError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain and engine errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A scan that produced no record.
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Session {0} is no longer in progress")]
    SessionClosed(EntityId),

    /// Submission attempted before the officer signed.
    #[error("A signature is required before submitting the patrol")]
    SignatureRequired,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = classify(&self);

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify(err: &AppError) -> (StatusCode, &'static str, String) {
    match err {
        AppError::Core(core) => classify_core(core),
        AppError::Store(store) => classify_store(store),

        AppError::Engine(engine) => match engine {
            EngineError::Core(core) => classify_core(core),
            EngineError::Store(store) => classify_store(store),
            EngineError::SessionClosed(_) => session_closed(engine),
        },

        AppError::Scan(scan) => match scan {
            ScanError::Rejected(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                reason.code(),
                reason.to_string(),
            ),
            ScanError::Location(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.code(),
                scan.to_string(),
            ),
            ScanError::Cancelled => (StatusCode::CONFLICT, "SCAN_CANCELLED", scan.to_string()),
            ScanError::SessionClosed(_) => session_closed(scan),
            ScanError::Core(core) => classify_core(core),
        },

        AppError::SessionClosed(_) => session_closed(err),
        AppError::SignatureRequired => (
            StatusCode::BAD_REQUEST,
            "SIGNATURE_REQUIRED",
            err.to_string(),
        ),
        AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        AppError::InternalError(msg) => {
            tracing::error!(error = %msg, "Internal error");
            internal()
        }
    }
}

fn classify_core(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Storage failures are logged in full and reported without detail.
fn classify_store(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "Storage unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Storage is temporarily unavailable".to_string(),
            )
        }
        StoreError::Corrupt(msg) => {
            tracing::error!(error = %msg, "Corrupt stored record");
            internal()
        }
    }
}

fn session_closed(err: &dyn std::error::Error) -> (StatusCode, &'static str, String) {
    (StatusCode::CONFLICT, "SESSION_CLOSED", err.to_string())
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
