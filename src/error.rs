use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Outcome taxonomy shared by every engine operation. The first four variants
/// are deterministic results of valid input and are never retried; `Conflict`
/// marks a lost compare-and-swap race and is retried once by the engine with
/// freshly loaded state; `Unavailable` wraps collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("illegal transition: {0}")]
    IllegalTransition(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl EngineError {
    pub const fn kind(&self) -> &'static str {
        match self {
            EngineError::Unauthorized(_) => "unauthorized",
            EngineError::NotFound(_) => "not_found",
            EngineError::IllegalTransition(_) => "illegal_transition",
            EngineError::InvariantViolation(_) => "invariant_violation",
            EngineError::Conflict(_) => "conflict",
            EngineError::Unavailable(_) => "unavailable",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Unauthorized(_) => StatusCode::FORBIDDEN,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::IllegalTransition(_) | EngineError::InvariantViolation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            EngineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "kind": self.kind(),
            "error": self.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}
