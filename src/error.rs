use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy shared by every core operation.
///
/// Validation, state-conflict and policy errors carry the exact message that
/// is surfaced to the caller. Storage failures are wrapped and answered with
/// a generic 500 so internals never leak. Notifier failures are NOT part of
/// this enum on purpose: sends are fire-and-forget and only logged.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input (start > end, empty fields, bad month).
    #[error("{0}")]
    Validation(String),

    /// Operation violates a lifecycle guard (already punched in/out,
    /// request already processed).
    #[error("{0}")]
    StateConflict(String),

    /// Referenced employee/request/record does not exist.
    #[error("{0} not found.")]
    NotFound(&'static str),

    /// Notice-period or paid-leave-balance rule broken; message names the
    /// specific requirement or shortfall.
    #[error("{0}")]
    PolicyViolation(String),

    /// Caller's role does not allow the operation.
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Internal server error.")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::StateConflict(_)
            | AppError::PolicyViolation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Database(e) = self {
            tracing::error!(error = %e, "Storage failure");
        }

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn not_found_renders_entity_name() {
        let err = AppError::NotFound("Leave request");
        assert_eq!(err.to_string(), "Leave request not found.");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn guard_errors_are_bad_requests() {
        let err = AppError::StateConflict("You have already punched in today.".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::PolicyViolation("Requested days: 3".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_errors_hide_details() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), "Internal server error.");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
