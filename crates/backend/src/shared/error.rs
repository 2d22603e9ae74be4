//! HTTP-facing error type.
//!
//! Services return `anyhow::Result`. Domain failures are raised as
//! `AppError` inside the `anyhow::Error` and recovered here by downcast;
//! anything else becomes `Internal` and is logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contracts::domain::common::AggregateRoot;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    /// `NotFound` named after the aggregate, e.g. "Policy not found"
    pub fn missing<A: AggregateRoot>() -> Self {
        Self::not_found(A::element_name())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AppError>() {
            Ok(app) => app,
            Err(other) => {
                tracing::error!("Internal error: {:#}", other);
                AppError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_survive_anyhow() {
        let err: anyhow::Error = AppError::Validation("bad amount".into()).into();
        let app = AppError::from(err);
        assert_eq!(app.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(app.to_string(), "bad amount");
    }

    #[test]
    fn test_other_errors_become_internal() {
        let app = AppError::from(anyhow::anyhow!("disk I/O error at /var/db"));
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!app.to_string().contains("/var/db"));
    }

    #[test]
    fn test_missing_aggregate_message() {
        use contracts::domain::a003_policy::aggregate::Policy;
        use contracts::domain::a001_agent::aggregate::Agent;

        let err = AppError::missing::<Policy>();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Policy not found");
        assert_eq!(AppError::missing::<Agent>().to_string(), "Agent not found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::not_found("Policy").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Unauthorized("Invalid credentials".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
