use crate::auth::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Domain errors for the account operations, each mapped to one HTTP status.
///
/// `Authentication` deliberately carries no detail: unknown email, wrong
/// password and bad OTP must be indistinguishable to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("User already exists")]
    Conflict,
    #[error("Authentication failed")]
    Authentication,
    #[error("{0}")]
    NotFound(String),
    #[error("Internal server error")]
    Store(#[source] StoreError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::Conflict,
            other => Self::Store(other),
        }
    }
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Infrastructure detail stays in the logs, never in the response body
        match &self {
            Self::Store(err) => error!("store error: {err:?}"),
            Self::Internal(err) => error!("internal error: {err:?}"),
            _ => {}
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::Validation("Invalid email format".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::Authentication.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::NotFound("User not found".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_authentication_message_is_generic() {
        assert_eq!(AuthError::Authentication.to_string(), "Authentication failed");
    }

    #[test]
    fn test_infrastructure_detail_not_leaked() {
        let err = AuthError::Internal(anyhow::anyhow!("dsn=postgres://secret"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_duplicate_email_becomes_conflict() {
        let err = AuthError::from(StoreError::DuplicateEmail);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "User already exists");
    }

    #[test]
    fn test_store_error_is_internal() {
        let err = AuthError::from(StoreError::Database(sqlx::Error::RowNotFound));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
