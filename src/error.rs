use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Your account is pending approval by an administrator")]
    AccountPending,

    #[error("Your account has been suspended. Please contact the association secretariat")]
    AccountSuspended,

    #[error("Your membership has expired. Please renew to continue")]
    AccountExpired,

    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Member ID {0} is already assigned to another user")]
    IdAlreadyAssigned(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Payment {0} not found")]
    PaymentNotFound(String),

    #[error("Session storage exhausted: even the minimal user record does not fit")]
    StorageExhausted,

    #[error("Network or server error: {0}")]
    NetworkOrServerError(String),
}

/// JSON body of every non-2xx response. The remote portal decodes it back
/// into an [`AppError`] through `code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::AccountPending => "ACCOUNT_PENDING",
            AppError::AccountSuspended => "ACCOUNT_SUSPENDED",
            AppError::AccountExpired => "ACCOUNT_EXPIRED",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::ValidationFailed(_) => "VALIDATION_FAILED",
            AppError::IdAlreadyAssigned(_) => "ID_ALREADY_ASSIGNED",
            AppError::UserNotFound(_) => "USER_NOT_FOUND",
            AppError::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            AppError::StorageExhausted => "STORAGE_EXHAUSTED",
            AppError::NetworkOrServerError(_) => "NETWORK_OR_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) | AppError::UserNotFound(_) | AppError::PaymentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden
            | AppError::AccountPending
            | AppError::AccountSuspended
            | AppError::AccountExpired => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::DuplicateEmail | AppError::ValidationFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::IdAlreadyAssigned(_) => StatusCode::CONFLICT,
            AppError::StorageExhausted => StatusCode::INSUFFICIENT_STORAGE,
            AppError::NetworkOrServerError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            // Internal details stay in the server log.
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::ValidationFailed(_) => "Validation failed".to_string(),
            other => other.to_string(),
        };

        let errors = match self {
            AppError::ValidationFailed(errors) => Some(errors.clone()),
            _ => None,
        };

        let subject = match self {
            AppError::IdAlreadyAssigned(id)
            | AppError::UserNotFound(id)
            | AppError::PaymentNotFound(id) => Some(id.clone()),
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::NetworkOrServerError(msg) => Some(msg.clone()),
            _ => None,
        };

        ErrorBody {
            message,
            code: self.code().to_string(),
            errors,
            subject,
        }
    }

    /// Rebuilds the error a server reported. Unknown codes collapse into
    /// `NetworkOrServerError` so callers only ever see the one taxonomy.
    pub fn from_body(body: ErrorBody) -> Self {
        let subject = body.subject.unwrap_or_else(|| body.message.clone());
        match body.code.as_str() {
            "NOT_FOUND" => AppError::NotFound(subject),
            "UNAUTHORIZED" => AppError::Unauthorized,
            "FORBIDDEN" => AppError::Forbidden,
            "BAD_REQUEST" => AppError::BadRequest(subject),
            "INVALID_CREDENTIALS" => AppError::InvalidCredentials,
            "ACCOUNT_PENDING" => AppError::AccountPending,
            "ACCOUNT_SUSPENDED" => AppError::AccountSuspended,
            "ACCOUNT_EXPIRED" => AppError::AccountExpired,
            "DUPLICATE_EMAIL" => AppError::DuplicateEmail,
            "VALIDATION_FAILED" => AppError::ValidationFailed(body.errors.unwrap_or_default()),
            "ID_ALREADY_ASSIGNED" => AppError::IdAlreadyAssigned(subject),
            "USER_NOT_FOUND" => AppError::UserNotFound(subject),
            "PAYMENT_NOT_FOUND" => AppError::PaymentNotFound(subject),
            "STORAGE_EXHAUSTED" => AppError::StorageExhausted,
            _ => AppError::NetworkOrServerError(body.message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(msg) => tracing::error!("Database error: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::NetworkOrServerError(msg) => tracing::error!("Upstream error: {}", msg),
            _ => {}
        }

        (self.status(), Json(self.to_body())).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NetworkOrServerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AccountPending.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::AccountSuspended.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::IdAlreadyAssigned("M-1".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::StorageExhausted.status(), StatusCode::INSUFFICIENT_STORAGE);
    }

    #[test]
    fn test_body_round_trips_through_code() {
        let errors = vec!["phone must contain between 10 and 15 digits".to_string()];
        for err in [
            AppError::AccountExpired,
            AppError::ValidationFailed(errors),
            AppError::IdAlreadyAssigned("NAMM-0042".into()),
            AppError::PaymentNotFound("p-1".into()),
            AppError::StorageExhausted,
        ] {
            assert_eq!(AppError::from_body(err.to_body()), err);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let body = AppError::Database("no such table: users".into()).to_body();
        assert_eq!(body.message, "Database error occurred");
        assert_eq!(body.subject, None);
    }

    #[test]
    fn test_unknown_code_becomes_network_error() {
        let body = ErrorBody {
            message: "teapot".into(),
            code: "SOMETHING_ELSE".into(),
            errors: None,
            subject: None,
        };
        assert_eq!(
            AppError::from_body(body),
            AppError::NetworkOrServerError("teapot".into())
        );
    }
}
