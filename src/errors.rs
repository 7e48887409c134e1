//! Unified error types and the boundary mapping to response triples.
//!
//! Every failure the crate reports carries exactly one [`ErrorKind`]. Store
//! failures arrive as [`sea_orm::DbErr`] and classify as `DbOperation` (or
//! `ResourceNotFound` for missing records); business-rule violations are
//! raised with their kind at the point of detection and propagate unchanged.

use http::StatusCode;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced record does not exist
    #[error("resource not found: {message}")]
    ResourceNotFound {
        /// What was looked up
        message: String,
    },

    /// Credentials were rejected
    #[error("auth failed: {message}")]
    AuthFailed {
        /// Why authentication failed
        message: String,
    },

    /// The caller may not perform the operation
    #[error("access denied: {message}")]
    AccessDenied {
        /// Why access was refused
        message: String,
    },

    /// Input or business-rule violation
    #[error("validation failed: {message}")]
    Validation {
        /// The rule that was violated
        message: String,
    },

    /// The operation conflicts with current state
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// Infrastructure fault reported by the store
    #[error("db operation failed: {0}")]
    Database(#[from] DbErr),

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Details about the configuration problem
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything the taxonomy does not cover
    #[error("unexpected error: {message}")]
    Unexpected {
        /// Details
        message: String,
    },
}

/// Error classification used at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing record
    ResourceNotFound,
    /// Bad credentials
    AuthFailed,
    /// Forbidden
    AccessDenied,
    /// Rejected input
    Validation,
    /// State conflict
    Conflict,
    /// Store failure
    DbOperation,
    /// Unclassified
    Unexpected,
}

impl Error {
    /// Builds a `ResourceNotFound` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            message: message.into(),
        }
    }

    /// Builds an `AuthFailed` error.
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::AuthFailed {
            message: message.into(),
        }
    }

    /// Builds an `AccessDenied` error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Builds a `Validation` error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Builds a `Conflict` error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Builds an `Unexpected` error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns the kind this error is classified as.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceNotFound { .. } | Self::Database(DbErr::RecordNotFound(_)) => {
                ErrorKind::ResourceNotFound
            }
            Self::AuthFailed { .. } => ErrorKind::AuthFailed,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::DbOperation,
            Self::Config { .. } | Self::Io(_) | Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// Response code and message for successful calls.
pub const SUCCESS_CODE: &str = "00";
/// Message paired with [`SUCCESS_CODE`].
pub const SUCCESS_MESSAGE: &str = "Success";

/// Error body returned at the boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status for the transport layer
    #[serde(skip)]
    pub status: StatusCode,
    /// Two-digit response code
    pub response_code: &'static str,
    /// Fixed message for the code
    pub response_message: &'static str,
    /// The wrapped cause as free text
    pub detail: String,
}

impl ErrorKind {
    /// Fixed status/code/message triple for this kind.
    #[must_use]
    pub const fn triple(self) -> (StatusCode, &'static str, &'static str) {
        match self {
            Self::ResourceNotFound => (StatusCode::NOT_FOUND, "01", "Resource Not Found"),
            Self::AuthFailed => (StatusCode::UNAUTHORIZED, "02", "Authentication Failed"),
            Self::AccessDenied => (StatusCode::FORBIDDEN, "03", "Access Denied"),
            Self::Validation => (StatusCode::BAD_REQUEST, "04", "Validation failed"),
            Self::Conflict | Self::DbOperation => (StatusCode::CONFLICT, "05", "Conflict Resource"),
            Self::Unexpected => (StatusCode::INTERNAL_SERVER_ERROR, "99", "Unexpected Error"),
        }
    }
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let (status, response_code, response_message) = error.kind().triple();
        Self {
            status,
            response_code,
            response_message,
            detail: error.to_string(),
        }
    }
}

/// Success envelope wrapping a payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Always [`SUCCESS_CODE`]
    pub response_code: &'static str,
    /// Always [`SUCCESS_MESSAGE`]
    pub response_message: &'static str,
    /// Operation result
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wraps `data` in a success envelope.
    pub const fn success(data: T) -> Self {
        Self {
            response_code: SUCCESS_CODE,
            response_message: SUCCESS_MESSAGE,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::not_found("x").kind(), ErrorKind::ResourceNotFound);
        assert_eq!(Error::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(Error::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(
            Error::Database(DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::DbOperation
        );
        assert_eq!(
            Error::Database(DbErr::RecordNotFound("order".to_string())).kind(),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            Error::Config {
                message: "missing".to_string()
            }
            .kind(),
            ErrorKind::Unexpected
        );
    }

    #[test]
    fn test_error_response_mapping() {
        let response = ErrorResponse::from(&Error::validation("too many order items"));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.response_code, "04");
        assert_eq!(response.response_message, "Validation failed");
        assert_eq!(response.detail, "validation failed: too many order items");

        let response = ErrorResponse::from(&Error::Database(DbErr::Custom("down".to_string())));
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.response_code, "05");

        let response = ErrorResponse::from(&Error::unexpected("?"));
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.response_code, "99");
    }

    #[test]
    fn test_error_response_wire_shape() {
        let response = ErrorResponse::from(&Error::access_denied("account inactive"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["responseCode"], "03");
        assert_eq!(json["responseMessage"], "Access Denied");
        assert_eq!(json["detail"], "access denied: account inactive");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["responseCode"], "00");
        assert_eq!(json["responseMessage"], "Success");
        assert_eq!(json["data"], 42);
    }
}
