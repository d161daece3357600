use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error("Request failed ({status}): {message}")]
    RequestFailure { status: u16, message: String },

    #[error("Not implemented on the server: {0}")]
    NotImplemented(String),

    #[error("Unexpected response shape: {0}")]
    DataShapeMismatch(String),

    #[error("Cache corrupted: {0}")]
    CacheCorruption(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::AuthenticationFailure(_) => "AUTHENTICATION_FAILURE",
            AppError::RequestFailure { .. } => "REQUEST_FAILURE",
            AppError::NotImplemented(_) => "NOT_IMPLEMENTED",
            AppError::DataShapeMismatch(_) => "DATA_SHAPE_MISMATCH",
            AppError::CacheCorruption(_) => "CACHE_CORRUPTION",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error should be shown to the operator. Shape mismatches and
    /// cache corruption are only logged.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            AppError::DataShapeMismatch(_) | AppError::CacheCorruption(_)
        )
    }

    /// The bare message for display, without the variant prefix `Display`
    /// adds for logs. A request failure yields the server's text verbatim.
    pub fn user_message(&self) -> &str {
        match self {
            AppError::AuthenticationFailure(message)
            | AppError::RequestFailure { message, .. }
            | AppError::NotImplemented(message)
            | AppError::DataShapeMismatch(message)
            | AppError::CacheCorruption(message)
            | AppError::ValidationError(message)
            | AppError::InternalError(message) => message,
        }
    }

    pub fn request_failure(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::RequestFailure {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Single-line message surfaced to the UI for a failed operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub error: String,
    pub code: &'static str,
}

impl From<&AppError> for ErrorMessage {
    fn from(err: &AppError) -> Self {
        ErrorMessage {
            error: err.user_message().to_string(),
            code: err.error_code(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::request_failure(status, err.to_string()),
            None => AppError::RequestFailure {
                status: 0,
                message: format!("Network error: {}", err),
            },
        }
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::CacheCorruption(format!("JSON error: {}", err))
    }
}
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::AuthenticationFailure(format!("Invalid token: {}", err))
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("I/O error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
