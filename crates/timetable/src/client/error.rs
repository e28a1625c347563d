//! Error types for backend calls.

use crate::validation::ValidationErrors;
use thiserror::Error;

/// Errors that can occur while talking to the timetable backend.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// Form payload failed local validation; nothing was sent
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Password and confirmation differ; nothing was sent
    #[error("{message}")]
    PasswordMismatch { message: &'static str },

    /// Network/HTTP request failed before a response arrived
    #[error("Network error: {message}")]
    Network { message: String },

    /// Backend answered with a non-success status
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The call needs a logged-in session
    #[error("No active session: {message}")]
    NoSession { message: String },

    /// The logged-in role may not perform this action
    #[error("Access denied")]
    Forbidden,

    /// Backend answered 2xx but the body was not what we expected
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },

    #[error("No verification token provided.")]
    MissingToken,

    #[error("Unsupported photo type '{extension}'. Only JPEG, JPG, PNG and GIF are allowed")]
    InvalidPhotoType { extension: String },

    #[error("{format} export is not available for {target}")]
    UnsupportedExport { target: String, format: String },

    /// Local file access failed
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl ApiError {
    /// Returns true if the user has to log in (again) before retrying.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            ApiError::NoSession { .. } | ApiError::Backend { status: 401, .. }
        )
    }

    /// Returns true if the error was raised locally before any request.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_)
                | ApiError::PasswordMismatch { .. }
                | ApiError::Forbidden
                | ApiError::NoSession { .. }
                | ApiError::MissingToken
                | ApiError::InvalidPhotoType { .. }
                | ApiError::UnsupportedExport { .. }
        )
    }

    /// The message a form would display.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(errors) => errors.first_message().to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::UrlError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io {
            message: err.to_string(),
        }
    }
}
