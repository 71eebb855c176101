//! Record backend errors

use thiserror::Error;

/// Errors that can occur when talking to the record backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid record: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// Classify a transport failure
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Unavailable
        } else {
            BackendError::Request(err)
        }
    }

    /// Build an error from a non-success response status and body.
    ///
    /// The backend answers with `{code, message, data}`; the raw body is kept
    /// when it isn't JSON.
    pub fn from_response(status: u16, body: &str, what: &str) -> Self {
        match status {
            404 => BackendError::NotFound(what.to_string()),
            401 | 403 => BackendError::Unauthorized,
            _ => {
                let message = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                    .unwrap_or_else(|| body.to_string());
                BackendError::ApiError { status, message }
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}
