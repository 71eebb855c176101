//! API Error Types
//!
//! Maps the errors of each layer onto HTTP status codes and the JSON
//! error body returned by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::backend::BackendError;
use crate::forms::{FieldError, ValidationError};
use crate::mutation::MutationError;
use crate::query::QueryError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Form or payload failed field validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed request outside field validation
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid auth state
    #[error("Authentication required")]
    Unauthorized,

    /// Signed in, but the role may not do this
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The request conflicts with the load's current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// List reads collapse backend failures into one message
    #[error("Error loading data")]
    Query(#[source] QueryError),

    /// Backend request failed
    #[error("Backend error: {0}")]
    Backend(#[source] BackendError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Backend(other),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::MissingUser(_) => ApiError::Unauthorized,
            QueryError::Backend(BackendError::NotFound(what)) => ApiError::NotFound(what),
            other => ApiError::Query(other),
        }
    }
}

impl From<MutationError> for ApiError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Validation(e) => ApiError::Validation(e),
            MutationError::NotFound(id) => ApiError::NotFound(format!("Load {}", id)),
            e @ (MutationError::InvalidTransition { .. } | MutationError::NotClaimable { .. }) => {
                ApiError::Conflict(e.to_string())
            }
            e @ MutationError::NotAHauler { .. } => ApiError::Forbidden(e.to_string()),
            MutationError::EmptyPatch => ApiError::BadRequest("Nothing to update".to_string()),
            MutationError::Backend(e) => ApiError::from(e),
            MutationError::Encode(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Query(_) => (StatusCode::BAD_GATEWAY, "LOAD_ERROR"),
            ApiError::Backend(BackendError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            ApiError::Backend(_) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        // The generic list message hides the cause; keep it in the log
        let cause = match &self {
            ApiError::Query(e) => e.to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %cause,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %cause,
                "Request rejected"
            );
        }

        let fields = match &self {
            ApiError::Validation(e) => e.errors.clone(),
            _ => Vec::new(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
                fields,
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LoadStatus;
    use crate::query::LoadView;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(ValidationError::single("origin", "Origin is required")), 400),
            (ApiError::NotFound("x".into()), 404),
            (ApiError::from(QueryError::MissingUser(LoadView::Mine)), 401),
            (
                ApiError::from(MutationError::NotClaimable {
                    id: "l1".into(),
                    status: LoadStatus::Assigned,
                }),
                409,
            ),
            (ApiError::from(QueryError::Backend(BackendError::Unavailable)), 502),
            (ApiError::from(BackendError::NotFound("l9".into())), 404),
            (ApiError::from(MutationError::EmptyPatch), 400),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_and_code().0.as_u16(), expected, "{:?}", err);
        }
    }

    #[test]
    fn test_query_errors_use_generic_message() {
        let err = ApiError::from(QueryError::Backend(BackendError::Timeout));
        assert_eq!(err.to_string(), "Error loading data");
    }
}
