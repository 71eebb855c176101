//! Query error types

use thiserror::Error;

use super::LoadView;
use crate::backend::BackendError;

/// Errors that can occur while reading loads
#[derive(Error, Debug)]
pub enum QueryError {
    /// A user-scoped view was requested without a user
    #[error("The {0} view needs a signed-in user")]
    MissingUser(LoadView),

    /// Any backend failure; list reads surface it as one generic error
    #[error("Error loading data: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
