//! Mutation error types

use thiserror::Error;

use crate::backend::BackendError;
use crate::forms::ValidationError;
use crate::model::{LoadStatus, UserRole};

/// Errors that can occur while changing loads
#[derive(Error, Debug)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Load not found: {0}")]
    NotFound(String),

    #[error("Cannot move load from {from} to {to}")]
    InvalidTransition { from: LoadStatus, to: LoadStatus },

    #[error("Load {id} is {status} and cannot be claimed")]
    NotClaimable { id: String, status: LoadStatus },

    #[error("User {user_id} ({}) cannot claim loads", .role.map_or("no role", |r| r.as_str()))]
    NotAHauler {
        user_id: String,
        role: Option<UserRole>,
    },

    #[error("Nothing to update")]
    EmptyPatch,

    #[error("Backend error: {0}")]
    Backend(BackendError),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<BackendError> for MutationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(what) => MutationError::NotFound(what),
            other => MutationError::Backend(other),
        }
    }
}

/// Result type for mutation operations
pub type MutationResult<T> = Result<T, MutationError>;
