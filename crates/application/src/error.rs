use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::broadcaster::BroadcastError;
use crate::password::PasswordHasherError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
    #[error("broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),
    #[error("authentication failed")]
    Authentication,
}
