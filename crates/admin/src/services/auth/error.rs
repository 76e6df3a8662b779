//! Admin authentication error types.

use thiserror::Error;

use soko_backend::RepositoryError;
use soko_backend::passwords::PasswordError;
use soko_core::EmailError;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The password was right but the account is a customer.
    #[error("admin access required")]
    NotAdmin,

    /// Password hashing failed.
    #[error("password hash error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<PasswordError> for AdminAuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Hash => Self::PasswordHash,
            _ => Self::InvalidCredentials,
        }
    }
}
