//! Authentication error types.

use thiserror::Error;

use ecofinds_core::{EmailError, UsernameError};

use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately undifferentiated.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Signup without a password.
    #[error("password is required")]
    EmptyPassword,

    /// Another account already uses this email.
    #[error("email already registered")]
    EmailTaken,

    /// Another account already uses this username.
    #[error("username already taken")]
    UsernameTaken,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
