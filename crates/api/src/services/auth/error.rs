//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::jwt::JwtError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] orchard_core::EmailError),

    /// Login failed: unknown email, wrong password, or disabled account.
    /// Responses never distinguish the three cases.
    #[error("login failed")]
    LoginFailed,

    /// An account with this email already exists.
    #[error("email already registered")]
    DuplicateEmail,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The old password presented for a password change was wrong.
    #[error("invalid password")]
    InvalidPassword,

    /// Token verification failed.
    #[error("token error: {0}")]
    Token(#[from] JwtError),

    /// The token was logged out or rotated away.
    #[error("token has been invalidated")]
    TokenInvalidated,

    /// The account is disabled.
    #[error("user is disabled")]
    UserDisabled,

    /// The token's user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
