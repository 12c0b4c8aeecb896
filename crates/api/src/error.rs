//! Unified error handling with Sentry integration.
//!
//! Domain services raise typed errors; this is the single boundary that
//! turns each of them into an HTTP status and the `{message, data: null}`
//! envelope. Server-side failures are captured to Sentry and logged; their
//! response bodies carry a generic message, never raw database text or a
//! stack trace.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::{PageError, RepositoryError};
use crate::response::ApiResponse;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::categories::CategoryError;
use crate::services::featured::FeaturedError;
use crate::services::jwt::JwtError;
use crate::services::products::ProductError;
use crate::services::reviews::ReviewError;
use crate::services::upload::UploadError;
use crate::services::users::UserError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// Category operation failed.
    #[error("category error: {0}")]
    Category(#[from] CategoryError),

    /// Product operation failed.
    #[error("product error: {0}")]
    Product(#[from] ProductError),

    /// Featured-product operation failed.
    #[error("featured product error: {0}")]
    Featured(#[from] FeaturedError),

    /// Review operation failed.
    #[error("review error: {0}")]
    Review(#[from] ReviewError),

    /// User operation failed.
    #[error("user error: {0}")]
    User(#[from] UserError),

    /// Image upload failed.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// Pagination/sort parameters were invalid.
    #[error("{0}")]
    Page(#[from] PageError),

    /// Database operation failed outside a service.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Request body failed validation.
    #[error("invalid request data: {0}")]
    Validation(String),

    /// The request carried no usable bearer credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's role doesn't allow this endpoint.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::DuplicateEmail
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::LoginFailed
                | AuthError::InvalidPassword
                | AuthError::Token(_)
                | AuthError::TokenInvalidated
                | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserDisabled => StatusCode::FORBIDDEN,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound | CartError::ItemNotFound => StatusCode::NOT_FOUND,
                CartError::QuantityExceedsStock => StatusCode::BAD_REQUEST,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Category(err) => match err {
                CategoryError::NotFound => StatusCode::NOT_FOUND,
                CategoryError::DuplicateName => StatusCode::BAD_REQUEST,
                CategoryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Product(err) => match err {
                ProductError::NotFound | ProductError::CategoryNotFound => StatusCode::NOT_FOUND,
                ProductError::Upload(upload) => upload_status(upload),
                ProductError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Featured(err) => match err {
                FeaturedError::ProductNotFound | FeaturedError::NotFound => StatusCode::NOT_FOUND,
                FeaturedError::Overlapping | FeaturedError::InvalidWindow(_) => {
                    StatusCode::BAD_REQUEST
                }
                FeaturedError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Review(err) => match err {
                ReviewError::NotFound | ReviewError::ProductNotFound => StatusCode::NOT_FOUND,
                ReviewError::Duplicate | ReviewError::InvalidRating => StatusCode::BAD_REQUEST,
                ReviewError::AccessDenied => StatusCode::FORBIDDEN,
                ReviewError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::User(err) => match err {
                UserError::NotFound => StatusCode::NOT_FOUND,
                UserError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Upload(err) => upload_status(err),
            Self::Page(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Repository(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Anything server-side collapses to a generic
    /// line; the specifics go to the log and Sentry only.
    fn message(&self) -> String {
        match self {
            Self::Auth(AuthError::LoginFailed) => "Login failed".to_owned(),
            Self::Auth(AuthError::Token(JwtError::Expired)) => "Token expired".to_owned(),
            Self::Auth(
                AuthError::Token(JwtError::Invalid) | AuthError::TokenInvalidated
                | AuthError::UserNotFound,
            )
            | Self::Unauthorized(_) => "Unauthorized request".to_owned(),
            Self::Auth(AuthError::UserDisabled) => "User is disabled".to_owned(),
            Self::Forbidden(_) => "Access denied".to_owned(),
            Self::Upload(err) | Self::Product(ProductError::Upload(err)) => match err {
                UploadError::Http(_) | UploadError::Rejected(_) => {
                    "Image storage unavailable".to_owned()
                }
                _ => format!("Invalid image file: {err}"),
            },
            other if other.status().is_server_error() => "Internal server error".to_owned(),
            other => match other {
                Self::Auth(err) => err.to_string(),
                Self::Cart(err) => err.to_string(),
                Self::Category(err) => err.to_string(),
                Self::Product(err) => err.to_string(),
                Self::Featured(err) => err.to_string(),
                Self::Review(err) => err.to_string(),
                Self::User(err) => err.to_string(),
                Self::Page(err) => err.to_string(),
                Self::Validation(msg) => format!("Invalid request data: {msg}"),
                Self::Repository(RepositoryError::NotFound) => "Resource not found".to_owned(),
                Self::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
                other => other.to_string(),
            },
        }
    }
}

fn upload_status(err: &UploadError) -> StatusCode {
    match err {
        UploadError::EmptyFile | UploadError::NotAnImage(_) | UploadError::TooLarge => {
            StatusCode::BAD_REQUEST
        }
        UploadError::Http(_) | UploadError::Rejected(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server-side failures to Sentry; client errors are noise
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ApiResponse::<serde_json::Value>::empty(&self.message());
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_not_found_kinds() {
        assert_eq!(
            status_of(AppError::Cart(CartError::ItemNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Featured(FeaturedError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Category(CategoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_bad_request_kinds() {
        assert_eq!(
            status_of(AppError::Cart(CartError::QuantityExceedsStock)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Featured(FeaturedError::Overlapping)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Review(ReviewError::Duplicate)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::DuplicateEmail)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Upload(UploadError::EmptyFile)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_kinds() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::LoginFailed)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidPassword)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::UserDisabled)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Review(ReviewError::AccessDenied)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = AppError::Internal("connection pool exhausted: 42 waiters".to_owned());
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_conflict_message_is_curated_not_raw() {
        // Repositories pre-translate constraint violations; the boundary
        // passes that curated text through.
        let err = AppError::Repository(RepositoryError::Conflict(
            "category name already exists".to_owned(),
        ));
        assert_eq!(err.message(), "category name already exists");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
