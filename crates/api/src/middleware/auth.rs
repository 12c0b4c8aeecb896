//! Authentication extractors.
//!
//! The verified caller is an explicit value extracted per request - no
//! thread-local or global security context. [`CurrentUser`] does the full
//! check chain: bearer header, signature/expiry, denylist, account lookup,
//! active flag. [`RequireAdmin`] adds the role gate on top.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use orchard_core::CustomerId;

use crate::db::{InvalidatedTokenRepository, UserRepository};
use crate::error::AppError;
use crate::models::User;
use crate::services::auth::AuthError;
use crate::services::jwt::Claims;
use crate::state::AppState;

/// The authenticated caller, with the claims and raw token that proved it.
///
/// The raw token rides along because logout/refresh need to denylist the
/// exact string the client presented.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub claims: Claims,
    pub token: String,
}

impl CurrentUser {
    /// The caller's customer id, for commerce endpoints.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for accounts with no commerce
    /// profile (admin accounts).
    pub async fn customer_id(&self, state: &AppState) -> Result<CustomerId, AppError> {
        let customer = UserRepository::new(state.pool())
            .get_customer(self.user.id)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => {
                    AppError::Unauthorized("no customer profile for this account".to_owned())
                }
                other => AppError::Repository(other),
            })?;
        Ok(customer.id)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.to_owned();

        let claims = state
            .jwt()
            .verify(&token)
            .map_err(|e| AppError::Auth(AuthError::Token(e)))?;

        // Logged-out and rotated tokens are refused even before expiry
        if InvalidatedTokenRepository::new(state.pool())
            .contains(&token)
            .await?
        {
            return Err(AppError::Auth(AuthError::TokenInvalidated));
        }

        let user = UserRepository::new(state.pool())
            .get(claims.sub)
            .await?
            .ok_or(AppError::Auth(AuthError::UserNotFound))?;

        if !user.is_active {
            return Err(AppError::Auth(AuthError::UserDisabled));
        }

        Ok(Self {
            user,
            claims,
            token,
        })
    }
}

/// Extractor that additionally requires the ADMIN role.
///
/// # Example
///
/// ```rust,ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("hello, {}", admin.user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;

        if !current.user.role.is_admin() {
            return Err(AppError::Forbidden("admin role required".to_owned()));
        }

        Ok(Self(current))
    }
}

/// Extractor that requires the USER role (shopper endpoints; admins have
/// no cart or customer profile to act on).
#[derive(Debug, Clone)]
pub struct RequireUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;

        if current.user.role.is_admin() {
            return Err(AppError::Forbidden("user role required".to_owned()));
        }

        Ok(Self(current))
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/carts");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("request builds").into_parts();
        parts
    }

    #[test]
    fn test_extracts_bearer_token() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).ok(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_rejected() {
        let parts = parts_with_auth(None);
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn test_empty_bearer_rejected() {
        let parts = parts_with_auth(Some("Bearer "));
        assert!(bearer_token(&parts).is_err());
    }
}
