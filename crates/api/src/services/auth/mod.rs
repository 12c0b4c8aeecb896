//! Authentication service.
//!
//! Registration, login, logout, token refresh and password changes.
//! Tokens are stateless JWTs; logout and refresh work by denylisting the
//! presented token in `invalidated_tokens` until its natural expiry.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use orchard_core::{CartId, CustomerId, Email, Role, UserId, UserProfileId};

use crate::db::users::{NewAccountIds, ProfileFields};
use crate::db::{CartRepository, InvalidatedTokenRepository, UserRepository};
use crate::models::User;
use crate::services::jwt::{Claims, IssuedToken, JwtService};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// What a successful login hands back to the client.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub cart_item_count: i64,
}

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    jwt: &'a JwtService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt: &'a JwtService) -> Self {
        Self { pool, jwt }
    }

    /// Register a new shopper account.
    ///
    /// Creates the user, profile, customer and empty cart in one
    /// transaction; a failure anywhere rolls back all four rows.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email,
    /// `AuthError::WeakPassword` for a short password, and
    /// `AuthError::DuplicateEmail` if the address is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        profile: ProfileFields<'_>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let ids = NewAccountIds {
            user_id: UserId::generate(),
            profile_id: UserProfileId::generate(),
            customer_id: CustomerId::generate(),
            cart_id: CartId::generate(),
        };

        let user = UserRepository::new(self.pool)
            .create_account(ids, &email, &password_hash, Role::User, profile)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, returning a bearer token and the
    /// caller's distinct-cart-item count.
    ///
    /// Unknown email, wrong password and disabled account all collapse to
    /// `AuthError::LoginFailed`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::LoginFailed` as above.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::LoginFailed)?;

        let users = UserRepository::new(self.pool);
        let (user, password_hash) = users
            .get_with_password(&email)
            .await?
            .ok_or(AuthError::LoginFailed)?;

        if !user.is_active {
            return Err(AuthError::LoginFailed);
        }

        verify_password(password, &password_hash).map_err(|_| AuthError::LoginFailed)?;

        let token = self.jwt.issue(&user)?;

        // Admin accounts have no customer/cart; report zero items.
        let cart_item_count = match users.get_customer(user.id).await {
            Ok(customer) => {
                let carts = CartRepository::new(self.pool);
                let cart = carts.get_by_customer(customer.id).await?;
                carts.count_items(cart.id).await?
            }
            Err(crate::db::RepositoryError::NotFound) => 0,
            Err(e) => return Err(e.into()),
        };

        Ok(LoginOutcome {
            token,
            cart_item_count,
        })
    }

    /// Invalidate the presented token until its natural expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the denylist insert fails.
    pub async fn logout(&self, token: &str, claims: &Claims) -> Result<(), AuthError> {
        InvalidatedTokenRepository::new(self.pool)
            .insert(token, claims.expires_at())
            .await?;
        Ok(())
    }

    /// Exchange a still-valid token for a fresh one, denylisting the old
    /// token so it cannot be replayed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound`/`UserDisabled` if the account
    /// vanished or was disabled since issue.
    pub async fn refresh(&self, token: &str, claims: &Claims) -> Result<IssuedToken, AuthError> {
        let user = UserRepository::new(self.pool)
            .get(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let fresh = self.jwt.issue(&user)?;

        InvalidatedTokenRepository::new(self.pool)
            .insert(token, claims.expires_at())
            .await?;

        Ok(fresh)
    }

    /// Change a user's password after verifying the old one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPassword` if `old_password` doesn't
    /// verify, and `AuthError::WeakPassword` if the replacement is too
    /// short.
    pub async fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let users = UserRepository::new(self.pool);
        let current_hash = users.get_password_hash(user_id).await?;

        verify_password(old_password, &current_hash).map_err(|_| AuthError::InvalidPassword)?;
        validate_password(new_password)?;

        let new_hash = hash_password(new_password)?;
        users.set_password_hash(user_id, &new_hash).await?;

        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// Public so the CLI seeder hashes admin passwords identically.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidPassword)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidPassword)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("long enough password").is_ok());
    }

    #[test]
    fn test_hash_verify_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_rejected() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
