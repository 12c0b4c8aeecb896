//! User profile and admin user-management services.

use sqlx::PgPool;

use orchard_core::UserId;

use crate::db::users::ProfileFields;
use crate::db::{PageRequest, RepositoryError, SortColumns, UserRepository};
use crate::models::{User, UserProfile};

/// Sortable columns for the admin user listing.
pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &["email", "created_at"],
    default: "created_at",
};

/// Errors from user profile and admin operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// The user id doesn't resolve.
    #[error("user not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// User profile service for the authenticated account.
pub struct UserService<'a> {
    pool: &'a PgPool,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The caller's profile.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if the profile row is missing.
    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile, UserError> {
        UserRepository::new(self.pool)
            .get_profile(user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UserError::NotFound,
                other => UserError::Repository(other),
            })
    }

    /// Overwrite the caller's profile fields.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if the profile row is missing.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        profile: ProfileFields<'_>,
    ) -> Result<UserProfile, UserError> {
        UserRepository::new(self.pool)
            .update_profile(user_id, profile)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UserError::NotFound,
                other => UserError::Repository(other),
            })
    }
}

/// Admin-only user management service.
pub struct AdminService<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List users by active status, paginated.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Repository` on query failure.
    pub async fn list_users_by_status(
        &self,
        is_active: bool,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), UserError> {
        let listed = UserRepository::new(self.pool)
            .list_by_status(is_active, page)
            .await?;
        Ok(listed)
    }

    /// Enable or disable an account. Disabled accounts fail login and
    /// every authenticated request.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if the id doesn't resolve.
    pub async fn set_user_status(&self, user_id: UserId, active: bool) -> Result<(), UserError> {
        UserRepository::new(self.pool)
            .set_active(user_id, active)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UserError::NotFound,
                other => UserError::Repository(other),
            })
    }
}
