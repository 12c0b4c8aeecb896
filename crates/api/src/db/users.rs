//! User repository: accounts, profiles, customers.

use sqlx::PgPool;

use orchard_core::{
    CartId, CustomerId, Email, Role, UserId, UserProfileId,
};

use super::{PageRequest, RepositoryError};
use crate::models::{Customer, User, UserProfile};

const USER_COLUMNS: &str = "id, email, is_active, role, created_at, updated_at";
const PROFILE_COLUMNS: &str =
    "id, user_id, first_name, last_name, phone_number, address, created_at, updated_at";

/// Profile fields captured at registration or profile update.
#[derive(Debug, Clone)]
pub struct ProfileFields<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: Option<&'a str>,
    pub address: Option<&'a str>,
}

/// Ids for the row family created at registration.
#[derive(Debug, Clone, Copy)]
pub struct NewAccountIds {
    pub user_id: UserId,
    pub profile_id: UserProfileId,
    pub customer_id: CustomerId,
    pub cart_id: CartId,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            user: User,
            password_hash: String,
        }

        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, Row>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Get a user's password hash by id, for change-password verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn get_password_hash(&self, id: UserId) -> Result<String, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(|(hash,)| hash).ok_or(RepositoryError::NotFound)
    }

    /// Create the full account row family in one transaction: user,
    /// profile, customer, and the customer's (empty) cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create_account(
        &self,
        ids: NewAccountIds,
        email: &Email,
        password_hash: &str,
        role: Role,
        profile: ProfileFields<'_>,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO users (id, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(ids.user_id)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("email already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        sqlx::query(
            "INSERT INTO user_profiles (id, user_id, first_name, last_name, phone_number, address) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(ids.profile_id)
        .bind(ids.user_id)
        .bind(profile.first_name)
        .bind(profile.last_name)
        .bind(profile.phone_number)
        .bind(profile.address)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO customers (id, user_id, created_by, modified_by) \
             VALUES ($1, $2, $3, $3)",
        )
        .bind(ids.customer_id)
        .bind(ids.user_id)
        .bind(ids.user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO carts (id, customer_id) VALUES ($1, $2)")
            .bind(ids.cart_id)
            .bind(ids.customer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile row.
    pub async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Overwrite a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile row.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        profile: ProfileFields<'_>,
    ) -> Result<UserProfile, RepositoryError> {
        let sql = format!(
            "UPDATE user_profiles \
             SET first_name = $2, last_name = $3, phone_number = $4, address = $5, \
                 updated_at = NOW() \
             WHERE user_id = $1 \
             RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(profile.first_name)
            .bind(profile.last_name)
            .bind(profile.phone_number)
            .bind(profile.address)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(password_hash)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get the commerce profile for a user account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no customer row
    /// (admin accounts don't).
    pub async fn get_customer(&self, user_id: UserId) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, user_id, created_at, updated_at, created_by, modified_by \
             FROM customers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// List users by active status, paginated (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_status(
        &self,
        is_active: bool,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active = $1 \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(is_active)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_active = $1")
            .bind(is_active)
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total.0))
    }

    /// Set a user's active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_active(&self, user_id: UserId, active: bool) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(active)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
