//! Category repository.

use sqlx::PgPool;

use orchard_core::{CategoryId, UserId};

use super::{PageRequest, RepositoryError};
use crate::models::Category;

const COLUMNS: &str = "id, name, description, slug, is_deleted, \
                       created_at, updated_at, created_by, modified_by";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories by soft-delete state, paginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_deleted(
        &self,
        is_deleted: bool,
        page: PageRequest,
    ) -> Result<(Vec<Category>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM categories WHERE is_deleted = $1 \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, Category>(&sql)
            .bind(is_deleted)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM categories WHERE is_deleted = $1")
                .bind(is_deleted)
                .fetch_one(self.pool)
                .await?;

        Ok((rows, total.0))
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM categories WHERE slug = $1");
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    pub async fn insert(
        &self,
        id: CategoryId,
        name: &str,
        description: Option<&str>,
        slug: &str,
        created_by: UserId,
    ) -> Result<Category, RepositoryError> {
        let sql = format!(
            "INSERT INTO categories (id, name, description, slug, created_by, modified_by) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(slug)
            .bind(created_by)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("category name already exists".to_owned());
                }
                RepositoryError::Database(e)
            })
    }

    /// Update a category's name, description and slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id doesn't resolve and
    /// `RepositoryError::Conflict` if the new name is already taken.
    pub async fn update(
        &self,
        id: CategoryId,
        name: &str,
        description: Option<&str>,
        slug: &str,
        modified_by: UserId,
    ) -> Result<Category, RepositoryError> {
        let sql = format!(
            "UPDATE categories \
             SET name = $2, description = $3, slug = $4, modified_by = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(slug)
            .bind(modified_by)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("category name already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }

    /// Flip the soft-delete flag, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id doesn't resolve.
    pub async fn toggle_deleted(
        &self,
        id: CategoryId,
        modified_by: UserId,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(bool,)> = sqlx::query_as(
            "UPDATE categories \
             SET is_deleted = NOT is_deleted, modified_by = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING is_deleted",
        )
        .bind(id)
        .bind(modified_by)
        .fetch_optional(self.pool)
        .await?;

        row.map(|(deleted,)| deleted).ok_or(RepositoryError::NotFound)
    }
}
