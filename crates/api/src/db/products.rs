//! Product repository.

use sqlx::PgPool;

use orchard_core::{CategoryId, Price, ProductId, UserId};

use super::{PageRequest, RepositoryError};
use crate::models::Product;

const COLUMNS: &str = "id, name, description, price, available_quantity, image_url, \
                       slug, is_deleted, category_id, \
                       created_at, updated_at, created_by, modified_by";

/// Field values common to product insert and update.
///
/// Slug and image URL are passed separately: both embed the product id,
/// which the service derives before calling in.
#[derive(Debug, Clone)]
pub struct ProductFields<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: Price,
    pub available_quantity: i32,
    pub category_id: CategoryId,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products by soft-delete state, paginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_deleted(
        &self,
        is_deleted: bool,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM products WHERE is_deleted = $1 \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(is_deleted)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE is_deleted = $1")
            .bind(is_deleted)
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total.0))
    }

    /// List non-deleted products in a category, paginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM products \
             WHERE category_id = $1 AND is_deleted = FALSE \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM products WHERE category_id = $1 AND is_deleted = FALSE",
        )
        .bind(category_id)
        .fetch_one(self.pool)
        .await?;

        Ok((rows, total.0))
    }

    /// Case-insensitive name search over non-deleted products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn search_by_name(
        &self,
        name: &str,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        // Escape LIKE metacharacters so a search for "100%" matches literally
        let pattern = format!(
            "%{}%",
            name.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );

        let sql = format!(
            "SELECT {COLUMNS} FROM products \
             WHERE name ILIKE $1 AND is_deleted = FALSE \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM products WHERE name ILIKE $1 AND is_deleted = FALSE",
        )
        .bind(&pattern)
        .fetch_one(self.pool)
        .await?;

        Ok((rows, total.0))
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE slug = $1");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a new product.
    ///
    /// The caller generates the id upfront so the slug (`"{name-slug}-{id}"`)
    /// and the uploaded image path can embed it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        id: ProductId,
        fields: ProductFields<'_>,
        slug: &str,
        image_url: &str,
        created_by: UserId,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products \
             (id, name, description, price, available_quantity, image_url, slug, \
              category_id, created_by, modified_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(fields.name)
            .bind(fields.description)
            .bind(fields.price)
            .bind(fields.available_quantity)
            .bind(image_url)
            .bind(slug)
            .bind(fields.category_id)
            .bind(created_by)
            .fetch_one(self.pool)
            .await?;

        Ok(product)
    }

    /// Update a product; `image_url` is only overwritten when provided.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id doesn't resolve.
    pub async fn update(
        &self,
        id: ProductId,
        fields: ProductFields<'_>,
        slug: &str,
        image_url: Option<&str>,
        modified_by: UserId,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products \
             SET name = $2, description = $3, price = $4, available_quantity = $5, \
                 slug = $6, category_id = $7, modified_by = $8, \
                 image_url = COALESCE($9, image_url), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(fields.name)
            .bind(fields.description)
            .bind(fields.price)
            .bind(fields.available_quantity)
            .bind(slug)
            .bind(fields.category_id)
            .bind(modified_by)
            .bind(image_url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Flip the soft-delete flag, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id doesn't resolve.
    pub async fn toggle_deleted(
        &self,
        id: ProductId,
        modified_by: UserId,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(bool,)> = sqlx::query_as(
            "UPDATE products \
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
