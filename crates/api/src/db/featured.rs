//! Featured-product repository.
//!
//! The non-overlap invariant is enforced by the featured service, which
//! runs check-then-write inside one transaction using the helpers here:
//! [`lock_product`] serializes concurrent writers for the same product,
//! [`list_for_product`] reads the candidate set the overlap scan runs
//! over. A unique index on `(product_id, start_date, end_date)` backstops
//! the exact-duplicate case.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use orchard_core::{DateWindow, FeaturedProductId, ProductId, UserId};

use super::{PageRequest, RepositoryError};
use crate::models::FeaturedProduct;

const COLUMNS: &str = "id, product_id, start_date, end_date, description, \
                       created_at, updated_at, created_by, modified_by";

/// Repository for featured-product database operations.
pub struct FeaturedProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeaturedProductRepository<'a> {
    /// Create a new featured-product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a placement by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: FeaturedProductId,
    ) -> Result<Option<FeaturedProduct>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM featured_products WHERE id = $1");
        let row = sqlx::query_as::<_, FeaturedProduct>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Delete a placement. No side effects on the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id doesn't resolve.
    pub async fn delete(&self, id: FeaturedProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM featured_products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List every placement, paginated. Admin view: no date filter, and
    /// placements of soft-deleted products are included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<FeaturedProduct>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM featured_products \
             ORDER BY {} LIMIT $1 OFFSET $2",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, FeaturedProduct>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM featured_products")
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total.0))
    }

    /// List placements active on `now` whose product is not soft-deleted,
    /// paginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_active(
        &self,
        now: NaiveDate,
        page: PageRequest,
    ) -> Result<(Vec<FeaturedProduct>, i64), RepositoryError> {
        let sql = format!(
            "SELECT f.id, f.product_id, f.start_date, f.end_date, f.description, \
                    f.created_at, f.updated_at, f.created_by, f.modified_by \
             FROM featured_products f \
             JOIN products p ON p.id = f.product_id \
             WHERE f.start_date <= $1 AND $1 <= f.end_date AND p.is_deleted = FALSE \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by_aliased("f")
        );
        let rows = sqlx::query_as::<_, FeaturedProduct>(&sql)
            .bind(now)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM featured_products f \
             JOIN products p ON p.id = f.product_id \
             WHERE f.start_date <= $1 AND $1 <= f.end_date AND p.is_deleted = FALSE",
        )
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok((rows, total.0))
    }
}

// =============================================================================
// Transactional helpers (caller owns the transaction)
// =============================================================================

/// Lock the product row, serializing concurrent featured writes for the
/// same product.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
pub async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<(), RepositoryError> {
    let locked: Option<(ProductId,)> =
        sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

    if locked.is_none() {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Fetch a placement inside the transaction.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the id doesn't resolve.
pub async fn get_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: FeaturedProductId,
) -> Result<FeaturedProduct, RepositoryError> {
    let sql = format!("SELECT {COLUMNS} FROM featured_products WHERE id = $1");
    sqlx::query_as::<_, FeaturedProduct>(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// All placements for one product - the candidate set the overlap scan
/// runs over. A product carries a handful of windows at most, so no
/// pagination.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_for_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<Vec<FeaturedProduct>, RepositoryError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM featured_products \
         WHERE product_id = $1 ORDER BY start_date"
    );
    let rows = sqlx::query_as::<_, FeaturedProduct>(&sql)
        .bind(product_id)
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows)
}

/// Insert a placement inside the transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the exact window already exists
/// for this product (unique-index backstop).
pub async fn insert_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: FeaturedProductId,
    product_id: ProductId,
    window: DateWindow,
    description: Option<&str>,
    created_by: UserId,
) -> Result<FeaturedProduct, RepositoryError> {
    let sql = format!(
        "INSERT INTO featured_products \
         (id, product_id, start_date, end_date, description, created_by, modified_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) \
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, FeaturedProduct>(&sql)
        .bind(id)
        .bind(product_id)
        .bind(window.start())
        .bind(window.end())
        .bind(description)
        .bind(created_by)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "identical featured window already exists".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })
}

/// Rewrite a placement's window and description inside the transaction.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the id doesn't resolve.
pub async fn update_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: FeaturedProductId,
    window: DateWindow,
    description: Option<&str>,
    modified_by: UserId,
) -> Result<FeaturedProduct, RepositoryError> {
    let sql = format!(
        "UPDATE featured_products \
         SET start_date = $2, end_date = $3, description = $4, \
             modified_by = $5, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, FeaturedProduct>(&sql)
        .bind(id)
        .bind(window.start())
        .bind(window.end())
        .bind(description)
        .bind(modified_by)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::NotFound)
}
