//! Review repository.

use sqlx::PgPool;

use orchard_core::{CustomerId, ProductId, ReviewId};

use super::{PageRequest, RepositoryError};
use crate::models::Review;

const COLUMNS: &str = "id, customer_id, product_id, rating, comment, created_at, updated_at";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        let row = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if this customer has already
    /// reviewed this product (unique index on the pair).
    pub async fn insert(
        &self,
        id: ReviewId,
        customer_id: CustomerId,
        product_id: ProductId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let sql = format!(
            "INSERT INTO reviews (id, customer_id, product_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(customer_id)
            .bind(product_id)
            .bind(rating)
            .bind(comment)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "product already reviewed by this customer".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })
    }

    /// Update a review's rating and comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id doesn't resolve.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let sql = format!(
            "UPDATE reviews SET rating = $2, comment = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(rating)
            .bind(comment)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id doesn't resolve.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List a product's reviews, paginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_product(
        &self,
        product_id: ProductId,
        page: PageRequest,
    ) -> Result<(Vec<Review>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM reviews WHERE product_id = $1 \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, Review>(&sql)
            .bind(product_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total.0))
    }

    /// List a customer's reviews, paginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_customer(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<(Vec<Review>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM reviews WHERE customer_id = $1 \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, Review>(&sql)
            .bind(customer_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total.0))
    }

    /// List every review, paginated (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<Review>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM reviews ORDER BY {} LIMIT $1 OFFSET $2",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, Review>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total.0))
    }

    /// Count, average rating, and per-star counts for a product, in one
    /// pass over its reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn statistics(
        &self,
        product_id: ProductId,
    ) -> Result<ReviewStats, RepositoryError> {
        let row: (i64, Option<f64>, i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    AVG(rating)::float8, \
                    COUNT(*) FILTER (WHERE rating = 1), \
                    COUNT(*) FILTER (WHERE rating = 2), \
                    COUNT(*) FILTER (WHERE rating = 3), \
                    COUNT(*) FILTER (WHERE rating = 4), \
                    COUNT(*) FILTER (WHERE rating = 5) \
             FROM reviews WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(ReviewStats {
            count: row.0,
            average_rating: row.1.unwrap_or(0.0),
            star_counts: [row.2, row.3, row.4, row.5, row.6],
        })
    }
}

/// Aggregate review numbers for one product.
#[derive(Debug, Clone, Copy)]
pub struct ReviewStats {
    pub count: i64,
    pub average_rating: f64,
    /// Counts for 1..=5 stars, index 0 holding one-star reviews.
    pub star_counts: [i64; 5],
}
