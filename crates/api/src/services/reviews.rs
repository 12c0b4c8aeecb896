//! Review service.

use serde::Serialize;
use sqlx::PgPool;

use orchard_core::{CustomerId, ProductId, ReviewId, Role};

use crate::db::{
    PageRequest, ProductRepository, RepositoryError, ReviewRepository, SortColumns,
};
use crate::models::Review;

/// Sortable columns for review listings.
pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &["rating", "created_at"],
    default: "created_at",
};

/// Valid rating range, inclusive.
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

/// Errors from review operations.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The review id doesn't resolve.
    #[error("review not found")]
    NotFound,

    /// The reviewed product doesn't resolve.
    #[error("product not found")]
    ProductNotFound,

    /// This customer already reviewed this product.
    #[error("product already reviewed")]
    Duplicate,

    /// The caller doesn't own this review.
    #[error("access denied")]
    AccessDenied,

    /// Rating outside 1..=5.
    #[error("rating must be between 1 and 5")]
    InvalidRating,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Count and share of one star level.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RatingCount {
    pub rating: i32,
    pub count: i64,
    pub percent: f64,
}

/// Aggregate review statistics for a product, five stars first.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewStatistic {
    pub count: i64,
    pub average_rating: f64,
    pub rating_counts: Vec<RatingCount>,
}

/// Review service.
pub struct ReviewService<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a review for a product.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::ProductNotFound`] for a bad product id,
    /// [`ReviewError::InvalidRating`] outside 1..=5, and
    /// [`ReviewError::Duplicate`] if this customer already reviewed the
    /// product.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, ReviewError> {
        validate_rating(rating)?;

        ProductRepository::new(self.pool)
            .get(product_id)
            .await?
            .ok_or(ReviewError::ProductNotFound)?;

        ReviewRepository::new(self.pool)
            .insert(ReviewId::generate(), customer_id, product_id, rating, comment)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ReviewError::Duplicate,
                other => ReviewError::Repository(other),
            })
    }

    /// Update a review. Only its author may edit it.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::NotFound`], [`ReviewError::AccessDenied`] or
    /// [`ReviewError::InvalidRating`].
    pub async fn update(
        &self,
        id: ReviewId,
        caller: CustomerId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, ReviewError> {
        validate_rating(rating)?;

        let reviews = ReviewRepository::new(self.pool);
        let review = reviews.get(id).await?.ok_or(ReviewError::NotFound)?;

        if review.customer_id != caller {
            return Err(ReviewError::AccessDenied);
        }

        let updated = reviews.update(id, rating, comment).await?;
        Ok(updated)
    }

    /// Delete a review. Admins may delete any review; customers only
    /// their own.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::NotFound`] or [`ReviewError::AccessDenied`].
    pub async fn delete(
        &self,
        id: ReviewId,
        caller_role: Role,
        caller: Option<CustomerId>,
    ) -> Result<(), ReviewError> {
        let reviews = ReviewRepository::new(self.pool);
        let review = reviews.get(id).await?.ok_or(ReviewError::NotFound)?;

        if !caller_role.is_admin() && caller != Some(review.customer_id) {
            return Err(ReviewError::AccessDenied);
        }

        reviews.delete(id).await?;
        Ok(())
    }

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::NotFound`] if the id doesn't resolve.
    pub async fn get(&self, id: ReviewId) -> Result<Review, ReviewError> {
        ReviewRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(ReviewError::NotFound)
    }

    /// A product's reviews, paginated.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::ProductNotFound`] for a bad product id.
    pub async fn list_by_product(
        &self,
        product_id: ProductId,
        page: PageRequest,
    ) -> Result<(Vec<Review>, i64), ReviewError> {
        ProductRepository::new(self.pool)
            .get(product_id)
            .await?
            .ok_or(ReviewError::ProductNotFound)?;

        let listed = ReviewRepository::new(self.pool)
            .list_by_product(product_id, page)
            .await?;
        Ok(listed)
    }

    /// The calling customer's reviews, paginated.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Repository` on query failure.
    pub async fn list_by_customer(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<(Vec<Review>, i64), ReviewError> {
        let listed = ReviewRepository::new(self.pool)
            .list_by_customer(customer_id, page)
            .await?;
        Ok(listed)
    }

    /// Every review, paginated (admin view).
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Repository` on query failure.
    pub async fn list_all(&self, page: PageRequest) -> Result<(Vec<Review>, i64), ReviewError> {
        let listed = ReviewRepository::new(self.pool).list_all(page).await?;
        Ok(listed)
    }

    /// Aggregate statistics for a product: count, average, and a 5-down-to-1
    /// star histogram with percentages.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::ProductNotFound`] for a bad product id.
    pub async fn statistics(&self, product_id: ProductId) -> Result<ReviewStatistic, ReviewError> {
        ProductRepository::new(self.pool)
            .get(product_id)
            .await?
            .ok_or(ReviewError::ProductNotFound)?;

        let stats = ReviewRepository::new(self.pool)
            .statistics(product_id)
            .await?;

        Ok(build_statistic(stats.count, stats.average_rating, stats.star_counts))
    }
}

fn validate_rating(rating: i32) -> Result<(), ReviewError> {
    if RATING_RANGE.contains(&rating) {
        Ok(())
    } else {
        Err(ReviewError::InvalidRating)
    }
}

/// Shape the raw counts into the response DTO, five stars first.
fn build_statistic(count: i64, average_rating: f64, star_counts: [i64; 5]) -> ReviewStatistic {
    #[allow(clippy::cast_precision_loss)] // review counts stay far below f64 precision
    let rating_counts = (1..=5)
        .rev()
        .map(|stars| {
            let star_count = star_counts
                .get(usize::try_from(stars - 1).unwrap_or(0))
                .copied()
                .unwrap_or(0);
            RatingCount {
                rating: stars,
                count: star_count,
                percent: if count == 0 {
                    0.0
                } else {
                    star_count as f64 / count as f64 * 100.0
                },
            }
        })
        .collect();

    ReviewStatistic {
        count,
        average_rating,
        rating_counts,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(matches!(validate_rating(0), Err(ReviewError::InvalidRating)));
        assert!(matches!(validate_rating(6), Err(ReviewError::InvalidRating)));
    }

    #[test]
    fn test_statistic_orders_five_stars_first() {
        let stat = build_statistic(10, 3.8, [1, 1, 2, 3, 3]);
        let ratings: Vec<i32> = stat.rating_counts.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_statistic_percentages() {
        let stat = build_statistic(4, 4.25, [0, 0, 1, 1, 2]);
        let five = stat.rating_counts.first().unwrap();
        assert_eq!(five.count, 2);
        assert_eq!(five.percent, 50.0);
    }

    #[test]
    fn test_statistic_empty_product() {
        let stat = build_statistic(0, 0.0, [0; 5]);
        assert_eq!(stat.count, 0);
        assert!(stat.rating_counts.iter().all(|r| r.percent == 0.0));
    }
}
