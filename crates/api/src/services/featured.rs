//! Featured-product scheduling service.
//!
//! Keeps the set of promotional windows per product non-overlapping and
//! answers the "featured right now" query. The overlap rule is the closed
//! interval predicate from [`DateWindow`]; the write-time race between two
//! concurrent creates for the same product is closed by the repository,
//! which locks the product row for the span of the check-then-write.

use chrono::NaiveDate;
use sqlx::PgPool;

use orchard_core::{DateWindow, FeaturedProductId, ProductId, UserId, WindowError};

use crate::db::featured::{get_in_tx, insert_in_tx, list_for_product, lock_product, update_in_tx};
use crate::db::{FeaturedProductRepository, PageRequest, RepositoryError, SortColumns};
use crate::models::FeaturedProduct;

/// Sortable columns for featured-product listings.
pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &["start_date", "end_date", "created_at"],
    default: "start_date",
};

/// Errors from featured-product operations.
#[derive(Debug, thiserror::Error)]
pub enum FeaturedError {
    /// The product being featured doesn't exist.
    #[error("product not found")]
    ProductNotFound,

    /// The placement id doesn't resolve.
    #[error("featured product not found")]
    NotFound,

    /// The requested window overlaps an existing placement for the same
    /// product.
    #[error("overlapping featured window")]
    Overlapping,

    /// The window itself is malformed (end before start).
    #[error(transparent)]
    InvalidWindow(#[from] WindowError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Check a candidate window against a product's existing placements,
/// optionally excluding one placement id (self-exclusion on update).
///
/// Returns the first conflicting placement, scanning in order. Placement
/// sets are a handful of windows per product, so a linear scan is the
/// right tool.
#[must_use]
pub fn find_conflict<'a>(
    placements: &'a [FeaturedProduct],
    candidate: DateWindow,
    exclude: Option<FeaturedProductId>,
) -> Option<&'a FeaturedProduct> {
    placements
        .iter()
        .filter(|p| exclude != Some(p.id))
        .find(|p| {
            p.window()
                .is_ok_and(|window| window.overlaps(&candidate))
        })
}

/// Featured-product scheduling service.
pub struct FeaturedService<'a> {
    pool: &'a PgPool,
}

impl<'a> FeaturedService<'a> {
    /// Create a new featured-product service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a placement for a product.
    ///
    /// # Errors
    ///
    /// Returns [`FeaturedError::ProductNotFound`] if `product_id` doesn't
    /// resolve, [`FeaturedError::InvalidWindow`] for an inverted window,
    /// and [`FeaturedError::Overlapping`] if an existing placement for
    /// this product shares a day with the requested window.
    pub async fn create(
        &self,
        product_id: ProductId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: Option<&str>,
        created_by: UserId,
    ) -> Result<FeaturedProduct, FeaturedError> {
        let window = DateWindow::new(start_date, end_date)?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        lock_product(&mut tx, product_id).await.map_err(|e| match e {
            RepositoryError::NotFound => FeaturedError::ProductNotFound,
            other => FeaturedError::Repository(other),
        })?;

        let placements = list_for_product(&mut tx, product_id).await?;
        if find_conflict(&placements, window, None).is_some() {
            // Dropping the transaction releases the product lock.
            return Err(FeaturedError::Overlapping);
        }

        let saved = insert_in_tx(
            &mut tx,
            FeaturedProductId::generate(),
            product_id,
            window,
            description,
            created_by,
        )
        .await?;

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(saved)
    }

    /// Re-schedule a placement. The placement is excluded from its own
    /// overlap check, so updating it to the window it already occupies
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`FeaturedError::NotFound`] if `id` doesn't resolve, plus
    /// the same window errors as [`Self::create`].
    pub async fn update(
        &self,
        id: FeaturedProductId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: Option<&str>,
        modified_by: UserId,
    ) -> Result<FeaturedProduct, FeaturedError> {
        let window = DateWindow::new(start_date, end_date)?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let existing = get_in_tx(&mut tx, id).await.map_err(|e| match e {
            RepositoryError::NotFound => FeaturedError::NotFound,
            other => FeaturedError::Repository(other),
        })?;

        lock_product(&mut tx, existing.product_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => FeaturedError::ProductNotFound,
                other => FeaturedError::Repository(other),
            })?;

        let placements = list_for_product(&mut tx, existing.product_id).await?;
        if find_conflict(&placements, window, Some(id)).is_some() {
            return Err(FeaturedError::Overlapping);
        }

        let saved = update_in_tx(&mut tx, id, window, description, modified_by).await?;

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(saved)
    }

    /// Delete a placement. No side effects on the product.
    ///
    /// # Errors
    ///
    /// Returns [`FeaturedError::NotFound`] if `id` doesn't resolve.
    pub async fn delete(&self, id: FeaturedProductId) -> Result<(), FeaturedError> {
        FeaturedProductRepository::new(self.pool)
            .delete(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => FeaturedError::NotFound,
                other => FeaturedError::Repository(other),
            })
    }

    /// Get a placement by id.
    ///
    /// # Errors
    ///
    /// Returns [`FeaturedError::NotFound`] if `id` doesn't resolve.
    pub async fn get(&self, id: FeaturedProductId) -> Result<FeaturedProduct, FeaturedError> {
        FeaturedProductRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(FeaturedError::NotFound)
    }

    /// Every placement, paginated (admin view; soft-deleted products
    /// included so their schedules stay auditable).
    ///
    /// # Errors
    ///
    /// Returns `FeaturedError::Repository` on query failure.
    pub async fn list_all(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<FeaturedProduct>, i64), FeaturedError> {
        let listed = FeaturedProductRepository::new(self.pool)
            .list_all(page)
            .await?;
        Ok(listed)
    }

    /// Placements active on `now` whose product is visible.
    ///
    /// # Errors
    ///
    /// Returns `FeaturedError::Repository` on query failure.
    pub async fn list_active(
        &self,
        now: NaiveDate,
        page: PageRequest,
    ) -> Result<(Vec<FeaturedProduct>, i64), FeaturedError> {
        let listed = FeaturedProductRepository::new(self.pool)
            .list_active(now, page)
            .await?;
        Ok(listed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orchard_core::{Audit, Stamp};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn placement(product: ProductId, start: NaiveDate, end: NaiveDate) -> FeaturedProduct {
        let admin = UserId::generate();
        FeaturedProduct {
            id: FeaturedProductId::generate(),
            product_id: product,
            start_date: start,
            end_date: end,
            description: None,
            stamp: Stamp::new(Utc::now()),
            audit: Audit::created_by(admin),
        }
    }

    #[test]
    fn test_scenario_from_scheduling_contract() {
        // [Jan 1, Jan 10] exists; [Jan 5, Jan 15] conflicts;
        // [Jan 11, Jan 20] fits; [Jan 10, Jan 20] touches the boundary
        // day and conflicts.
        let product = ProductId::generate();
        let existing = vec![placement(product, day(2024, 1, 1), day(2024, 1, 10))];

        let overlapping = DateWindow::new(day(2024, 1, 5), day(2024, 1, 15)).unwrap();
        assert!(find_conflict(&existing, overlapping, None).is_some());

        let adjacent = DateWindow::new(day(2024, 1, 11), day(2024, 1, 20)).unwrap();
        assert!(find_conflict(&existing, adjacent, None).is_none());

        let boundary = DateWindow::new(day(2024, 1, 10), day(2024, 1, 20)).unwrap();
        assert!(find_conflict(&existing, boundary, None).is_some());
    }

    #[test]
    fn test_conflict_detection_order_independent() {
        let product = ProductId::generate();
        let a = placement(product, day(2024, 1, 1), day(2024, 1, 10));
        let b_window = DateWindow::new(day(2024, 1, 5), day(2024, 1, 15)).unwrap();
        let b = placement(product, b_window.start(), b_window.end());
        let a_window = a.window().unwrap();

        // Whichever placement lands first, the other is rejected.
        assert!(find_conflict(std::slice::from_ref(&a), b_window, None).is_some());
        assert!(find_conflict(std::slice::from_ref(&b), a_window, None).is_some());
    }

    #[test]
    fn test_self_exclusion_allows_identical_window() {
        let product = ProductId::generate();
        let existing = placement(product, day(2024, 3, 1), day(2024, 3, 15));
        let same_window = existing.window().unwrap();

        let all = vec![existing.clone()];
        assert!(find_conflict(&all, same_window, Some(existing.id)).is_none());
        // Without self-exclusion the same check must conflict.
        assert!(find_conflict(&all, same_window, None).is_some());
    }

    #[test]
    fn test_conflict_against_multiple_placements() {
        let product = ProductId::generate();
        let all = vec![
            placement(product, day(2024, 1, 1), day(2024, 1, 5)),
            placement(product, day(2024, 2, 1), day(2024, 2, 5)),
            placement(product, day(2024, 3, 1), day(2024, 3, 5)),
        ];

        let gap = DateWindow::new(day(2024, 1, 10), day(2024, 1, 20)).unwrap();
        assert!(find_conflict(&all, gap, None).is_none());

        let hits_middle = DateWindow::new(day(2024, 2, 3), day(2024, 2, 10)).unwrap();
        let conflict = find_conflict(&all, hits_middle, None).unwrap();
        assert_eq!(conflict.start_date, day(2024, 2, 1));
    }
}
