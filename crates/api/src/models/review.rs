//! Review entity.

use orchard_core::{CustomerId, ProductId, ReviewId, Stamp};

/// A customer's review of a product.
///
/// At most one review exists per (customer, product) pair, enforced by a
/// unique index and surfaced as a duplicate-review error on violation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    /// Star rating, 1 through 5.
    pub rating: i32,
    pub comment: Option<String>,
    #[sqlx(flatten)]
    pub stamp: Stamp,
}
