//! Cart reconciliation service.
//!
//! Maintains two invariants under concurrent requests: at most one cart
//! line per (cart, product), and no line quantity above the product's
//! available stock. Every mutation runs its read-check-write sequence in
//! one transaction with the product and line rows locked, so two
//! concurrent adds for the same cart+product serialize instead of both
//! passing the stock check.
//!
//! The quantity arithmetic itself is in the pure [`reconcile_add`] and
//! [`reconcile_update`] functions, tested without a database.

use sqlx::PgPool;

use orchard_core::{CartItemId, CustomerId, ProductId};

use crate::db::carts::{
    count_items_in_tx, delete_item, insert_item, lock_item, lock_stock, set_item_quantity,
};
use crate::db::{CartRepository, PageRequest, RepositoryError};
use crate::models::{Cart, CartDetailRow};

/// Errors from cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The product id doesn't resolve.
    #[error("product not found")]
    ProductNotFound,

    /// No cart line exists for this (cart, product) pair.
    #[error("cart item not found")]
    ItemNotFound,

    /// The requested quantity would exceed available stock.
    #[error("quantity exceeds available stock")]
    QuantityExceedsStock,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Decide the new line quantity for an add, merging into any existing
/// line and holding the stock ceiling.
///
/// # Errors
///
/// Returns [`CartError::QuantityExceedsStock`] when stock can't cover the
/// merged quantity.
pub const fn reconcile_add(
    existing: Option<i32>,
    requested: i32,
    stock: i32,
) -> Result<i32, CartError> {
    if stock < requested {
        return Err(CartError::QuantityExceedsStock);
    }

    match existing {
        None => Ok(requested),
        Some(current) => {
            if stock < current + requested {
                Err(CartError::QuantityExceedsStock)
            } else {
                Ok(current + requested)
            }
        }
    }
}

/// Decide the new line quantity for an update: overwrite, never add.
///
/// # Errors
///
/// Returns [`CartError::ItemNotFound`] when there is no line to update and
/// [`CartError::QuantityExceedsStock`] when stock can't cover the request.
pub const fn reconcile_update(
    existing: Option<i32>,
    requested: i32,
    stock: i32,
) -> Result<i32, CartError> {
    if existing.is_none() {
        return Err(CartError::ItemNotFound);
    }

    if stock < requested {
        return Err(CartError::QuantityExceedsStock);
    }

    Ok(requested)
}

/// Cart reconciliation service.
pub struct CartService<'a> {
    pool: &'a PgPool,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add `quantity` of a product to the customer's cart, merging into an
    /// existing line. Returns the distinct-item count after the write.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] or
    /// [`CartError::QuantityExceedsStock`].
    pub async fn add_to_cart(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<i64, CartError> {
        let cart = self.cart_of(customer_id).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let stock = lock_stock(&mut tx, product_id).await.map_err(|e| match e {
            RepositoryError::NotFound => CartError::ProductNotFound,
            other => CartError::Repository(other),
        })?;
        let existing = lock_item(&mut tx, cart.id, product_id).await?;

        let new_quantity = reconcile_add(
            existing.as_ref().map(|item| item.quantity),
            quantity,
            stock.available_quantity,
        )?;

        match existing {
            Some(item) => {
                set_item_quantity(&mut tx, item.id, new_quantity).await?;
            }
            None => {
                insert_item(
                    &mut tx,
                    CartItemId::generate(),
                    cart.id,
                    product_id,
                    new_quantity,
                )
                .await?;
            }
        }

        let count = count_items_in_tx(&mut tx, cart.id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(count)
    }

    /// Overwrite the line's quantity with `quantity`. Returns the
    /// distinct-item count after the write.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`], [`CartError::ItemNotFound`]
    /// or [`CartError::QuantityExceedsStock`].
    pub async fn update_cart(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<i64, CartError> {
        let cart = self.cart_of(customer_id).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let stock = lock_stock(&mut tx, product_id).await.map_err(|e| match e {
            RepositoryError::NotFound => CartError::ProductNotFound,
            other => CartError::Repository(other),
        })?;
        let existing = lock_item(&mut tx, cart.id, product_id).await?;

        let new_quantity = reconcile_update(
            existing.as_ref().map(|item| item.quantity),
            quantity,
            stock.available_quantity,
        )?;

        // reconcile_update guarantees existing is Some here
        let Some(item) = existing else {
            return Err(CartError::ItemNotFound);
        };
        set_item_quantity(&mut tx, item.id, new_quantity).await?;

        let count = count_items_in_tx(&mut tx, cart.id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(count)
    }

    /// Remove the lines for the given products, all-or-nothing: the whole
    /// batch runs in one transaction, and any product without a matching
    /// line rolls every deletion back. Returns the distinct-item count
    /// after the commit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if any product has no line in
    /// this cart.
    pub async fn remove_items(
        &self,
        customer_id: CustomerId,
        product_ids: &[ProductId],
    ) -> Result<i64, CartError> {
        let cart = self.cart_of(customer_id).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        for product_id in product_ids {
            let deleted = delete_item(&mut tx, cart.id, *product_id).await?;
            if !deleted {
                // Dropping the transaction rolls back prior deletions.
                return Err(CartError::ItemNotFound);
            }
        }

        let count = count_items_in_tx(&mut tx, cart.id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(count)
    }

    /// Paginated cart lines with product snapshots. Display-only: stock is
    /// not re-validated here.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on query failure.
    pub async fn cart_detail(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<(Vec<CartDetailRow>, i64), CartError> {
        let cart = self.cart_of(customer_id).await?;
        let detail = CartRepository::new(self.pool)
            .page_detail(cart.id, page)
            .await?;
        Ok(detail)
    }

    async fn cart_of(&self, customer_id: CustomerId) -> Result<Cart, CartError> {
        let cart = CartRepository::new(self.pool)
            .get_by_customer(customer_id)
            .await?;
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Properties from the cart reconciliation contract, exercised on the
    // pure decision functions.

    #[test]
    fn test_add_to_empty_cart() {
        assert!(matches!(reconcile_add(None, 3, 10), Ok(3)));
    }

    #[test]
    fn test_add_merges_quantities() {
        // add 3 then add 2 with stock 10 -> one line at 5
        let first = reconcile_add(None, 3, 10);
        assert!(matches!(first, Ok(3)));
        assert!(matches!(reconcile_add(Some(3), 2, 10), Ok(5)));
    }

    #[test]
    fn test_add_rejects_beyond_stock() {
        assert!(matches!(
            reconcile_add(None, 11, 10),
            Err(CartError::QuantityExceedsStock)
        ));
    }

    #[test]
    fn test_merge_rejects_beyond_stock_keeps_existing() {
        // stock 4, line at 3: adding 2 fails; the line stays at 3 because
        // the error propagates before any write.
        assert!(matches!(
            reconcile_add(Some(3), 2, 4),
            Err(CartError::QuantityExceedsStock)
        ));
    }

    #[test]
    fn test_merge_exactly_at_stock() {
        assert!(matches!(reconcile_add(Some(3), 7, 10), Ok(10)));
    }

    #[test]
    fn test_update_overwrites_not_adds() {
        // line at 3, update to 5 -> exactly 5, not 8
        assert!(matches!(reconcile_update(Some(3), 5, 10), Ok(5)));
    }

    #[test]
    fn test_update_can_lower_quantity() {
        assert!(matches!(reconcile_update(Some(8), 1, 10), Ok(1)));
    }

    #[test]
    fn test_update_requires_existing_line() {
        assert!(matches!(
            reconcile_update(None, 5, 10),
            Err(CartError::ItemNotFound)
        ));
    }

    #[test]
    fn test_update_rejects_beyond_stock() {
        assert!(matches!(
            reconcile_update(Some(3), 11, 10),
            Err(CartError::QuantityExceedsStock)
        ));
    }

    #[test]
    fn test_update_to_full_stock_allowed() {
        assert!(matches!(reconcile_update(Some(3), 10, 10), Ok(10)));
    }
}
