//! Cart repository.
//!
//! The add/update/remove flows are read-check-write sequences, so the
//! row-reading helpers here take a caller-owned transaction and lock what
//! they read (`FOR UPDATE`). The cart service decides what the new
//! quantity should be; this module only moves rows.

use sqlx::{PgPool, Postgres, Transaction};

use orchard_core::{CartId, CartItemId, CustomerId, ProductId};

use super::{PageRequest, RepositoryError};
use crate::models::{Cart, CartDetailRow, CartItem};

const ITEM_COLUMNS: &str = "id, cart_id, product_id, quantity, created_at, updated_at";

/// Product stock facts read under lock during cart reconciliation.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct LockedStock {
    pub available_quantity: i32,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer's cart.
    ///
    /// Every customer gets a cart at registration; a missing row means the
    /// customer id itself is stale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no cart.
    pub async fn get_by_customer(&self, customer_id: CustomerId) -> Result<Cart, RepositoryError> {
        sqlx::query_as::<_, Cart>(
            "SELECT id, customer_id, created_at, updated_at FROM carts WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Number of distinct items in a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_items(&self, cart_id: CartId) -> Result<i64, RepositoryError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .fetch_one(self.pool)
            .await?;
        Ok(total.0)
    }

    /// Paginated cart lines with product snapshots, for display.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn page_detail(
        &self,
        cart_id: CartId,
        page: PageRequest,
    ) -> Result<(Vec<CartDetailRow>, i64), RepositoryError> {
        let sql = format!(
            "SELECT ci.id, ci.product_id, ci.quantity, \
                    p.name AS product_name, p.slug AS product_slug, \
                    p.price AS unit_price, p.image_url, p.available_quantity \
             FROM cart_items ci \
             JOIN products p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.order_by_aliased("ci")
        );
        let rows = sqlx::query_as::<_, CartDetailRow>(&sql)
            .bind(cart_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total = self.count_items(cart_id).await?;
        Ok((rows, total))
    }
}

// =============================================================================
// Transactional helpers (caller owns the transaction)
// =============================================================================

/// Lock the product row and read its stock.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
pub async fn lock_stock(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<LockedStock, RepositoryError> {
    sqlx::query_as::<_, LockedStock>(
        "SELECT available_quantity FROM products WHERE id = $1 FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Lock and fetch the (cart, product) line if one exists.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_item(
    tx: &mut Transaction<'_, Postgres>,
    cart_id: CartId,
    product_id: ProductId,
) -> Result<Option<CartItem>, RepositoryError> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM cart_items \
         WHERE cart_id = $1 AND product_id = $2 FOR UPDATE"
    );
    let row = sqlx::query_as::<_, CartItem>(&sql)
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row)
}

/// Insert a fresh cart line.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if a line for this (cart, product)
/// pair already exists - only reachable if the caller skipped `lock_item`.
pub async fn insert_item(
    tx: &mut Transaction<'_, Postgres>,
    id: CartItemId,
    cart_id: CartId,
    product_id: ProductId,
    quantity: i32,
) -> Result<CartItem, RepositoryError> {
    let sql = format!(
        "INSERT INTO cart_items (id, cart_id, product_id, quantity) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {ITEM_COLUMNS}"
    );
    sqlx::query_as::<_, CartItem>(&sql)
        .bind(id)
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("cart already has this product".to_owned());
            }
            RepositoryError::Database(e)
        })
}

/// Overwrite a cart line's quantity.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the line vanished.
pub async fn set_item_quantity(
    tx: &mut Transaction<'_, Postgres>,
    item_id: CartItemId,
    quantity: i32,
) -> Result<CartItem, RepositoryError> {
    let sql = format!(
        "UPDATE cart_items SET quantity = $2, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {ITEM_COLUMNS}"
    );
    sqlx::query_as::<_, CartItem>(&sql)
        .bind(item_id)
        .bind(quantity)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Delete the (cart, product) line, reporting whether one existed.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete_item(
    tx: &mut Transaction<'_, Postgres>,
    cart_id: CartId,
    product_id: ProductId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
        .bind(cart_id)
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Distinct-item count, readable inside an open transaction so the count
/// returned to the client reflects the writes about to commit.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn count_items_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    cart_id: CartId,
) -> Result<i64, RepositoryError> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE cart_id = $1")
        .bind(cart_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(total.0)
}
