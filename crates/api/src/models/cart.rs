//! Cart entities.

use orchard_core::{CartId, CartItemId, CustomerId, Price, ProductId, Stamp};

/// A customer's cart. Exactly one exists per customer, created at
/// registration and never deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub customer_id: CustomerId,
    #[sqlx(flatten)]
    pub stamp: Stamp,
}

/// One (cart, product) line. The unique index on `(cart_id, product_id)`
/// guarantees at most one row per pair; duplicate adds merge quantities.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    #[sqlx(flatten)]
    pub stamp: Stamp,
}

/// A cart line joined with its product snapshot, for display listings.
///
/// Display-only: the snapshot reflects the product row at read time and is
/// not a stock reservation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartDetailRow {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub product_name: String,
    pub product_slug: String,
    pub unit_price: Price,
    pub image_url: Option<String>,
    pub available_quantity: i32,
}
