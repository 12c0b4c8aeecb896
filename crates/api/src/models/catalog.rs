//! Catalog entities: categories, products, featured placements.

use chrono::NaiveDate;
use orchard_core::{
    Audit, CategoryId, DateWindow, FeaturedProductId, Price, ProductId, Stamp, WindowError,
};

/// A product category.
///
/// Categories own products (one-to-many) but deleting a category never
/// cascades; products keep their `category_id` and the category is only
/// ever soft-deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub is_deleted: bool,
    #[sqlx(flatten)]
    pub stamp: Stamp,
    #[sqlx(flatten)]
    pub audit: Audit,
}

/// A catalog product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Units currently in stock; cart additions check against this.
    pub available_quantity: i32,
    pub image_url: Option<String>,
    pub slug: String,
    pub is_deleted: bool,
    pub category_id: CategoryId,
    #[sqlx(flatten)]
    pub stamp: Stamp,
    #[sqlx(flatten)]
    pub audit: Audit,
}

/// A time-windowed promotional placement of a product.
///
/// For a given product, no two placements may have overlapping
/// `[start_date, end_date]` intervals; the repository enforces this
/// transactionally at write time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeaturedProduct {
    pub id: FeaturedProductId,
    pub product_id: ProductId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub stamp: Stamp,
    #[sqlx(flatten)]
    pub audit: Audit,
}

impl FeaturedProduct {
    /// The placement's date window.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError`] if the stored dates are inverted, which the
    /// CHECK constraint rules out for rows written by this application.
    pub fn window(&self) -> Result<DateWindow, WindowError> {
        DateWindow::new(self.start_date, self.end_date)
    }
}
