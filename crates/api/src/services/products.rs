//! Product catalog service.

use sqlx::PgPool;

use orchard_core::{CategoryId, Price, ProductId, UserId, slug::slugify};

use crate::db::products::ProductFields;
use crate::db::{
    CategoryRepository, PageRequest, ProductRepository, RepositoryError, SortColumns,
};
use crate::models::Product;
use crate::services::upload::{ImageFile, UploadError, UploadService};

/// Sortable columns for product listings.
pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &["name", "price", "created_at", "available_quantity"],
    default: "name",
};

/// Errors from product operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// The product id or slug doesn't resolve.
    #[error("product not found")]
    NotFound,

    /// The referenced category doesn't resolve.
    #[error("category not found")]
    CategoryNotFound,

    /// Image validation or blob-store upload failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Product details accepted by create and update.
#[derive(Debug, Clone)]
pub struct ProductInput<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: Price,
    pub available_quantity: i32,
    pub category_id: CategoryId,
}

/// Product catalog service.
pub struct ProductService<'a> {
    pool: &'a PgPool,
    uploads: &'a UploadService,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, uploads: &'a UploadService) -> Self {
        Self { pool, uploads }
    }

    /// List products by soft-delete state (`false` is the public listing,
    /// `true` the admin "hidden" view).
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` on query failure.
    pub async fn list(
        &self,
        is_deleted: bool,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), ProductError> {
        let listed = ProductRepository::new(self.pool)
            .list_by_deleted(is_deleted, page)
            .await?;
        Ok(listed)
    }

    /// List visible products in a category.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::CategoryNotFound`] if the category doesn't
    /// resolve.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), ProductError> {
        CategoryRepository::new(self.pool)
            .get(category_id)
            .await?
            .ok_or(ProductError::CategoryNotFound)?;

        let listed = ProductRepository::new(self.pool)
            .list_by_category(category_id, page)
            .await?;
        Ok(listed)
    }

    /// Case-insensitive name search over visible products.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` on query failure.
    pub async fn search(
        &self,
        name: &str,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), ProductError> {
        let listed = ProductRepository::new(self.pool)
            .search_by_name(name, page)
            .await?;
        Ok(listed)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] if the id doesn't resolve.
    pub async fn get(&self, id: ProductId) -> Result<Product, ProductError> {
        ProductRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] if the slug doesn't resolve.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Product, ProductError> {
        ProductRepository::new(self.pool)
            .get_by_slug(slug)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Create a product with its image.
    ///
    /// The image is validated and uploaded first; the row is only written
    /// once the blob store has accepted the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::CategoryNotFound`] for a bad category and
    /// [`ProductError::Upload`] for image problems.
    pub async fn create(
        &self,
        input: ProductInput<'_>,
        image: ImageFile,
        created_by: UserId,
    ) -> Result<Product, ProductError> {
        CategoryRepository::new(self.pool)
            .get(input.category_id)
            .await?
            .ok_or(ProductError::CategoryNotFound)?;

        let id = ProductId::generate();
        let image_url = self.uploads.upload_product_image(id, &image).await?;
        let slug = format!("{}-{id}", slugify(input.name));

        let product = ProductRepository::new(self.pool)
            .insert(
                id,
                ProductFields {
                    name: input.name,
                    description: input.description,
                    price: input.price,
                    available_quantity: input.available_quantity,
                    category_id: input.category_id,
                },
                &slug,
                &image_url,
                created_by,
            )
            .await?;

        Ok(product)
    }

    /// Update a product; the image is optional and only replaced when a
    /// new one is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`], [`ProductError::CategoryNotFound`]
    /// or [`ProductError::Upload`].
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput<'_>,
        image: Option<ImageFile>,
        modified_by: UserId,
    ) -> Result<Product, ProductError> {
        CategoryRepository::new(self.pool)
            .get(input.category_id)
            .await?
            .ok_or(ProductError::CategoryNotFound)?;

        let image_url = match image {
            Some(image) => Some(self.uploads.upload_product_image(id, &image).await?),
            None => None,
        };
        let slug = format!("{}-{id}", slugify(input.name));

        ProductRepository::new(self.pool)
            .update(
                id,
                ProductFields {
                    name: input.name,
                    description: input.description,
                    price: input.price,
                    available_quantity: input.available_quantity,
                    category_id: input.category_id,
                },
                &slug,
                image_url.as_deref(),
                modified_by,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ProductError::NotFound,
                other => ProductError::Repository(other),
            })
    }

    /// Flip the soft-delete flag, returning the new value. Toggling twice
    /// restores the original visibility.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] if the id doesn't resolve.
    pub async fn toggle(&self, id: ProductId, modified_by: UserId) -> Result<bool, ProductError> {
        ProductRepository::new(self.pool)
            .toggle_deleted(id, modified_by)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ProductError::NotFound,
                other => ProductError::Repository(other),
            })
    }
}
