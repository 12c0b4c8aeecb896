//! Product and featured-placement route handlers.
//!
//! Create/update take multipart bodies: a `product` part carrying the
//! JSON payload and an `image` file part (optional on update).

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::{CategoryId, FeaturedProductId, Price, ProductId, UserId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{FeaturedProduct, Product};
use crate::response::{ApiResponse, PageResponse, messages};
use crate::services::featured::{self, FeaturedService};
use crate::services::products::{self, ProductInput, ProductService};
use crate::services::upload::ImageFile;
use crate::state::AppState;

use super::ListQuery;

// =============================================================================
// Payloads & views
// =============================================================================

/// Product fields accepted by create and update (the JSON multipart part).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub available_quantity: i32,
    pub category_id: CategoryId,
}

impl ProductPayload {
    fn validate(&self) -> Result<ValidatedProduct<'_>> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_owned()));
        }
        if self.available_quantity < 0 {
            return Err(AppError::Validation(
                "available quantity must be zero or more".to_owned(),
            ));
        }
        let price = Price::new(self.price)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(ValidatedProduct {
            payload: self,
            price,
        })
    }
}

struct ValidatedProduct<'a> {
    payload: &'a ProductPayload,
    price: Price,
}

impl ValidatedProduct<'_> {
    fn input(&self) -> ProductInput<'_> {
        ProductInput {
            name: &self.payload.name,
            description: &self.payload.description,
            price: self.price,
            available_quantity: self.payload.available_quantity,
            category_id: self.payload.category_id,
        }
    }
}

/// Public product view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub available_quantity: i32,
    pub image_url: Option<String>,
    pub slug: String,
    pub category_id: CategoryId,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            available_quantity: p.available_quantity,
            image_url: p.image_url,
            slug: p.slug,
            category_id: p.category_id,
        }
    }
}

/// Admin product view, with soft-delete state and audit trail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAdminView {
    #[serde(flatten)]
    pub product: ProductView,
    pub is_deleted: bool,
    pub created_by: UserId,
    pub modified_by: UserId,
}

impl From<Product> for ProductAdminView {
    fn from(p: Product) -> Self {
        let is_deleted = p.is_deleted;
        let created_by = p.audit.created_by;
        let modified_by = p.audit.modified_by;
        Self {
            product: ProductView::from(p),
            is_deleted,
            created_by,
            modified_by,
        }
    }
}

/// Featured placement payload for create.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeaturedPayload {
    pub product_id: ProductId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
}

/// Featured placement payload for update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeaturedPayload {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
}

/// Featured placement view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedView {
    pub id: FeaturedProductId,
    pub product_id: ProductId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
}

impl From<FeaturedProduct> for FeaturedView {
    fn from(f: FeaturedProduct) -> Self {
        Self {
            id: f.id,
            product_id: f.product_id,
            start_date: f.start_date,
            end_date: f.end_date,
            description: f.description,
        }
    }
}

/// The `product` + `image` parts of a multipart body.
struct ProductParts {
    payload: ProductPayload,
    image: Option<ImageFile>,
}

/// Read the multipart body, validating the image part if present.
async fn read_product_parts(mut multipart: Multipart) -> Result<ProductParts> {
    let mut payload: Option<ProductPayload> = None;
    let mut image: Option<ImageFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("product") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                payload = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| AppError::Validation(e.to_string()))?,
                );
            }
            Some("image") => {
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                image = Some(ImageFile::validate(
                    content_type.as_deref(),
                    bytes.to_vec(),
                )?);
            }
            _ => {}
        }
    }

    let payload =
        payload.ok_or_else(|| AppError::Validation("missing product part".to_owned()))?;

    Ok(ProductParts { payload, image })
}

// =============================================================================
// Product handlers
// =============================================================================

/// Active products, paginated (public).
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(products::SORT_COLUMNS)?;
    let (rows, total) = ProductService::new(state.pool(), state.uploads())
        .list(false, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(ProductView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Soft-deleted products, paginated (ADMIN).
#[instrument(skip(state, _admin))]
pub async fn hidden(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(products::SORT_COLUMNS)?;
    let (rows, total) = ProductService::new(state.pool(), state.uploads())
        .list(true, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(ProductAdminView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Name-search query string (pagination params ride separately).
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: String,
}

/// Search visible products by name (public).
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(search_query): Query<SearchQuery>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(products::SORT_COLUMNS)?;
    let (rows, total) = ProductService::new(state.pool(), state.uploads())
        .search(&search_query.name, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(ProductView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Product by id (public).
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductService::new(state.pool(), state.uploads())
        .get(id)
        .await?;
    Ok(Json(ApiResponse::new(
        messages::FOUND,
        ProductView::from(product),
    )))
}

/// Product by slug (public).
#[instrument(skip(state))]
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let product = ProductService::new(state.pool(), state.uploads())
        .get_by_slug(&slug)
        .await?;
    Ok(Json(ApiResponse::new(
        messages::FOUND,
        ProductView::from(product),
    )))
}

/// Visible products in a category (public).
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(products::SORT_COLUMNS)?;
    let (rows, total) = ProductService::new(state.pool(), state.uploads())
        .list_by_category(category_id, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(ProductView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Create a product with its image (ADMIN, multipart).
#[instrument(skip(state, admin, multipart), fields(admin = %admin.0.user.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let parts = read_product_parts(multipart).await?;
    let validated = parts.payload.validate()?;
    let image = parts
        .image
        .ok_or_else(|| AppError::Validation("missing image part".to_owned()))?;

    let product = ProductService::new(state.pool(), state.uploads())
        .create(validated.input(), image, admin.0.user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            messages::CREATED,
            ProductAdminView::from(product),
        )),
    ))
}

/// Update a product; image part optional (ADMIN, multipart).
#[instrument(skip(state, admin, multipart), fields(admin = %admin.0.user.id))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let parts = read_product_parts(multipart).await?;
    let validated = parts.payload.validate()?;

    let product = ProductService::new(state.pool(), state.uploads())
        .update(id, validated.input(), parts.image, admin.0.user.id)
        .await?;

    Ok(Json(ApiResponse::new(
        messages::UPDATED,
        ProductAdminView::from(product),
    )))
}

/// Flip a product's soft-delete flag (ADMIN). Data payload is the new
/// flag value.
#[instrument(skip(state, admin), fields(admin = %admin.0.user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let deleted = ProductService::new(state.pool(), state.uploads())
        .toggle(id, admin.0.user.id)
        .await?;
    Ok(Json(ApiResponse::new(messages::UPDATED, deleted)))
}

// =============================================================================
// Featured placement handlers
// =============================================================================

/// Schedule a placement (ADMIN).
#[instrument(skip(state, admin), fields(admin = %admin.0.user.id))]
pub async fn feature_create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(payload): Json<CreateFeaturedPayload>,
) -> Result<impl IntoResponse> {
    let placement = FeaturedService::new(state.pool())
        .create(
            payload.product_id,
            payload.start_date,
            payload.end_date,
            payload.description.as_deref(),
            admin.0.user.id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            messages::CREATED,
            FeaturedView::from(placement),
        )),
    ))
}

/// Every placement, paginated (ADMIN).
#[instrument(skip(state, _admin))]
pub async fn feature_index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(featured::SORT_COLUMNS)?;
    let (rows, total) = FeaturedService::new(state.pool()).list_all(page).await?;

    let body = PageResponse::new(rows, &page, total).map(FeaturedView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Placements active today whose product is visible (public).
#[instrument(skip(state))]
pub async fn feature_active(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(featured::SORT_COLUMNS)?;
    let today = Utc::now().date_naive();
    let (rows, total) = FeaturedService::new(state.pool())
        .list_active(today, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(FeaturedView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Placement by id (public).
#[instrument(skip(state))]
pub async fn feature_show(
    State(state): State<AppState>,
    Path(id): Path<FeaturedProductId>,
) -> Result<impl IntoResponse> {
    let placement = FeaturedService::new(state.pool()).get(id).await?;
    Ok(Json(ApiResponse::new(
        messages::FOUND,
        FeaturedView::from(placement),
    )))
}

/// Re-schedule a placement (ADMIN). The placement is excluded from its
/// own overlap check.
#[instrument(skip(state, admin), fields(admin = %admin.0.user.id))]
pub async fn feature_update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<FeaturedProductId>,
    Json(payload): Json<UpdateFeaturedPayload>,
) -> Result<impl IntoResponse> {
    let placement = FeaturedService::new(state.pool())
        .update(
            id,
            payload.start_date,
            payload.end_date,
            payload.description.as_deref(),
            admin.0.user.id,
        )
        .await?;

    Ok(Json(ApiResponse::new(
        messages::UPDATED,
        FeaturedView::from(placement),
    )))
}

/// Remove a placement (ADMIN).
#[instrument(skip(state, _admin))]
pub async fn feature_delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<FeaturedProductId>,
) -> Result<impl IntoResponse> {
    FeaturedService::new(state.pool()).delete(id).await?;
    Ok(Json(ApiResponse::empty(messages::DELETED)))
}
