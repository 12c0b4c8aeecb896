//! Cart route handlers (USER role).

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::{CartItemId, Price, ProductId};

use crate::db::SortColumns;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::CartDetailRow;
use crate::response::{ApiResponse, PageResponse, messages};
use crate::services::cart::CartService;
use crate::state::AppState;

use super::ListQuery;

/// Sortable columns for the cart detail listing.
const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &["created_at", "quantity"],
    default: "created_at",
};

/// Add/update cart item request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPayload {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Remove cart items request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemsPayload {
    pub product_ids: Vec<ProductId>,
}

/// Distinct-item count returned by every cart mutation.
#[derive(Debug, Serialize)]
pub struct CartQuantityView {
    pub count: i64,
}

/// One cart line with its product snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub quantity: i32,
    pub unit_price: Price,
    pub line_price: Price,
    pub image_url: Option<String>,
    pub available_quantity: i32,
}

impl From<CartDetailRow> for CartLineView {
    fn from(row: CartDetailRow) -> Self {
        let quantity = u32::try_from(row.quantity).unwrap_or(0);
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_slug: row.product_slug,
            quantity: row.quantity,
            unit_price: row.unit_price,
            line_price: row.unit_price.extended(quantity),
            image_url: row.image_url,
            available_quantity: row.available_quantity,
        }
    }
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity >= 1 {
        Ok(())
    } else {
        Err(AppError::Validation(
            "quantity must be at least 1".to_owned(),
        ))
    }
}

/// Add an item to the caller's cart, merging into an existing line.
#[instrument(skip(state, current), fields(user = %current.user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(payload): Json<CartItemPayload>,
) -> Result<impl IntoResponse> {
    validate_quantity(payload.quantity)?;
    let customer_id = current.customer_id(&state).await?;

    let count = CartService::new(state.pool())
        .add_to_cart(customer_id, payload.product_id, payload.quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(messages::CREATED, CartQuantityView { count })),
    ))
}

/// Paginated cart detail with product snapshots.
#[instrument(skip(state, current), fields(user = %current.user.id))]
pub async fn detail(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(SORT_COLUMNS)?;
    let customer_id = current.customer_id(&state).await?;

    let (rows, total) = CartService::new(state.pool())
        .cart_detail(customer_id, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(CartLineView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Overwrite a line's quantity (never adds).
#[instrument(skip(state, current), fields(user = %current.user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(payload): Json<CartItemPayload>,
) -> Result<impl IntoResponse> {
    validate_quantity(payload.quantity)?;
    let customer_id = current.customer_id(&state).await?;

    let count = CartService::new(state.pool())
        .update_cart(customer_id, payload.product_id, payload.quantity)
        .await?;

    Ok(Json(ApiResponse::new(
        messages::UPDATED,
        CartQuantityView { count },
    )))
}

/// Remove lines for the given products, all-or-nothing.
#[instrument(skip(state, current), fields(user = %current.user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(payload): Json<RemoveItemsPayload>,
) -> Result<impl IntoResponse> {
    if payload.product_ids.is_empty() {
        return Err(AppError::Validation("productIds must not be empty".to_owned()));
    }
    let customer_id = current.customer_id(&state).await?;

    let count = CartService::new(state.pool())
        .remove_items(customer_id, &payload.product_ids)
        .await?;

    Ok(Json(ApiResponse::new(
        messages::UPDATED,
        CartQuantityView { count },
    )))
}
