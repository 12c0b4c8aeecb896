//! Review route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::{CustomerId, ProductId, ReviewId};

use crate::error::Result;
use crate::middleware::{CurrentUser, RequireAdmin, RequireUser};
use crate::models::Review;
use crate::response::{ApiResponse, PageResponse, messages};
use crate::services::reviews::{self, ReviewService};
use crate::state::AppState;

use super::ListQuery;

/// Create-review request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewPayload {
    pub product_id: ProductId,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Update-review request body.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewPayload {
    pub rating: i32,
    pub comment: Option<String>,
}

/// Review view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewView {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            product_id: r.product_id,
            customer_id: r.customer_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.stamp.created_at,
        }
    }
}

/// Create a review (USER; one per customer and product).
#[instrument(skip(state, current, payload), fields(user = %current.user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(payload): Json<CreateReviewPayload>,
) -> Result<impl IntoResponse> {
    let customer_id = current.customer_id(&state).await?;

    let review = ReviewService::new(state.pool())
        .create(
            customer_id,
            payload.product_id,
            payload.rating,
            payload.comment.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(messages::CREATED, ReviewView::from(review))),
    ))
}

/// Update a review (USER; author only).
#[instrument(skip(state, current, payload), fields(user = %current.user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(id): Path<ReviewId>,
    Json(payload): Json<UpdateReviewPayload>,
) -> Result<impl IntoResponse> {
    let customer_id = current.customer_id(&state).await?;

    let review = ReviewService::new(state.pool())
        .update(id, customer_id, payload.rating, payload.comment.as_deref())
        .await?;

    Ok(Json(ApiResponse::new(
        messages::UPDATED,
        ReviewView::from(review),
    )))
}

/// Delete a review (admin, or the review's author).
#[instrument(skip(state, current), fields(user = %current.user.id))]
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ReviewId>,
) -> Result<impl IntoResponse> {
    let caller = if current.user.role.is_admin() {
        None
    } else {
        Some(current.customer_id(&state).await?)
    };

    ReviewService::new(state.pool())
        .delete(id, current.user.role, caller)
        .await?;

    Ok(Json(ApiResponse::empty(messages::DELETED)))
}

/// Review by id (public).
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<impl IntoResponse> {
    let review = ReviewService::new(state.pool()).get(id).await?;
    Ok(Json(ApiResponse::new(
        messages::FOUND,
        ReviewView::from(review),
    )))
}

/// Every review, paginated (ADMIN).
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(reviews::SORT_COLUMNS)?;
    let (rows, total) = ReviewService::new(state.pool()).list_all(page).await?;

    let body = PageResponse::new(rows, &page, total).map(ReviewView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// The calling customer's reviews, paginated (USER).
#[instrument(skip(state, current), fields(user = %current.user.id))]
pub async fn by_current_user(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(reviews::SORT_COLUMNS)?;
    let customer_id = current.customer_id(&state).await?;

    let (rows, total) = ReviewService::new(state.pool())
        .list_by_customer(customer_id, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(ReviewView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// A product's reviews, paginated (public).
#[instrument(skip(state))]
pub async fn by_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(reviews::SORT_COLUMNS)?;
    let (rows, total) = ReviewService::new(state.pool())
        .list_by_product(product_id, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(ReviewView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Aggregate statistics for a product's reviews (public).
#[instrument(skip(state))]
pub async fn statistic(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let stats = ReviewService::new(state.pool())
        .statistics(product_id)
        .await?;
    Ok(Json(ApiResponse::new(messages::FOUND, stats)))
}
