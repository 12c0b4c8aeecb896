//! Category route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::CategoryId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::response::{ApiResponse, PageResponse, messages};
use crate::services::categories::{self, CategoryService};
use crate::state::AppState;

use super::ListQuery;

/// Category fields accepted by create and update.
#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryPayload {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_owned()));
        }
        Ok(())
    }
}

/// Category view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub is_deleted: bool,
}

impl From<Category> for CategoryView {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            slug: c.slug,
            is_deleted: c.is_deleted,
        }
    }
}

/// Visible categories, paginated (public).
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(categories::SORT_COLUMNS)?;
    let (rows, total) = CategoryService::new(state.pool()).list(false, page).await?;

    let body = PageResponse::new(rows, &page, total).map(CategoryView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Soft-deleted categories, paginated (ADMIN).
#[instrument(skip(state, _admin))]
pub async fn deleted(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.resolve(categories::SORT_COLUMNS)?;
    let (rows, total) = CategoryService::new(state.pool()).list(true, page).await?;

    let body = PageResponse::new(rows, &page, total).map(CategoryView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Category by id (public).
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<impl IntoResponse> {
    let category = CategoryService::new(state.pool()).get(id).await?;
    Ok(Json(ApiResponse::new(
        messages::FOUND,
        CategoryView::from(category),
    )))
}

/// Category by slug (public).
#[instrument(skip(state))]
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let category = CategoryService::new(state.pool()).get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::new(
        messages::FOUND,
        CategoryView::from(category),
    )))
}

/// Create a category (ADMIN).
#[instrument(skip(state, admin, payload), fields(admin = %admin.0.user.id, name = %payload.name))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let category = CategoryService::new(state.pool())
        .create(&payload.name, payload.description.as_deref(), admin.0.user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            messages::CREATED,
            CategoryView::from(category),
        )),
    ))
}

/// Update a category (ADMIN).
#[instrument(skip(state, admin, payload), fields(admin = %admin.0.user.id))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let category = CategoryService::new(state.pool())
        .update(
            id,
            &payload.name,
            payload.description.as_deref(),
            admin.0.user.id,
        )
        .await?;

    Ok(Json(ApiResponse::new(
        messages::UPDATED,
        CategoryView::from(category),
    )))
}

/// Flip a category's soft-delete flag (ADMIN).
#[instrument(skip(state, admin), fields(admin = %admin.0.user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<impl IntoResponse> {
    let deleted = CategoryService::new(state.pool())
        .toggle(id, admin.0.user.id)
        .await?;
    Ok(Json(ApiResponse::new(messages::UPDATED, deleted)))
}
