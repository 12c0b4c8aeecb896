//! Admin user-management route handlers (ADMIN role).

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::{Email, Role, UserId};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::response::{ApiResponse, PageResponse, messages};
use crate::services::users::{self, AdminService};
use crate::state::AppState;

use super::ListQuery;

/// Admin view of an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
            created_at: u.stamp.created_at,
        }
    }
}

/// Query string for the status toggle.
#[derive(Debug, Deserialize)]
pub struct ToggleStatusQuery {
    pub id: UserId,
    pub status: bool,
}

/// Active accounts, paginated.
#[instrument(skip(state, _admin))]
pub async fn active_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    list_users(&state, &query, true).await
}

/// Disabled accounts, paginated.
#[instrument(skip(state, _admin))]
pub async fn inactive_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    list_users(&state, &query, false).await
}

async fn list_users(
    state: &AppState,
    query: &ListQuery,
    is_active: bool,
) -> Result<Json<ApiResponse<PageResponse<UserView>>>> {
    let page = query.resolve(users::SORT_COLUMNS)?;
    let (rows, total) = AdminService::new(state.pool())
        .list_users_by_status(is_active, page)
        .await?;

    let body = PageResponse::new(rows, &page, total).map(UserView::from);
    Ok(Json(ApiResponse::new(messages::FOUND, body)))
}

/// Enable or disable an account.
#[instrument(skip(state, _admin))]
pub async fn toggle_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ToggleStatusQuery>,
) -> Result<impl IntoResponse> {
    AdminService::new(state.pool())
        .set_user_status(query.id, query.status)
        .await?;

    Ok(Json(ApiResponse::empty(messages::UPDATED)))
}
