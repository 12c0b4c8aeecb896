//! Self-service user route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::{Email, Role, UserId};

use crate::db::users::ProfileFields;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::UserProfile;
use crate::response::{ApiResponse, messages};
use crate::services::auth::AuthService;
use crate::services::users::UserService;
use crate::state::AppState;

/// Profile update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Change-password request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub old_password: String,
    pub new_password: String,
}

/// The caller's account + profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeView {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl MeView {
    fn new(current: &CurrentUser, profile: UserProfile) -> Self {
        Self {
            id: current.user.id,
            email: current.user.email.clone(),
            role: current.user.role,
            first_name: profile.first_name,
            last_name: profile.last_name,
            phone_number: profile.phone_number,
            address: profile.address,
        }
    }
}

/// The authenticated caller's account and profile.
#[instrument(skip(state, current), fields(user = %current.user.id))]
pub async fn me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    let profile = UserService::new(state.pool())
        .profile(current.user.id)
        .await?;
    Ok(Json(ApiResponse::new(
        messages::FOUND,
        MeView::new(&current, profile),
    )))
}

/// Overwrite the caller's profile.
#[instrument(skip(state, current, payload), fields(user = %current.user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    let profile = UserService::new(state.pool())
        .update_profile(
            current.user.id,
            ProfileFields {
                first_name: &payload.first_name,
                last_name: &payload.last_name,
                phone_number: payload.phone_number.as_deref(),
                address: payload.address.as_deref(),
            },
        )
        .await?;

    Ok(Json(ApiResponse::new(
        messages::UPDATED,
        MeView::new(&current, profile),
    )))
}

/// Change the caller's password after verifying the old one.
#[instrument(skip_all, fields(user = %current.user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse> {
    AuthService::new(state.pool(), state.jwt())
        .change_password(
            current.user.id,
            &payload.old_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(ApiResponse::empty(messages::UPDATED)))
}
