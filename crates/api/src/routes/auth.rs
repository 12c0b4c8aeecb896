//! Auth route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::Role;

use crate::db::users::ProfileFields;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::response::{ApiResponse, messages};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Token response for login and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_item_count: Option<i64>,
}

/// Register a new shopper account.
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    AuthService::new(state.pool(), state.jwt())
        .register(
            &payload.email,
            &payload.password,
            ProfileFields {
                first_name: &payload.first_name,
                last_name: &payload.last_name,
                phone_number: payload.phone_number.as_deref(),
                address: payload.address.as_deref(),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::empty(messages::CREATED)),
    ))
}

/// Exchange credentials for a bearer token.
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    let outcome = AuthService::new(state.pool(), state.jwt())
        .login(&payload.email, &payload.password)
        .await?;

    let view = TokenView {
        token: outcome.token.token,
        expires_at: outcome.token.expires_at,
        role: outcome.token.role,
        cart_item_count: Some(outcome.cart_item_count),
    };

    Ok(Json(ApiResponse::new(messages::SUCCESS, view)))
}

/// Denylist the presented token.
#[instrument(skip_all, fields(user = %current.user.id))]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    AuthService::new(state.pool(), state.jwt())
        .logout(&current.token, &current.claims)
        .await?;

    Ok(Json(ApiResponse::empty(messages::SUCCESS)))
}

/// Rotate a still-valid token: issue a replacement and denylist the old
/// one.
#[instrument(skip_all, fields(user = %current.user.id))]
pub async fn refresh(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    let fresh = AuthService::new(state.pool(), state.jwt())
        .refresh(&current.token, &current.claims)
        .await?;

    let view = TokenView {
        token: fresh.token,
        expires_at: fresh.expires_at,
        role: fresh.role,
        cart_item_count: None,
    };

    Ok(Json(ApiResponse::new(messages::SUCCESS, view)))
}
