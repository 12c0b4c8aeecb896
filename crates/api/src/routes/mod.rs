//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (verifies database)
//!
//! # Auth
//! POST /auth/register              - Create a shopper account
//! POST /auth/login                 - Exchange credentials for a bearer token
//! POST /auth/logout                - Denylist the presented token
//! POST /auth/refresh               - Rotate a still-valid token
//!
//! # Products (public reads, ADMIN writes)
//! GET  /products                   - Active products
//! GET  /products/hidden            - Soft-deleted products (ADMIN)
//! GET  /products/search?name=      - Name search
//! GET  /products/{id}              - Product by id
//! GET  /products/slug/{slug}       - Product by slug
//! GET  /products/category/{id}     - Products in a category
//! POST /products                   - Create (multipart: product + image)
//! PUT  /products/{id}              - Update (image part optional)
//! PATCH /products/{id}/toggle      - Flip soft-delete flag
//!
//! # Featured placements
//! POST   /products/feature         - Schedule a placement (ADMIN)
//! GET    /products/feature         - All placements (ADMIN)
//! GET    /products/feature/active  - Placements active today
//! GET    /products/feature/{id}    - Placement by id
//! PUT    /products/feature/{id}    - Re-schedule (ADMIN)
//! DELETE /products/feature/{id}    - Remove (ADMIN)
//!
//! # Categories (public reads, ADMIN writes)
//! GET /categories | /categories/deleted | /categories/{id} | /categories/slug/{slug}
//! POST /categories | PUT /categories/{id} | PATCH /categories/{id}/toggle
//!
//! # Carts (USER)
//! POST /carts   - Add item        GET    /carts - Paginated detail
//! PATCH /carts  - Overwrite qty   DELETE /carts - Remove items
//!
//! # Reviews
//! POST /reviews (USER) | PUT /reviews/{id} (owner) | DELETE /reviews/{id}
//! GET /reviews (ADMIN) | /reviews/{id} | /reviews/user | /reviews/product/{id}[/statistic]
//!
//! # Users & admin
//! GET/PUT /users/me | PATCH /users/me/change-password
//! GET /admin/users | GET /admin/users/inactive | PATCH /admin/toggle-status
//! ```

pub mod admin;
pub mod auth;
pub mod carts;
pub mod categories;
pub mod products;
pub mod reviews;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};
use serde::Deserialize;

use crate::db::{PageRequest, SortColumns};
use crate::error::AppError;
use crate::state::AppState;

/// Pagination/sorting query parameters shared by every listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl ListQuery {
    /// Resolve against a listing's sortable columns.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Page` for an unknown sort field or direction.
    pub fn resolve(&self, columns: SortColumns) -> Result<PageRequest, AppError> {
        let page = PageRequest::resolve(
            self.page,
            self.size,
            self.sort_by.as_deref(),
            self.sort_dir.as_deref(),
            columns,
        )?;
        Ok(page)
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
}

/// Create the product routes router (featured placements nested under
/// `/feature`).
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/hidden", get(products::hidden))
        .route("/search", get(products::search))
        .route("/slug/{slug}", get(products::show_by_slug))
        .route("/category/{category_id}", get(products::by_category))
        .route(
            "/feature",
            get(products::feature_index).post(products::feature_create),
        )
        .route("/feature/active", get(products::feature_active))
        .route(
            "/feature/{id}",
            get(products::feature_show)
                .put(products::feature_update)
                .delete(products::feature_delete),
        )
        .route("/{id}", get(products::show).put(products::update))
        .route("/{id}/toggle", patch(products::toggle))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/deleted", get(categories::deleted))
        .route("/slug/{slug}", get(categories::show_by_slug))
        .route("/{id}", get(categories::show).put(categories::update))
        .route("/{id}/toggle", patch(categories::toggle))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        post(carts::add)
            .get(carts::detail)
            .patch(carts::update)
            .delete(carts::remove),
    )
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::index).post(reviews::create))
        .route("/user", get(reviews::by_current_user))
        .route("/product/{id}", get(reviews::by_product))
        .route("/product/{id}/statistic", get(reviews::statistic))
        .route(
            "/{id}",
            get(reviews::show)
                .put(reviews::update)
                .delete(reviews::delete),
        )
}

/// Create the user self-service routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me).put(users::update_me))
        .route("/me/change-password", patch(users::change_password))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::active_users))
        .route("/users/inactive", get(admin::inactive_users))
        .route("/toggle-status", patch(admin::toggle_status))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/carts", cart_routes())
        .nest("/reviews", review_routes())
        .nest("/users", user_routes())
        .nest("/admin", admin_routes())
}
