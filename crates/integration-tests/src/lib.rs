//! Integration tests for Orchard.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and apply migrations
//! cargo run -p orchard-cli -- migrate
//!
//! # Seed an admin account the tests can use
//! cargo run -p orchard-cli -- seed admin -e admin@orchard.test -p 'integration-admin-pw' -f Ada -l Lovelace
//!
//! # Start the API
//! cargo run -p orchard-api
//!
//! # Run the (ignored-by-default) integration tests
//! cargo test -p orchard-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - where the API listens (default `http://localhost:3000`)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - seeded admin credentials

use reqwest::Client;
use serde_json::Value;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Seeded admin credentials for tests that exercise ADMIN endpoints.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    let email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@orchard.test".to_string());
    let password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "integration-admin-pw".to_string());
    (email, password)
}

/// A plain HTTP client; auth is per-request bearer headers, no cookies.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// Log in and return the bearer token from the `{message, data}` envelope.
///
/// # Panics
///
/// Panics if the request fails or the response isn't a token envelope.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&serde_json::json!({"email": email, "password": password}))
        .send()
        .await
        .expect("login request failed");

    assert!(resp.status().is_success(), "login rejected for {email}");
    let body: Value = resp.json().await.expect("login response not JSON");
    body["data"]["token"]
        .as_str()
        .expect("login response missing token")
        .to_owned()
}

/// Create a category with a unique name, returning its id.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn create_category(client: &Client, admin_token: &str) -> String {
    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/categories"))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({
            "name": format!("Test Category {}", uuid::Uuid::new_v4()),
            "description": "created by integration tests",
        }))
        .send()
        .await
        .expect("create category request failed");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let body: Value = resp.json().await.expect("category response not JSON");
    body["data"]["id"]
        .as_str()
        .expect("category response missing id")
        .to_owned()
}

/// Create a product with the given stock, returning its id.
///
/// Sends the multipart body the product endpoints expect: a `product`
/// JSON part plus an `image` file part (a tiny 1x1 PNG).
///
/// # Panics
///
/// Panics if the request fails.
pub async fn create_product(
    client: &Client,
    admin_token: &str,
    category_id: &str,
    available_quantity: i32,
) -> String {
    // Smallest valid PNG: 8-byte signature + IHDR/IDAT/IEND chunks
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
        0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    let base_url = api_base_url();
    let payload = serde_json::json!({
        "name": format!("Test Product {}", uuid::Uuid::new_v4()),
        "description": "created by integration tests",
        "price": "19.99",
        "availableQuantity": available_quantity,
        "categoryId": category_id,
    });

    let form = reqwest::multipart::Form::new()
        .text("product", payload.to_string())
        .part(
            "image",
            reqwest::multipart::Part::bytes(TINY_PNG.to_vec())
                .file_name("test.png")
                .mime_str("image/png")
                .expect("valid mime"),
        );

    let resp = client
        .post(format!("{base_url}/products"))
        .bearer_auth(admin_token)
        .multipart(form)
        .send()
        .await
        .expect("create product request failed");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let body: Value = resp.json().await.expect("product response not JSON");
    body["data"]["id"]
        .as_str()
        .expect("product response missing id")
        .to_owned()
}

/// Register a fresh shopper with a unique email and log them in.
/// Returns `(email, token)`.
///
/// # Panics
///
/// Panics if registration or login fails.
pub async fn register_shopper(client: &Client) -> (String, String) {
    let base_url = api_base_url();
    let email = format!("shopper-{}@orchard.test", uuid::Uuid::new_v4());
    let password = "integration-shopper-pw";

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&serde_json::json!({
            "email": email,
            "password": password,
            "firstName": "Test",
            "lastName": "Shopper",
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

    let token = login(client, &email, password).await;
    (email, token)
}
