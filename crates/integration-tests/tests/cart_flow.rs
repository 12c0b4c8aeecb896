//! Integration tests for cart reconciliation.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API running (cargo run -p orchard-api)
//! - A seeded admin account (to create test products)
//!
//! Run with: cargo test -p orchard-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use orchard_integration_tests::{
    admin_credentials, api_base_url, client, create_category, create_product, login,
    register_shopper,
};

struct CartFixture {
    client: reqwest::Client,
    shopper_token: String,
    product_id: String,
}

/// Seed a product with the given stock and a fresh shopper.
async fn fixture(stock: i32) -> CartFixture {
    let client = client();
    let (email, password) = admin_credentials();
    let admin_token = login(&client, &email, &password).await;

    let category = create_category(&client, &admin_token).await;
    let product_id = create_product(&client, &admin_token, &category, stock).await;
    let (_, shopper_token) = register_shopper(&client).await;

    CartFixture {
        client,
        shopper_token,
        product_id,
    }
}

impl CartFixture {
    async fn add(&self, quantity: i32) -> reqwest::Response {
        self.client
            .post(format!("{}/carts", api_base_url()))
            .bearer_auth(&self.shopper_token)
            .json(&json!({"productId": self.product_id, "quantity": quantity}))
            .send()
            .await
            .expect("add request failed")
    }

    async fn update(&self, quantity: i32) -> reqwest::Response {
        self.client
            .patch(format!("{}/carts", api_base_url()))
            .bearer_auth(&self.shopper_token)
            .json(&json!({"productId": self.product_id, "quantity": quantity}))
            .send()
            .await
            .expect("update request failed")
    }

    /// Quantity of this product's line, from the cart detail listing.
    async fn line_quantity(&self) -> i64 {
        let resp = self
            .client
            .get(format!("{}/carts", api_base_url()))
            .bearer_auth(&self.shopper_token)
            .send()
            .await
            .expect("detail request failed");
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = resp.json().await.expect("detail body");
        let items = body["data"]["items"].as_array().expect("items array");
        items
            .iter()
            .find(|item| item["productId"] == json!(self.product_id))
            .and_then(|item| item["quantity"].as_i64())
            .expect("line for product")
    }
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_duplicate_adds_merge_into_one_line() {
    let cart = fixture(10).await;

    let resp = cart.add(3).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("count body");
    assert_eq!(body["data"]["count"], json!(1));

    // Second add merges; still one distinct line, quantity 5
    let resp = cart.add(2).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("count body");
    assert_eq!(body["data"]["count"], json!(1));

    assert_eq!(cart.line_quantity().await, 5);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_merge_respects_stock_ceiling() {
    let cart = fixture(4).await;

    let resp = cart.add(3).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // 3 + 2 > 4 -> rejected, line stays at 3
    let resp = cart.add(2).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(cart.line_quantity().await, 3);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_update_overwrites_quantity() {
    let cart = fixture(10).await;

    cart.add(3).await;
    let resp = cart.update(5).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // 5 exactly, not 3 + 5
    assert_eq!(cart.line_quantity().await, 5);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_update_without_line_is_not_found() {
    let cart = fixture(10).await;

    let resp = cart.update(5).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_add_beyond_stock_rejected() {
    let cart = fixture(2).await;

    let resp = cart.add(3).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_remove_is_all_or_nothing() {
    let cart = fixture(10).await;
    cart.add(2).await;

    // One real product, one that was never added: the whole batch fails
    // and the existing line survives
    let resp = cart
        .client
        .delete(format!("{}/carts", api_base_url()))
        .bearer_auth(&cart.shopper_token)
        .json(&json!({
            "productIds": [cart.product_id, uuid::Uuid::new_v4().to_string()]
        }))
        .send()
        .await
        .expect("remove request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(cart.line_quantity().await, 2);

    // Removing just the real line succeeds and empties the cart
    let resp = cart
        .client
        .delete(format!("{}/carts", api_base_url()))
        .bearer_auth(&cart.shopper_token)
        .json(&json!({"productIds": [cart.product_id]}))
        .send()
        .await
        .expect("remove request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("count body");
    assert_eq!(body["data"]["count"], json!(0));
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_cart_requires_user_role() {
    let client = client();
    let (email, password) = admin_credentials();
    let admin_token = login(&client, &email, &password).await;

    let resp = client
        .post(format!("{}/carts", api_base_url()))
        .bearer_auth(&admin_token)
        .json(&json!({"productId": uuid::Uuid::new_v4().to_string(), "quantity": 1}))
        .send()
        .await
        .expect("add request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
