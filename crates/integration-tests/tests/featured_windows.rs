//! Integration tests for featured-product scheduling.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API running (cargo run -p orchard-api)
//! - A seeded admin account (cargo run -p orchard-cli -- seed admin ...)
//!
//! Run with: cargo test -p orchard-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use orchard_integration_tests::{
    admin_credentials, api_base_url, client, create_category, create_product, login,
};

async fn admin_token(client: &reqwest::Client) -> String {
    let (email, password) = admin_credentials();
    login(client, &email, &password).await
}

async fn feature(
    client: &reqwest::Client,
    token: &str,
    product_id: &str,
    start: &str,
    end: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/products/feature", api_base_url()))
        .bearer_auth(token)
        .json(&json!({
            "productId": product_id,
            "startDate": start,
            "endDate": end,
            "description": "integration window",
        }))
        .send()
        .await
        .expect("feature request failed")
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_overlapping_window_rejected() {
    let client = client();
    let token = admin_token(&client).await;
    let category = create_category(&client, &token).await;
    let product = create_product(&client, &token, &category, 10).await;

    // [Jan 1, Jan 10] lands
    let resp = feature(&client, &token, &product, "2031-01-01", "2031-01-10").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // [Jan 5, Jan 15] overlaps -> 400
    let resp = feature(&client, &token, &product, "2031-01-05", "2031-01-15").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body");
    assert!(body["data"].is_null());

    // [Jan 11, Jan 20] is adjacent but disjoint -> lands
    let resp = feature(&client, &token, &product, "2031-01-11", "2031-01-20").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_boundary_day_conflicts() {
    let client = client();
    let token = admin_token(&client).await;
    let category = create_category(&client, &token).await;
    let product = create_product(&client, &token, &category, 10).await;

    let resp = feature(&client, &token, &product, "2031-03-01", "2031-03-10").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Closed intervals: sharing exactly the boundary day conflicts
    let resp = feature(&client, &token, &product, "2031-03-10", "2031-03-20").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_update_excludes_itself_from_overlap_check() {
    let client = client();
    let token = admin_token(&client).await;
    let category = create_category(&client, &token).await;
    let product = create_product(&client, &token, &category, 10).await;

    let resp = feature(&client, &token, &product, "2031-05-01", "2031-05-10").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("placement body");
    let id = body["data"]["id"].as_str().expect("placement id").to_owned();

    // Updating a placement to the window it already occupies succeeds
    let resp = client
        .put(format!("{}/products/feature/{id}", api_base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "startDate": "2031-05-01",
            "endDate": "2031-05-10",
            "description": "unchanged window",
        }))
        .send()
        .await
        .expect("update request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_inverted_window_rejected() {
    let client = client();
    let token = admin_token(&client).await;
    let category = create_category(&client, &token).await;
    let product = create_product(&client, &token, &category, 10).await;

    let resp = feature(&client, &token, &product, "2031-07-10", "2031-07-01").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_feature_write_requires_admin() {
    let client = client();
    let (_, shopper_token) = orchard_integration_tests::register_shopper(&client).await;

    let resp = client
        .post(format!("{}/products/feature", api_base_url()))
        .bearer_auth(&shopper_token)
        .json(&json!({
            "productId": uuid::Uuid::new_v4().to_string(),
            "startDate": "2031-09-01",
            "endDate": "2031-09-10",
        }))
        .send()
        .await
        .expect("feature request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
