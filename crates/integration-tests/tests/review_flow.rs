//! Integration tests for reviews.
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

async fn seeded_product(client: &reqwest::Client) -> String {
    let (email, password) = admin_credentials();
    let admin_token = login(client, &email, &password).await;
    let category = create_category(client, &admin_token).await;
    create_product(client, &admin_token, &category, 10).await
}

async fn post_review(
    client: &reqwest::Client,
    token: &str,
    product_id: &str,
    rating: i32,
) -> reqwest::Response {
    client
        .post(format!("{}/reviews", api_base_url()))
        .bearer_auth(token)
        .json(&json!({
            "productId": product_id,
            "rating": rating,
            "comment": "integration review",
        }))
        .send()
        .await
        .expect("review request failed")
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_second_review_for_same_product_rejected() {
    let client = client();
    let product = seeded_product(&client).await;
    let (_, token) = register_shopper(&client).await;

    let resp = post_review(&client, &token, &product, 4).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same customer, same product: rejected, and the product still shows
    // exactly one review
    let resp = post_review(&client, &token, &product, 5).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{}/reviews/product/{product}/statistic", api_base_url()))
        .send()
        .await
        .expect("statistic request failed");
    let body: Value = resp.json().await.expect("statistic body");
    assert_eq!(body["data"]["count"], json!(1));
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_two_customers_can_review_same_product() {
    let client = client();
    let product = seeded_product(&client).await;
    let (_, first) = register_shopper(&client).await;
    let (_, second) = register_shopper(&client).await;

    assert_eq!(
        post_review(&client, &first, &product, 5).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        post_review(&client, &second, &product, 3).await.status(),
        StatusCode::CREATED
    );

    let resp = client
        .get(format!("{}/reviews/product/{product}/statistic", api_base_url()))
        .send()
        .await
        .expect("statistic request failed");
    let body: Value = resp.json().await.expect("statistic body");
    assert_eq!(body["data"]["count"], json!(2));
    assert_eq!(body["data"]["averageRating"], json!(4.0));
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_editing_anothers_review_is_forbidden() {
    let client = client();
    let product = seeded_product(&client).await;
    let (_, author) = register_shopper(&client).await;
    let (_, intruder) = register_shopper(&client).await;

    let resp = post_review(&client, &author, &product, 4).await;
    let body: Value = resp.json().await.expect("review body");
    let review_id = body["data"]["id"].as_str().expect("review id").to_owned();

    let resp = client
        .put(format!("{}/reviews/{review_id}", api_base_url()))
        .bearer_auth(&intruder)
        .json(&json!({"rating": 1, "comment": "hijacked"}))
        .send()
        .await
        .expect("update request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires running API server and seeded admin account"]
async fn test_rating_outside_range_rejected() {
    let client = client();
    let product = seeded_product(&client).await;
    let (_, token) = register_shopper(&client).await;

    assert_eq!(
        post_review(&client, &token, &product, 0).await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        post_review(&client, &token, &product, 6).await.status(),
        StatusCode::BAD_REQUEST
    );
}
