//! Integration tests for the auth lifecycle.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API running (cargo run -p orchard-api)
//!
//! Run with: cargo test -p orchard-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use orchard_integration_tests::{api_base_url, client, register_shopper};

#[tokio::test]
#[ignore = "requires running API server"]
async fn test_register_login_me_round_trip() {
    let client = client();
    let (email, token) = register_shopper(&client).await;

    let resp = client
        .get(format!("{}/users/me", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("me body");
    assert_eq!(body["data"]["email"], json!(email));
    assert_eq!(body["data"]["role"], json!("USER"));
}

#[tokio::test]
#[ignore = "requires running API server"]
async fn test_duplicate_email_rejected() {
    let client = client();
    let (email, _) = register_shopper(&client).await;

    let resp = client
        .post(format!("{}/auth/register", api_base_url()))
        .json(&json!({
            "email": email,
            "password": "another-password",
            "firstName": "Second",
            "lastName": "Attempt",
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires running API server"]
async fn test_wrong_password_is_unauthorized() {
    let client = client();
    let (email, _) = register_shopper(&client).await;

    let resp = client
        .post(format!("{}/auth/login", api_base_url()))
        .json(&json!({"email": email, "password": "wrong-password"}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires running API server"]
async fn test_logout_denylists_token() {
    let client = client();
    let (_, token) = register_shopper(&client).await;

    let resp = client
        .post(format!("{}/auth/logout", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("logout request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // The same token is refused afterwards, well before its expiry
    let resp = client
        .get(format!("{}/users/me", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires running API server"]
async fn test_refresh_rotates_token() {
    let client = client();
    let (_, token) = register_shopper(&client).await;

    let resp = client
        .post(format!("{}/auth/refresh", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("refresh body");
    let fresh = body["data"]["token"].as_str().expect("fresh token");
    assert_ne!(fresh, token);

    // Old token was denylisted by the rotation
    let resp = client
        .get(format!("{}/users/me", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Fresh token works
    let resp = client
        .get(format!("{}/users/me", api_base_url()))
        .bearer_auth(fresh)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires running API server"]
async fn test_change_password_requires_old_password() {
    let client = client();
    let (_, token) = register_shopper(&client).await;

    let resp = client
        .patch(format!("{}/users/me/change-password", api_base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "oldPassword": "not-the-password",
            "newPassword": "a-whole-new-password",
        }))
        .send()
        .await
        .expect("change-password request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires running API server"]
async fn test_missing_token_rejected() {
    let client = client();

    let resp = client
        .get(format!("{}/users/me", api_base_url()))
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
