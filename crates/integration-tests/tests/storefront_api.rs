//! Storefront routes that answer without a database.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use soko_backend::TrackingFeed;
use soko_integration_tests::{TestClient, lazy_pool, storefront};

fn client() -> TestClient {
    TestClient::new(storefront(lazy_pool(), TrackingFeed::detached()))
}

// =============================================================================
// Health and Headers
// =============================================================================

#[tokio::test]
async fn test_health() {
    let response = client().get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let response = client().get("/api/currencies").await;
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("cache-control"), Some("no-store"));
    assert!(response.header("x-request-id").is_some_and(|id| !id.is_empty()));
}

// =============================================================================
// Currency
// =============================================================================

#[tokio::test]
async fn test_currencies_start_with_base() {
    let response = client().get("/api/currencies").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["code"].as_str())
        .collect();
    assert_eq!(codes.first(), Some(&"KES"));
    assert!(codes.contains(&"USD"));
}

#[tokio::test]
async fn test_currency_preference_is_kept_in_session() {
    let mut client = client();

    let response = client.get("/api/currency").await;
    assert_eq!(response.json()["currency"]["code"], "KES");

    let response = client.put("/api/currency", json!({ "currency": "USD" })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.session_cookie().is_some());

    let response = client.get("/api/currency").await;
    assert_eq!(response.json()["currency"]["code"], "USD");
}

#[tokio::test]
async fn test_unknown_currency_is_rejected() {
    let response = client()
        .put("/api/currency", json!({ "currency": "DOGE" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
}

// =============================================================================
// Authentication Required
// =============================================================================

#[tokio::test]
async fn test_shopping_routes_require_login() {
    let mut client = client();
    for (method, uri) in [
        (Method::GET, "/api/cart"),
        (Method::GET, "/api/cart/count"),
        (Method::GET, "/api/wishlist"),
        (Method::GET, "/api/wishlist/6f1c1f7e-4a4b-4bb5-9d55-2a3f3f0b9c11"),
        (Method::GET, "/api/orders"),
        (Method::GET, "/api/wallet"),
        (Method::GET, "/api/profile"),
        (Method::GET, "/api/auth/me"),
    ] {
        let response = client.send(method, uri, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.json()["error"], "Authentication required", "{uri}");
    }
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let response = client()
        .post("/api/checkout", json!({ "payment_method": "wallet", "billing": {} }))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Validation Before Storage
// =============================================================================

#[tokio::test]
async fn test_contact_form_requires_fields() {
    let response = client()
        .post(
            "/api/contact",
            json!({ "name": "Wanjiru", "email": "", "message": "Hello" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Email is required");
}

#[tokio::test]
async fn test_contact_form_rejects_bad_email() {
    let response = client()
        .post(
            "/api/contact",
            json!({ "name": "Wanjiru", "email": "wanjiru", "message": "Hello" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid email address");
}

#[tokio::test]
async fn test_contact_form_without_name_names_the_field() {
    let response = client()
        .post(
            "/api/contact",
            json!({ "email": "wanjiru@soko.test", "message": "Hello" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Name is required");
}

// =============================================================================
// Password Reset
// =============================================================================

#[tokio::test]
async fn test_forgot_password_rejects_bad_email() {
    let response = client()
        .post("/api/auth/forgot-password", json!({ "email": "wanjiru" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid email address");
}

#[tokio::test]
async fn test_reset_password_checks_strength_first() {
    let response = client()
        .post(
            "/api/auth/reset-password",
            json!({ "token": "ab12", "password": "short" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].as_str().unwrap().contains("at least 8"));
}

// =============================================================================
// Malformed Requests
// =============================================================================

#[tokio::test]
async fn test_malformed_json_gets_json_error() {
    let response = client()
        .put("/api/currency", json!({ "currency": 42 }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert!(
        response.json()["error"]
            .as_str()
            .is_some_and(|msg| msg.contains("deserialize")),
        "{}",
        response.text()
    );
}

#[tokio::test]
async fn test_body_without_content_type_gets_json_error() {
    let mut client = client();
    let response = client.send(Method::POST, "/api/contact", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_bad_product_id_gets_json_error() {
    let response = client().get("/api/products/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_bad_query_gets_json_error() {
    let response = client().get("/api/products?featured=maybe").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = client().get("/api/nope").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
