//! Admin routes that answer without a database.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use soko_integration_tests::{TestClient, admin, lazy_pool};

fn client() -> TestClient {
    TestClient::new(admin(lazy_pool()))
}

#[tokio::test]
async fn test_health() {
    let response = client().get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_hsts_and_no_store() {
    let response = client().get("/health").await;
    assert_eq!(
        response.header("strict-transport-security"),
        Some("max-age=31536000; includeSubDomains")
    );
    assert_eq!(response.header("cache-control"), Some("no-store"));
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
}

// =============================================================================
// Admin Session Required
// =============================================================================

#[tokio::test]
async fn test_admin_routes_require_session() {
    let mut client = client();
    for (method, uri) in [
        (Method::GET, "/api/auth/me"),
        (Method::GET, "/api/dashboard"),
        (Method::GET, "/api/products"),
        (Method::GET, "/api/categories"),
        (Method::GET, "/api/brands"),
        (Method::GET, "/api/orders"),
        (Method::GET, "/api/orders?status=shipped"),
        (Method::GET, "/api/users"),
        (Method::GET, "/api/contact-submissions"),
        (Method::GET, "/api/settings"),
        (Method::DELETE, "/api/products/6f1c1f7e-4a4b-4bb5-9d55-2a3f3f0b9c11"),
    ] {
        let response = client.send(method, uri, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.json()["error"], "Authentication required", "{uri}");
    }
}

#[tokio::test]
async fn test_status_update_requires_session() {
    let response = client()
        .post(
            "/api/orders/6f1c1f7e-4a4b-4bb5-9d55-2a3f3f0b9c11/status",
            json!({ "status": "shipped" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = client()
        .put(
            "/api/orders/6f1c1f7e-4a4b-4bb5-9d55-2a3f3f0b9c11/payment-status",
            json!({ "payment_status": "paid" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let response = client()
        .post(
            "/api/auth/login",
            json!({ "email": "not-an-email", "password": "whatever123" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid email address");
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let mut client = client();
    let mut statuses = Vec::new();
    for _ in 0..8 {
        let response = client
            .post(
                "/api/auth/login",
                json!({ "email": "nope", "password": "whatever123" }),
            )
            .await;
        statuses.push(response.status);
    }
    assert_eq!(statuses[0], StatusCode::BAD_REQUEST);
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_logout_without_session() {
    let response = client().send(Method::POST, "/api/auth/logout", None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}
