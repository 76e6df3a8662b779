//! End-to-end flows against PostgreSQL.
//!
//! Run with `DATABASE_URL=... cargo test -p soko-integration-tests -- --ignored`.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use soko_backend::TrackingFeed;
use soko_backend::db::{PasswordResetRepository, ProfileRepository};
use soko_core::{Email, OrderStatus, TrackingChange, UserRole};
use soko_integration_tests::{
    PASSWORD, TestClient, admin, admin_session, billing, create_account, database, storefront,
    unique_email,
};

// =============================================================================
// Checkout to Delivery
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_order_is_tracked_from_checkout_to_shipping() {
    let Some(pool) = database().await else { return };
    let (feed, _listener) = TrackingFeed::spawn(pool.clone());
    let mut changes = feed.subscribe();
    let mut admin = admin_session(&pool).await;
    let mut shop = TestClient::new(storefront(pool.clone(), feed));

    // Catalog
    let category = admin
        .post(
            "/api/categories",
            json!({ "name": format!("Test {}", unique_email("cat")) }),
        )
        .await;
    assert_eq!(category.status, StatusCode::CREATED, "{}", category.text());
    let product = admin
        .post(
            "/api/products",
            json!({
                "name": "Integration Skillet",
                "price": "1500.00",
                "stock_quantity": 5,
                "category_id": category.json()["id"],
            }),
        )
        .await;
    assert_eq!(product.status, StatusCode::CREATED, "{}", product.text());
    let product_id = product.json()["id"].as_str().unwrap().to_string();

    // Customer
    let email = unique_email("customer");
    let response = shop
        .post(
            "/api/auth/register",
            json!({ "email": email, "password": PASSWORD, "first_name": "Wanjiru" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    assert_eq!(response.json()["role"], "customer");

    let cart = shop
        .post("/api/cart", json!({ "product_id": product_id, "quantity": 2 }))
        .await;
    assert_eq!(cart.status, StatusCode::OK, "{}", cart.text());
    assert_eq!(cart.json()["item_count"], 2);
    assert_eq!(shop.get("/api/cart/count").await.json()["count"], 2);

    let wishlist = format!("/api/wishlist/{product_id}");
    assert_eq!(shop.get(&wishlist).await.json()["in_wishlist"], false);
    shop.post("/api/wishlist", json!({ "product_id": product_id })).await;
    assert_eq!(shop.get(&wishlist).await.json()["in_wishlist"], true);

    let order = shop
        .post(
            "/api/checkout",
            json!({
                "billing": billing(&email),
                "payment_method": "mpesa",
                "payment_reference": "QK7TEST01",
            }),
        )
        .await;
    assert_eq!(order.status, StatusCode::CREATED, "{}", order.text());
    let order = order.json();
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["status"], "order_placed");
    assert_eq!(order["payment_status"], "pending");

    let cart = shop.get("/api/cart").await;
    assert_eq!(cart.json()["item_count"], 0);

    let product = shop.get(&format!("/api/products/{product_id}")).await;
    assert_eq!(product.json()["stock_quantity"], 3);

    let tracking = shop.get(&format!("/api/orders/{order_id}/tracking")).await;
    assert_eq!(tracking.json()["current_status"], "order_placed");

    let update = admin
        .post(
            &format!("/api/orders/{order_id}/status"),
            json!({ "status": "shipped", "tracking_number": "KE-TRK-42" }),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK, "{}", update.text());
    let update = update.json();
    assert_eq!(update["success"], true);
    assert_eq!(update["tracking"]["status"], "shipped");
    assert_eq!(update["tracking"]["status_message"], "Order status updated to shipped");

    let change = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let change = changes.recv().await.unwrap();
            // Checkout's own order_placed insert arrives first.
            if change.order_id().to_string() == order_id
                && change.entry().status == OrderStatus::Shipped
            {
                break change;
            }
        }
    })
    .await
    .unwrap();
    assert!(matches!(change, TrackingChange::Inserted(_)));
    assert_eq!(change.entry().status, OrderStatus::Shipped);

    let tracking = shop.get(&format!("/api/orders/{order_id}/tracking")).await;
    let tracking = tracking.json();
    assert_eq!(tracking["current_status"], "shipped");
    assert_eq!(tracking["entries"].as_array().unwrap().len(), 2);
    assert_eq!(tracking["entries"][0]["tracking_number"], "KE-TRK-42");

    let bogus = admin
        .post(
            &format!("/api/orders/{order_id}/status"),
            json!({ "status": "bogus" }),
        )
        .await;
    assert_eq!(bogus.status, StatusCode::BAD_REQUEST);
    assert_eq!(bogus.header("content-type"), Some("application/json"));
    assert!(bogus.json()["error"].is_string());

    let missing = admin.get("/api/orders/not-a-uuid").await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert!(missing.json()["error"].is_string());

    let paid = admin
        .put(
            &format!("/api/orders/{order_id}/payment-status"),
            json!({ "payment_status": "paid" }),
        )
        .await;
    assert_eq!(paid.status, StatusCode::OK, "{}", paid.text());
    let order = shop.get(&format!("/api/orders/{order_id}")).await.json();
    assert_eq!(order["payment_status"], "paid");
    assert_eq!(order["status"], "shipped");

    let shipped = admin.get("/api/orders?status=shipped").await;
    assert!(
        shipped
            .json()
            .as_array()
            .unwrap()
            .iter()
            .any(|o| o["id"] == order_id.as_str())
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_checkout_with_empty_cart_is_rejected() {
    let Some(pool) = database().await else { return };
    let mut shop = TestClient::new(storefront(pool, TrackingFeed::detached()));

    let email = unique_email("empty");
    shop.post(
        "/api/auth/register",
        json!({ "email": email, "password": PASSWORD }),
    )
    .await;

    let response = shop
        .post(
            "/api/checkout",
            json!({ "billing": billing(&email), "payment_method": "mpesa" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.text());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_oversized_amounts_are_bad_requests() {
    let Some(pool) = database().await else { return };
    let mut admin = admin_session(&pool).await;
    let mut shop = TestClient::new(storefront(pool.clone(), TrackingFeed::detached()));

    let product = admin
        .post(
            "/api/products",
            json!({ "name": "Bulk Sufuria", "price": "9999999999.99", "stock_quantity": 20000 }),
        )
        .await;
    assert_eq!(product.status, StatusCode::CREATED, "{}", product.text());
    let product_id = product.json()["id"].as_str().unwrap().to_string();

    shop.post(
        "/api/auth/register",
        json!({ "email": unique_email("bulk"), "password": PASSWORD }),
    )
    .await;

    let response = shop
        .post("/api/cart", json!({ "product_id": product_id, "quantity": i32::MAX }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.text());

    let response = shop
        .post("/api/cart", json!({ "product_id": product_id, "quantity": 10_000 }))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    let response = shop
        .post("/api/cart", json!({ "product_id": product_id, "quantity": 1 }))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.json()["item_count"], 10_000);

    let response = shop
        .post(
            "/api/checkout",
            json!({ "billing": billing(&unique_email("bulk")), "payment_method": "mpesa" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.text());

    let response = shop
        .post("/api/wallet/top-up", json!({ "amount": "100000000000" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.text());
    assert_eq!(response.json()["error"], "maximum top-up amount is KSh 100,000");
}

// =============================================================================
// Admin Access
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_customer_cannot_log_in_to_admin() {
    let Some(pool) = database().await else { return };
    let email = unique_email("shopper");
    create_account(&pool, &email, UserRole::Customer).await;

    let mut client = TestClient::new(admin(pool));
    let response = client
        .post("/api/auth/login", json!({ "email": email, "password": PASSWORD }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json()["error"], "Admin access required");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_demoted_admin_loses_access_immediately() {
    let Some(pool) = database().await else { return };
    let mut admin = admin_session(&pool).await;
    assert_eq!(admin.get("/api/auth/me").await.status, StatusCode::OK);

    let me = admin.get("/api/auth/me").await.json();
    let email = Email::parse(me["email"].as_str().unwrap()).unwrap();
    ProfileRepository::new(&pool)
        .update_role_by_email(&email, UserRole::Customer)
        .await
        .unwrap();

    let response = admin.get("/api/dashboard").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_wrong_password_is_unauthorized() {
    let Some(pool) = database().await else { return };
    let email = unique_email("admin");
    create_account(&pool, &email, UserRole::Admin).await;

    let mut client = TestClient::new(admin(pool));
    let response = client
        .post("/api/auth/login", json!({ "email": email, "password": "not-the-password" }))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Password Reset
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_reset_token_sets_password_once() {
    let Some(pool) = database().await else { return };
    let email = unique_email("forgetful");
    create_account(&pool, &email, UserRole::Customer).await;
    let profile = ProfileRepository::new(&pool)
        .get_by_email(&Email::parse(&email).unwrap())
        .await
        .unwrap()
        .unwrap();

    let mut shop = TestClient::new(storefront(pool.clone(), TrackingFeed::detached()));
    let response = shop
        .post("/api/auth/forgot-password", json!({ "email": email }))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    // A newer token revokes the one the request above issued.
    let resets = PasswordResetRepository::new(&pool);
    let stale = resets.issue(profile.id).await.unwrap();
    let token = resets.issue(profile.id).await.unwrap();

    let new_password = "mpya-kabisa-2026";
    let response = shop
        .post(
            "/api/auth/reset-password",
            json!({ "token": stale, "password": new_password }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Reset link is invalid or has expired");

    let response = shop
        .post(
            "/api/auth/reset-password",
            json!({ "token": token, "password": new_password }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = shop
        .post(
            "/api/auth/reset-password",
            json!({ "token": token, "password": "tena-mpya-2026" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = shop
        .post(
            "/api/auth/forgot-password",
            json!({ "email": unique_email("nobody") }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    // Fresh client, fresh auth rate limit.
    let mut login = TestClient::new(storefront(pool.clone(), TrackingFeed::detached()));
    let response = login
        .post("/api/auth/login", json!({ "email": email, "password": PASSWORD }))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    let response = login
        .post("/api/auth/login", json!({ "email": email, "password": new_password }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}
