//! Live tracking stream and invoice download against PostgreSQL.
//!
//! The storefront gets a detached feed so the test decides exactly which
//! changes the stream sees.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;
use uuid::Uuid;

use soko_backend::TrackingFeed;
use soko_core::{OrderId, OrderStatus, TrackingChange, TrackingEntry, TrackingEntryId};
use soko_integration_tests::{TestClient, database, place_order, storefront};

const WAIT: Duration = Duration::from_secs(5);

fn entry(order_id: OrderId, status: OrderStatus, message: &str) -> TrackingEntry {
    let now = Utc::now();
    TrackingEntry {
        id: TrackingEntryId::new(Uuid::new_v4()),
        order_id,
        status,
        status_message: Some(message.to_string()),
        tracking_number: None,
        estimated_delivery: None,
        actual_delivery: None,
        location: Some("Nairobi".to_string()),
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Event Stream
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_stream_starts_with_snapshot_then_follows_the_order() {
    let Some(pool) = database().await else { return };
    let feed = TrackingFeed::detached();
    let mut shop = TestClient::new(storefront(pool.clone(), feed.clone()));
    let order = place_order(&pool, &mut shop).await;
    let order_id: OrderId = order["id"].as_str().unwrap().parse().unwrap();

    let (status, mut events) = shop
        .events(&format!("/api/orders/{order_id}/tracking/live"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let snapshot = events.expect(WAIT).await;
    assert_eq!(snapshot.name, "snapshot");
    assert_eq!(snapshot.data["current_status"], "order_placed");
    assert_eq!(snapshot.data["entries"].as_array().unwrap().len(), 1);
    let placed_id: TrackingEntryId = snapshot.data["entries"][0]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Another customer's order never reaches this stream.
    let other = OrderId::new(Uuid::new_v4());
    feed.publish(TrackingChange::Inserted(entry(
        other,
        OrderStatus::Shipped,
        "Somebody else's parcel",
    )));

    let mut placed = entry(order_id, OrderStatus::OrderPlaced, "Packed at the warehouse");
    placed.id = placed_id;
    feed.publish(TrackingChange::Updated(placed));

    let update = events.expect(WAIT).await;
    assert_eq!(update.name, "update");
    assert_eq!(update.data["order_id"], order_id.to_string());
    assert_eq!(update.data["status_message"], "Packed at the warehouse");

    feed.publish(TrackingChange::Inserted(entry(
        order_id,
        OrderStatus::Shipped,
        "Handed to courier",
    )));

    let insert = events.expect(WAIT).await;
    assert_eq!(insert.name, "insert");
    assert_eq!(insert.data["status"], "shipped");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_lagging_stream_is_resent_a_snapshot() {
    let Some(pool) = database().await else { return };
    let feed = TrackingFeed::with_capacity(1);
    let mut shop = TestClient::new(storefront(pool.clone(), feed.clone()));
    let order = place_order(&pool, &mut shop).await;
    let order_id: OrderId = order["id"].as_str().unwrap().parse().unwrap();

    let (_, mut events) = shop
        .events(&format!("/api/orders/{order_id}/tracking/live"))
        .await;
    assert_eq!(events.expect(WAIT).await.name, "snapshot");

    // The stream is not polled while these land, so its receiver overflows.
    for (status, message) in [
        (OrderStatus::Processing, "Picking"),
        (OrderStatus::Shipped, "On the road"),
        (OrderStatus::OutForDelivery, "With the rider"),
    ] {
        feed.publish(TrackingChange::Inserted(entry(order_id, status, message)));
    }

    let resent = events.expect(WAIT).await;
    assert_eq!(resent.name, "snapshot");
    // Reloaded from the database, which only has the checkout entry.
    assert_eq!(resent.data["current_status"], "order_placed");

    let latest = events.expect(WAIT).await;
    assert_eq!(latest.name, "insert");
    assert_eq!(latest.data["status_message"], "With the rider");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_stream_of_foreign_order_is_not_found() {
    let Some(pool) = database().await else { return };
    let mut shop = TestClient::new(storefront(pool.clone(), TrackingFeed::detached()));
    place_order(&pool, &mut shop).await;

    let (status, _) = shop
        .events(&format!("/api/orders/{}/tracking/live", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Invoice
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_invoice_downloads_as_html_attachment() {
    let Some(pool) = database().await else { return };
    let mut shop = TestClient::new(storefront(pool.clone(), TrackingFeed::detached()));
    let order = place_order(&pool, &mut shop).await;
    let number = order["order_number"].as_str().unwrap();

    let response = shop
        .get(&format!("/api/orders/{}/invoice", order["id"].as_str().unwrap()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(
        response.header("content-disposition"),
        Some(format!("attachment; filename=\"invoice-{number}.html\"").as_str())
    );
    assert!(response.text().contains(number));
}
