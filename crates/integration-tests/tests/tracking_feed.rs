//! Change feed payloads merged into an order timeline.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;

use soko_backend::{TrackingFeed, feed};
use soko_core::{OrderId, OrderStatus, Timeline, TrackingChange};

const ORDER: &str = "6f1c1f7e-4a4b-4bb5-9d55-2a3f3f0b9c11";
const OTHER_ORDER: &str = "0c2d9a51-77f0-4a8e-b1f4-5d0e3e6b2a90";

/// A NOTIFY payload in the shape `shop.notify_order_tracking()` emits.
fn payload(op: &str, id: &str, order_id: &str, status: &str, at: &str) -> String {
    json!({
        "op": op,
        "entry": {
            "id": id,
            "order_id": order_id,
            "status": status,
            "status_message": format!("Order status updated to {status}"),
            "tracking_number": null,
            "estimated_delivery": null,
            "actual_delivery": null,
            "location": null,
            "created_at": at,
            "updated_at": at,
        }
    })
    .to_string()
}

fn order() -> OrderId {
    ORDER.parse().unwrap()
}

#[test]
fn test_trigger_payload_decodes() {
    let change = feed::decode(&payload(
        "inserted",
        "11111111-1111-4111-8111-111111111111",
        ORDER,
        "processing",
        "2026-03-02T09:15:00.123456+00:00",
    ))
    .unwrap();

    assert!(matches!(change, TrackingChange::Inserted(_)));
    assert_eq!(change.order_id(), order());
    assert_eq!(change.entry().status, OrderStatus::Processing);
}

#[test]
fn test_malformed_payload_is_an_error() {
    assert!(feed::decode(r#"{"op":"deleted","entry":{}}"#).is_err());
    assert!(feed::decode("not json").is_err());
}

#[tokio::test]
async fn test_published_changes_build_a_timeline() {
    let feed = TrackingFeed::detached();
    let mut rx = feed.subscribe();

    for raw in [
        payload(
            "inserted",
            "11111111-1111-4111-8111-111111111111",
            ORDER,
            "order_placed",
            "2026-03-01T08:00:00+00:00",
        ),
        payload(
            "inserted",
            "22222222-2222-4222-8222-222222222222",
            OTHER_ORDER,
            "delivered",
            "2026-03-01T09:00:00+00:00",
        ),
        payload(
            "inserted",
            "33333333-3333-4333-8333-333333333333",
            ORDER,
            "shipped",
            "2026-03-02T10:00:00+00:00",
        ),
    ] {
        feed.publish(feed::decode(&raw).unwrap());
    }

    let mut timeline = Timeline::new(order(), Vec::new());
    let mut applied = 0;
    for _ in 0..3 {
        let change = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        if timeline.apply(change) {
            applied += 1;
        }
    }

    assert_eq!(applied, 2);
    assert_eq!(timeline.current_status(), Some(OrderStatus::Shipped));
    let view = timeline.view();
    assert_eq!(view.entries.len(), 2);
    assert_eq!(view.entries[0].status, OrderStatus::Shipped);
    assert_eq!(view.progress.unwrap().step, 3);
}

#[tokio::test]
async fn test_update_replaces_entry() {
    let id = "11111111-1111-4111-8111-111111111111";
    let mut timeline = Timeline::new(order(), Vec::new());

    timeline.apply(
        feed::decode(&payload("inserted", id, ORDER, "processing", "2026-03-01T08:00:00+00:00"))
            .unwrap(),
    );
    timeline.apply(
        feed::decode(&payload("updated", id, ORDER, "out_for_delivery", "2026-03-01T08:00:00+00:00"))
            .unwrap(),
    );

    assert_eq!(timeline.entries().len(), 1);
    assert_eq!(timeline.current_status(), Some(OrderStatus::OutForDelivery));
}
