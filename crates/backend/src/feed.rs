//! Realtime order tracking feed.
//!
//! A trigger on `shop.order_tracking` publishes every insert and update on
//! the `order_tracking_changes` channel. [`TrackingFeed`] listens on that
//! channel and fans the decoded [`TrackingChange`]s out to in-process
//! subscribers through an [`EventBus`].

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use soko_core::TrackingChange;

/// Postgres NOTIFY channel written by the tracking trigger.
pub const CHANNEL: &str = "order_tracking_changes";

const DEFAULT_CAPACITY: usize = 1024;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// In-process fan-out of tracking changes.
///
/// When the buffer is full the oldest changes are dropped and slow receivers
/// observe `RecvError::Lagged`.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<TrackingChange>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to all current subscribers.
    pub fn publish(&self, change: TrackingChange) {
        // Only fails when nobody is subscribed.
        let _ = self.sender.send(change);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TrackingChange> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Decode a NOTIFY payload.
///
/// # Errors
///
/// Returns the JSON error if the payload is not a tracking change.
pub fn decode(payload: &str) -> Result<TrackingChange, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Handle to the background listener.
#[derive(Debug, Clone)]
pub struct TrackingFeed {
    bus: Arc<EventBus>,
}

impl TrackingFeed {
    /// A feed that is never fed by the database. Changes can still be
    /// published by hand.
    #[must_use]
    pub fn detached() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A detached feed buffering at most `capacity` changes per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bus: Arc::new(EventBus::new(capacity)),
        }
    }

    /// Start listening on [`CHANNEL`] in a background task.
    ///
    /// The task reconnects after [`RECONNECT_DELAY`] whenever the listener
    /// fails.
    #[must_use]
    pub fn spawn(pool: PgPool) -> (Self, JoinHandle<()>) {
        let feed = Self::detached();
        let bus = Arc::clone(&feed.bus);
        let handle = tokio::spawn(async move {
            loop {
                if let Err(e) = listen(&pool, &bus).await {
                    tracing::error!(error = %e, "Tracking feed listener failed, reconnecting");
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        });
        (feed, handle)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TrackingChange> {
        self.bus.subscribe()
    }

    pub fn publish(&self, change: TrackingChange) {
        self.bus.publish(change);
    }
}

async fn listen(pool: &PgPool, bus: &EventBus) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(CHANNEL).await?;
    tracing::info!(channel = CHANNEL, "Tracking feed listening");

    loop {
        let notification = listener.recv().await?;
        match decode(notification.payload()) {
            Ok(change) => {
                tracing::debug!(
                    order_id = %change.order_id(),
                    entry_id = %change.entry().id,
                    "Tracking change received"
                );
                bus.publish(change);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable tracking notification");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use soko_core::OrderStatus;

    use super::*;

    const PAYLOAD: &str = r#"{
        "op": "updated",
        "entry": {
            "id": "6a0e0c0e-7d1c-4a57-9a43-0b5b1f0c7e11",
            "order_id": "1b1f8a4e-46a4-4e0c-8f5d-2b8c1d7f3a90",
            "status": "shipped",
            "status_message": "Handed to courier",
            "tracking_number": "KE123",
            "estimated_delivery": "2026-05-04T12:00:00+00:00",
            "actual_delivery": null,
            "location": "Mombasa",
            "created_at": "2026-05-01T09:30:00.123456+00:00",
            "updated_at": "2026-05-01T09:31:00+00:00"
        }
    }"#;

    #[test]
    fn test_decode_trigger_payload() {
        let change = decode(PAYLOAD).unwrap();
        assert!(matches!(change, TrackingChange::Updated(_)));
        assert_eq!(change.entry().status, OrderStatus::Shipped);
        assert_eq!(change.entry().location.as_deref(), Some("Mombasa"));
    }

    #[test]
    fn test_decode_rejects_unknown_op() {
        assert!(decode(r#"{"op": "deleted", "entry": {}}"#).is_err());
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let feed = TrackingFeed::detached();
        let mut first = feed.subscribe();
        let mut second = feed.subscribe();

        feed.publish(decode(PAYLOAD).unwrap());

        assert_eq!(first.recv().await.unwrap().entry().tracking_number.as_deref(), Some("KE123"));
        assert!(second.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_small_buffer_reports_lag() {
        let feed = TrackingFeed::with_capacity(1);
        let mut slow = feed.subscribe();

        feed.publish(decode(PAYLOAD).unwrap());
        feed.publish(decode(PAYLOAD).unwrap());

        assert!(matches!(
            slow.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert!(slow.recv().await.is_ok());
    }

    #[test]
    fn test_publish_without_subscribers_is_ignored() {
        let bus = EventBus::new(4);
        bus.publish(decode(PAYLOAD).unwrap());
        assert_eq!(bus.subscriber_count(), 0);
    }
}
