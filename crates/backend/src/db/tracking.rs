//! Tracking repository and the `update-order-status` operation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use soko_core::{OrderId, OrderStatus, PaymentStatus, TrackingEntry};

use super::RepositoryError;

const TRACKING_COLUMNS: &str = "id, order_id, status, status_message, tracking_number, \
    estimated_delivery, actual_delivery, location, created_at, updated_at";

/// A status change requested for an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<OrderStatus>,
    pub status_message: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

impl StatusUpdate {
    /// Message stored on the entry, defaulting to a generated sentence.
    #[must_use]
    pub fn message_for(&self, status: OrderStatus) -> String {
        self.status_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map_or_else(|| format!("Order status updated to {status}"), str::to_owned)
    }
}

/// Repository for order tracking history.
pub struct TrackingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TrackingRepository<'a> {
    /// Create a new tracking repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Tracking entries of an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<TrackingEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {TRACKING_COLUMNS} FROM shop.order_tracking \
             WHERE order_id = $1 ORDER BY created_at, id"
        );
        let entries = sqlx::query_as::<_, TrackingEntry>(&sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;
        Ok(entries)
    }

    /// Record a new status for an order.
    ///
    /// Inserts a tracking entry and sets the order's status in one
    /// transaction. Delivered entries get `actual_delivery` stamped. No
    /// transition rules apply.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        update: &StatusUpdate,
    ) -> Result<TrackingEntry, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE shop.orders
            SET status = $2, payment_status = COALESCE($3, payment_status)
            WHERE id = $1
            ",
        )
        .bind(order_id)
        .bind(status)
        .bind(update.payment_status)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let actual_delivery = (status == OrderStatus::Delivered).then(Utc::now);
        let sql = format!(
            r"
            INSERT INTO shop.order_tracking
                (order_id, status, status_message, tracking_number, estimated_delivery,
                 actual_delivery, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRACKING_COLUMNS}
            "
        );
        let entry = sqlx::query_as::<_, TrackingEntry>(&sql)
            .bind(order_id)
            .bind(status)
            .bind(update.message_for(status))
            .bind(update.tracking_number.as_deref())
            .bind(update.estimated_delivery)
            .bind(actual_delivery)
            .bind(update.location.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, status = %status, "Order status updated");

        Ok(entry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_defaults_to_status_sentence() {
        let update = StatusUpdate::default();
        assert_eq!(
            update.message_for(OrderStatus::Shipped),
            "Order status updated to shipped"
        );
    }

    #[test]
    fn test_blank_message_uses_default() {
        let update = StatusUpdate {
            status_message: Some("   ".to_owned()),
            ..StatusUpdate::default()
        };
        assert_eq!(
            update.message_for(OrderStatus::Processing),
            "Order status updated to processing"
        );
    }

    #[test]
    fn test_explicit_message_is_kept() {
        let update: StatusUpdate = serde_json::from_str(
            r#"{"status": "out_for_delivery", "status_message": "With rider", "location": "Westlands"}"#,
        )
        .unwrap();
        assert_eq!(update.status, Some(OrderStatus::OutForDelivery));
        assert_eq!(update.message_for(OrderStatus::OutForDelivery), "With rider");
    }
}
