//! Order status updates.
//!
//! Writing the tracking row is enough for live updates: the database trigger
//! on `shop.order_tracking` notifies the storefront's change feed.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use soko_backend::RepositoryError;
use soko_backend::db::{OrderRepository, StatusUpdate, TrackingRepository};
use soko_core::{OrderId, PaymentStatus, TrackingEntry};

use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub tracking: TrackingEntry,
}

/// `POST /api/orders/{id}/status`
///
/// Appends a tracking entry and sets the order status. Any status may follow
/// any other.
#[instrument(skip(state, admin, update), fields(admin_id = %admin.id, order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<UpdateStatusResponse>> {
    let status = update
        .status
        .ok_or_else(|| AppError::BadRequest("orderId and status are required".to_string()))?;

    let tracking = TrackingRepository::new(state.pool())
        .update_status(id, status, &update)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order".to_string()),
            other => other.into(),
        })?;

    Ok(Json(UpdateStatusResponse {
        success: true,
        tracking,
    }))
}

/// `PUT /api/orders/{id}/payment-status`
///
/// Changes only the payment status. No tracking entry is written.
#[instrument(skip(state, admin), fields(admin_id = %admin.id, order_id = %id))]
pub async fn update_payment_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(update): Json<PaymentStatusUpdate>,
) -> Result<Json<PaymentStatusResponse>> {
    OrderRepository::new(state.pool())
        .update_payment_status(id, update.payment_status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order".to_string()),
            other => other.into(),
        })?;

    tracing::info!(payment_status = %update.payment_status, "Payment status updated");

    Ok(Json(PaymentStatusResponse {
        success: true,
        payment_status: update.payment_status,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_update_parses() {
        let update: PaymentStatusUpdate =
            serde_json::from_str(r#"{"payment_status": "refunded"}"#).unwrap();
        assert_eq!(update.payment_status, PaymentStatus::Refunded);
    }
}
