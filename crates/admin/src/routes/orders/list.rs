//! Order listing.

use std::collections::HashMap;

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use soko_backend::db::OrderRepository;
use soko_backend::models::{OrderItem, OrderSummary};
use soko_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::extract::{Json, Query};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    /// An order status, or `all`.
    pub status: Option<String>,
}

impl OrdersQuery {
    /// The status to filter by. Empty and `all` mean no filter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown status.
    pub fn status_filter(&self) -> Result<Option<OrderStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("" | "all") => Ok(None),
            Some(raw) => raw
                .parse::<OrderStatus>()
                .map(Some)
                .map_err(|e| AppError::BadRequest(e.to_string())),
        }
    }
}

/// Order with its customer and line items.
#[derive(Debug, Serialize)]
pub struct AdminOrderListItem {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub items: Vec<OrderItem>,
}

/// `GET /api/orders?status=`
#[instrument(skip(state, admin, query), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<AdminOrderListItem>>> {
    let status = query.status_filter()?;
    let repo = OrderRepository::new(state.pool());
    let summaries = repo.list_all(status).await?;

    let ids: Vec<OrderId> = summaries.iter().map(|s| s.order.id).collect();
    let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in repo.items_for_orders(&ids).await? {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let orders = summaries
        .into_iter()
        .map(|summary| {
            let items = items_by_order.remove(&summary.order.id).unwrap_or_default();
            AdminOrderListItem { summary, items }
        })
        .collect();
    Ok(Json(orders))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(status: Option<&str>) -> OrdersQuery {
        OrdersQuery {
            status: status.map(String::from),
        }
    }

    #[test]
    fn test_all_and_empty_mean_no_filter() {
        assert_eq!(query(None).status_filter().unwrap(), None);
        assert_eq!(query(Some("all")).status_filter().unwrap(), None);
        assert_eq!(query(Some("")).status_filter().unwrap(), None);
    }

    #[test]
    fn test_known_status_filters() {
        assert_eq!(
            query(Some("out_for_delivery")).status_filter().unwrap(),
            Some(OrderStatus::OutForDelivery)
        );
    }

    #[test]
    fn test_unknown_status_is_bad_request() {
        let err = query(Some("lost")).status_filter().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
