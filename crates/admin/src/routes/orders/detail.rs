//! Order detail view.

use axum::extract::State;
use serde::Serialize;
use tracing::instrument;

use soko_backend::db::{OrderRepository, ProfileRepository};
use soko_backend::models::{Order, OrderItem, Profile};
use soko_core::{OrderId, Timeline, TimelineView};

use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Order with customer, items, and tracking timeline.
#[derive(Debug, Serialize)]
pub struct AdminOrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<Profile>,
    pub items: Vec<OrderItem>,
    pub timeline: TimelineView,
}

pub(super) async fn find_order(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
}

/// `GET /api/orders/{id}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<AdminOrderDetail>> {
    let order = find_order(&state, id).await?;
    let customer = ProfileRepository::new(state.pool())
        .get_by_id(order.user_id)
        .await?;
    let detail = OrderRepository::new(state.pool()).detail(order).await?;
    let timeline = Timeline::new(detail.order.id, detail.tracking).view();

    Ok(Json(AdminOrderDetail {
        order: detail.order,
        customer,
        items: detail.items,
        timeline,
    }))
}
