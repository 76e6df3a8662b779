//! Order history, tracking, and invoice handlers.

use std::collections::HashMap;
use std::convert::Infallible;

use async_stream::stream;
use axum::{
    extract::State,
    http::header,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tower_sessions::Session;
use tracing::instrument;

use soko_backend::db::{OrderRepository, SettingsRepository, TrackingRepository};
use soko_backend::invoice;
use soko_backend::models::{Order, OrderItem};
use soko_core::{OrderId, Timeline, TimelineView, TrackingChange, UserId};

use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::routes::currency::preferred_currency;
use crate::state::AppState;

/// Order with its line items.
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order with its line items and tracking timeline.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub timeline: TimelineView,
}

async fn owned_order(state: &AppState, user_id: UserId, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get_for_user(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
}

async fn load_timeline(state: &AppState, order_id: OrderId) -> Result<Timeline> {
    let entries = TrackingRepository::new(state.pool())
        .list_for_order(order_id)
        .await?;
    Ok(Timeline::new(order_id, entries))
}

/// `GET /api/orders`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderWithItems>>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_for_user(user.id).await?;
    let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();

    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in repo.items_for_orders(&ids).await? {
        by_order.entry(item.order_id).or_default().push(item);
    }

    let orders = orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect();
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailResponse>> {
    let order = owned_order(&state, user.id, id).await?;
    let items = OrderRepository::new(state.pool()).items(order.id).await?;
    let timeline = load_timeline(&state, order.id).await?;
    Ok(Json(OrderDetailResponse {
        order,
        items,
        timeline: timeline.view(),
    }))
}

/// `GET /api/orders/{id}/tracking`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn tracking(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<TimelineView>> {
    let order = owned_order(&state, user.id, id).await?;
    Ok(Json(load_timeline(&state, order.id).await?.view()))
}

fn json_event<T: Serialize>(name: &'static str, payload: &T) -> Event {
    match serde_json::to_string(payload) {
        Ok(json) => Event::default().event(name).data(json),
        Err(e) => {
            tracing::error!(error = %e, event = name, "Failed to serialize tracking event");
            Event::default().comment("serialization error")
        }
    }
}

/// `GET /api/orders/{id}/tracking/live`
///
/// Server-sent events: `snapshot` first, then `insert` and `update` for this
/// order. A lagging subscriber gets a fresh `snapshot` instead of the missed
/// changes. The stream ends when the client disconnects.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn live(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>>> {
    let order = owned_order(&state, user.id, id).await?;

    // Subscribe before reading history so nothing lands in between.
    let mut changes = state.feed().subscribe();
    let mut timeline = load_timeline(&state, order.id).await?;
    let pool = state.pool().clone();
    let order_id = order.id;

    let events = stream! {
        yield Ok(json_event("snapshot", &timeline.view()));

        loop {
            match changes.recv().await {
                Ok(change) if change.order_id() == order_id => {
                    let name = match change {
                        TrackingChange::Inserted(_) => "insert",
                        TrackingChange::Updated(_) => "update",
                    };
                    let event = json_event(name, change.entry());
                    timeline.apply(change);
                    yield Ok(event);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%order_id, skipped, "Tracking stream lagged, resending snapshot");
                    match TrackingRepository::new(&pool).list_for_order(order_id).await {
                        Ok(entries) => timeline = Timeline::new(order_id, entries),
                        Err(e) => tracing::warn!(error = %e, "Failed to reload tracking history"),
                    }
                    yield Ok(json_event("snapshot", &timeline.view()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// `GET /api/orders/{id}/invoice`
///
/// HTML download in the session's display currency.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn invoice(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    let order = owned_order(&state, user.id, id).await?;
    let items = OrderRepository::new(state.pool()).items(order.id).await?;
    let store = SettingsRepository::new(state.pool()).load_store().await?;
    let currency = preferred_currency(&session).await;

    let html = invoice::render(&store, &order, &items, currency)
        .map_err(|e| AppError::Internal(format!("invoice render failed: {e}")))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        invoice::file_name(&order.order_number)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        html,
    )
        .into_response())
}
