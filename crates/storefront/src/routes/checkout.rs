//! Checkout route handler.

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use tracing::instrument;

use soko_backend::db::OrderRepository;
use soko_backend::models::Order;

use crate::error::{Result, add_breadcrumb};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::services::checkout::{CheckoutError, CheckoutRequest};
use crate::state::AppState;

/// `POST /api/checkout`
///
/// Places an order from the user's cart. The cart is emptied on success.
#[instrument(skip(state, user, request), fields(user_id = %user.id, payment_method = %request.payment_method))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let new_order =
        request.into_new_order(user.id, state.config().pricing, Utc::now().date_naive())?;

    let order = OrderRepository::new(state.pool())
        .place(&new_order)
        .await
        .map_err(CheckoutError::from)?;

    let data = [("order_number", order.order_number.as_str())];
    add_breadcrumb("checkout", "Order placed", Some(data.as_slice()));

    Ok((StatusCode::CREATED, Json(order)))
}
