//! Printable invoices.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use soko_backend::db::{OrderRepository, SettingsRepository};
use soko_backend::invoice;
use soko_core::{Currency, OrderId};

use super::detail::find_order;
use crate::error::{AppError, Result};
use crate::extract::Path;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/orders/{id}/invoice`
///
/// Opens inline for printing. Amounts are always in KES.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn invoice(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    let order = find_order(&state, id).await?;
    let items = OrderRepository::new(state.pool()).items(order.id).await?;
    let store = SettingsRepository::new(state.pool()).load_store().await?;

    let html = invoice::render(&store, &order, &items, Currency::BASE)
        .map_err(|e| AppError::Internal(format!("invoice render failed: {e}")))?;
    let disposition = format!(
        "inline; filename=\"{}\"",
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
