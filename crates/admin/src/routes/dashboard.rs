//! Dashboard analytics.

use axum::extract::State;
use tracing::instrument;

use soko_backend::db::AnalyticsRepository;
use soko_backend::models::DashboardAnalytics;

use crate::error::Result;
use crate::extract::Json;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/dashboard`
///
/// Store totals, the five best sellers, and the last seven days of sales.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<DashboardAnalytics>> {
    let analytics = AnalyticsRepository::new(state.pool()).dashboard().await?;
    Ok(Json(analytics))
}
