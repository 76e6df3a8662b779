//! Store settings route handlers.

use axum::extract::State;
use tracing::instrument;

use soko_backend::db::SettingsRepository;
use soko_backend::models::StoreSettings;

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/settings`. Defaults are returned until the first save.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<StoreSettings>> {
    Ok(Json(SettingsRepository::new(state.pool()).load_store().await?))
}

/// `PUT /api/settings`. Omitted fields take their defaults.
#[instrument(skip(state, admin, settings), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(settings): Json<StoreSettings>,
) -> Result<Json<StoreSettings>> {
    settings.validate().map_err(AppError::BadRequest)?;
    SettingsRepository::new(state.pool())
        .save_store(&settings)
        .await?;
    tracing::info!("Store settings saved");
    Ok(Json(settings))
}
