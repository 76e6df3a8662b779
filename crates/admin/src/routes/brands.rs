//! Brand management route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use soko_backend::db::BrandRepository;
use soko_backend::models::{Brand, BrandInput};
use soko_core::BrandId;

use super::require_name;
use crate::error::Result;
use crate::extract::{Json, Path};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/brands`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<Brand>>> {
    Ok(Json(BrandRepository::new(state.pool()).list().await?))
}

/// `POST /api/brands`
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<BrandInput>,
) -> Result<(StatusCode, Json<Brand>)> {
    require_name(&input.name, "Brand")?;
    let brand = BrandRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

/// `PUT /api/brands/{id}`
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BrandId>,
    Json(input): Json<BrandInput>,
) -> Result<Json<Brand>> {
    require_name(&input.name, "Brand")?;
    let brand = BrandRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(brand))
}

/// `DELETE /api/brands/{id}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BrandId>,
) -> Result<StatusCode> {
    BrandRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
