//! User management route handlers.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use soko_backend::db::ProfileRepository;
use soko_backend::models::Profile;
use soko_core::{UserId, UserRole};

use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

/// `GET /api/users`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<Profile>>> {
    Ok(Json(ProfileRepository::new(state.pool()).list().await?))
}

/// `PUT /api/users/{id}/role`
///
/// Admins cannot demote themselves, and the last remaining admin cannot be
/// demoted by anyone (409).
#[instrument(skip(state, admin, request), fields(admin_id = %admin.id, user_id = %id))]
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<Profile>> {
    if id == admin.id && request.role != UserRole::Admin {
        return Err(AppError::BadRequest(
            "You cannot remove your own admin role".to_string(),
        ));
    }
    let profile = ProfileRepository::new(state.pool())
        .update_role(id, request.role)
        .await?;
    tracing::info!(role = %profile.role, "User role changed");
    Ok(Json(profile))
}
