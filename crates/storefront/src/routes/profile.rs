//! Profile route handlers.

use axum::extract::{Multipart, State};
use tracing::instrument;

use soko_backend::db::ProfileRepository;
use soko_backend::models::{Profile, ProfileUpdate};

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Multipart field carrying the avatar image.
const AVATAR_FIELD: &str = "avatar";

/// `GET /api/profile`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    let profile = ProfileRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;
    Ok(Json(profile))
}

/// `PATCH /api/profile`. Omitted fields are left unchanged.
#[instrument(skip(state, user, update), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    let profile = ProfileRepository::new(state.pool())
        .update(user.id, &update)
        .await?;
    Ok(Json(profile))
}

/// `POST /api/profile/avatar` (multipart field `avatar`, JPEG or PNG up to 2 MB)
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<Profile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let stored = state
            .files()
            .save_avatar(user.id, &content_type, &bytes)
            .await?;
        let profile = ProfileRepository::new(state.pool())
            .set_avatar_url(user.id, &stored.url)
            .await?;
        tracing::info!(path = %stored.path, "Avatar uploaded");
        return Ok(Json(profile));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{AVATAR_FIELD}'"
    )))
}
