//! Image uploads into the storage buckets.

use axum::extract::{Multipart, State};
use tracing::instrument;

use soko_backend::{Bucket, StoredFile};

use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const FOLDER_FIELD: &str = "folder";

/// `POST /api/uploads/{bucket}`
///
/// Multipart with a `file` part and an optional `folder` text part, in any
/// order. Unknown buckets are 404.
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<StoredFile>> {
    let bucket: Bucket = bucket.parse()?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut folder: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        match field.name() {
            Some(FILE_FIELD) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                file = Some((content_type, bytes.to_vec()));
            }
            Some(FOLDER_FIELD) => {
                folder = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    let (content_type, bytes) = file.ok_or_else(|| {
        AppError::BadRequest(format!("Missing multipart field '{FILE_FIELD}'"))
    })?;
    let stored = state
        .files()
        .save(bucket, folder.as_deref(), &content_type, &bytes)
        .await?;

    tracing::info!(bucket = %bucket, path = %stored.path, "Image uploaded");
    Ok(Json(stored))
}
