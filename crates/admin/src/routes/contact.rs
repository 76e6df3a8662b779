//! Contact form inbox.

use axum::extract::State;
use tracing::instrument;

use soko_backend::db::ContactRepository;
use soko_backend::models::ContactSubmission;

use crate::error::Result;
use crate::extract::Json;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/contact-submissions`, newest first.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<ContactSubmission>>> {
    Ok(Json(ContactRepository::new(state.pool()).list().await?))
}
