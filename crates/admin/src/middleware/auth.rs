//! Authentication extractors for admin.
//!
//! Every `/api` route except login takes [`RequireAdmin`]. The session only
//! names the profile; the role is checked against the database on each
//! request so a demoted admin loses access immediately.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Extractor that requires a signed-in admin.
///
/// - No session or no admin in it: 401
/// - Profile deleted since login: 401
/// - Profile no longer an admin: 403
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

async fn session_admin(parts: &Parts) -> Option<CurrentAdmin> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = session_admin(parts)
            .await
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        match AdminAuthService::new(state.pool()).current_admin(admin.id).await {
            Ok(_) => Ok(Self(admin)),
            Err(AdminAuthError::InvalidCredentials) => Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}

/// Store the signed-in admin in the session, rotating the session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
