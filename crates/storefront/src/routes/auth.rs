//! Authentication route handlers.
//!
//! Email and password accounts with session cookies.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use soko_backend::db::ProfileRepository;
use soko_backend::models::Profile;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::Json;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

// =============================================================================
// Handlers
// =============================================================================

async fn start_session(session: &Session, profile: &Profile) -> Result<()> {
    set_current_user(session, &CurrentUser::from(profile))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&profile.id, Some(profile.email.as_str()));
    Ok(())
}

/// `POST /api/auth/register`
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Profile>)> {
    let profile = AuthService::new(state.pool())
        .register(Registration {
            email: &request.email,
            password: &request.password,
            first_name: request.first_name.as_deref(),
            last_name: request.last_name.as_deref(),
        })
        .await?;
    start_session(&session, &profile).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `POST /api/auth/login`
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Profile>> {
    let profile = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;
    start_session(&session, &profile).await?;
    tracing::info!(user_id = %profile.id, "Customer logged in");
    Ok(Json(profile))
}

/// `POST /api/auth/logout`
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    let profile = ProfileRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
    Ok(Json(profile))
}

/// `POST /api/auth/password`
#[instrument(skip(state, user, request), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    AuthService::new(state.pool())
        .change_password(user.id, &request.current_password, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth/forgot-password`
///
/// Answers 204 whether or not the email has an account. Delivery happens in
/// the background; without SMTP the link is logged instead.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<StatusCode> {
    let Some((profile, token)) = AuthService::new(state.pool())
        .request_password_reset(&request.email)
        .await?
    else {
        return Ok(StatusCode::NO_CONTENT);
    };

    let link = reset_link(&state.config().base_url, &token);
    if let Some(mailer) = state.mailer().cloned() {
        let to = profile.email.as_str().to_string();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_password_reset(&to, &link).await {
                tracing::error!(error = %e, "Failed to send password reset email");
            }
        });
    } else {
        tracing::warn!(
            user_id = %profile.id,
            link = %link,
            "SMTP not configured - password reset link logged (dev mode)"
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth/reset-password`
#[instrument(skip(state, request))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<StatusCode> {
    AuthService::new(state.pool())
        .reset_password(&request.token, &request.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn reset_link(base_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={token}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_link_joins_base_url() {
        assert_eq!(
            reset_link("https://soko.example/", "ab12"),
            "https://soko.example/reset-password?token=ab12"
        );
        assert_eq!(
            reset_link("http://localhost:3000", "ab12"),
            "http://localhost:3000/reset-password?token=ab12"
        );
    }
}
