//! Session-related types.
//!
//! Types stored in the session for authentication state and preferences.

use serde::{Deserialize, Serialize};

use soko_backend::models::Profile;
use soko_core::{Email, UserId, UserRole};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Profile ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    pub role: UserRole,
}

impl From<&Profile> for CurrentUser {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            role: profile.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the display currency code.
    pub const PREFERRED_CURRENCY: &str = "preferred_currency";
}
