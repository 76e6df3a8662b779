//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use soko_backend::models::Profile;
use soko_core::{Email, UserId};

/// Session-stored admin identity.
///
/// The role is re-read from the database on every request, so it is not
/// cached here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Profile ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
}

impl From<&Profile> for CurrentAdmin {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            name: profile.display_name(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
