//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password login restricted to the admin role

pub mod auth;

pub use auth::{AdminAuthError, AdminAuthService};
