//! Admin-side session types.
//!
//! Catalog, order, and profile records come from `soko_backend::models`.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
