//! Storefront-only models. Domain rows live in `soko_backend::models`.

pub mod session;

pub use session::{CurrentUser, keys};
