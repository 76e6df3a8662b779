//! Soko admin library.
//!
//! The internal admin API as a library, so the binary and the integration
//! tests build the same router.
//!
//! # Security
//!
//! Every route except login and the health probes requires a profile with
//! role `admin`. Bind it to a private interface.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::AdminConfig;
pub use routes::app;
pub use state::AppState;
