//! Soko Core - Shared types library.
//!
//! This crate provides common types used across all Soko components:
//! - `backend` - Database access, change feed, and file storage
//! - `storefront` - Public-facing shop API
//! - `admin` - Internal administration API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, currencies, and statuses
//! - [`pricing`] - Order totals, cart summaries, and order numbers
//! - [`tracking`] - Order tracking timeline

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod tracking;
pub mod types;

pub use pricing::{CartSummary, OrderTotals, PricingPolicy};
pub use tracking::{Progress, Step, Timeline, TimelineView, TrackingChange, TrackingEntry};
pub use types::*;
