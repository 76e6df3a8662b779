//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration, login, password changes, and resets
//! - `checkout` - Checkout form validation
//! - `catalog` - Cached category and brand lists
//! - `email` - SMTP delivery of reset links

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod email;
