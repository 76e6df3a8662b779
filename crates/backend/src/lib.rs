//! Soko Backend - Shared data layer.
//!
//! Used by both the storefront and admin services:
//! - [`db`] - Connection pool, migrations, and repositories for the `shop` schema
//! - [`models`] - Row types and inputs
//! - [`feed`] - Realtime order tracking changes via `LISTEN/NOTIFY`
//! - [`storage`] - Image buckets on local disk
//! - [`passwords`] - Argon2 hashing and reset tokens
//! - [`invoice`] - HTML invoices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod db;
pub mod feed;
pub mod invoice;
pub mod models;
pub mod passwords;
pub mod storage;

pub use db::RepositoryError;
pub use feed::{EventBus, TrackingFeed};
pub use storage::{Bucket, FileStore, StorageError, StoredFile};
