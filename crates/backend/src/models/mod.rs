//! Domain records persisted in the `shop` schema.

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod contact;
pub mod order;
pub mod profile;
pub mod settings;
pub mod wallet;

pub use analytics::{DailySales, DashboardAnalytics, DashboardTotals, TopProduct};
pub use cart::{CartLine, MAX_LINE_QUANTITY, WishlistLine};
pub use catalog::{Brand, BrandInput, Category, CategoryInput, Product, ProductFilter, ProductInput};
pub use contact::{ContactSubmission, NewContactSubmission};
pub use order::{Address, NewOrder, Order, OrderDetail, OrderItem, OrderSummary};
pub use profile::{Profile, ProfileUpdate};
pub use settings::StoreSettings;
pub use wallet::{Wallet, WalletTransaction};
