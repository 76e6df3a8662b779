//! Order management route handlers.
//!
//! Listing, detail views, status updates, and printable invoices.

mod actions;
mod detail;
mod list;
mod print;

pub use actions::{
    PaymentStatusResponse, PaymentStatusUpdate, UpdateStatusResponse, update_payment_status,
    update_status,
};
pub use detail::{AdminOrderDetail, show};
pub use list::{AdminOrderListItem, OrdersQuery, index};
pub use print::invoice;
