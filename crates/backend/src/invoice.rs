//! Printable HTML invoices.

use askama::Template;
use rust_decimal::Decimal;

use soko_core::Currency;

use crate::models::{Address, Order, OrderItem, StoreSettings};

struct InvoiceLine {
    name: String,
    quantity: i32,
    unit_price: String,
    total: String,
}

#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoiceTemplate<'a> {
    store_name: &'a str,
    store_address: &'a str,
    bill_to: &'a Address,
    order_number: &'a str,
    order_id: String,
    date: String,
    payment_method: &'static str,
    lines: Vec<InvoiceLine>,
    subtotal: String,
    tax: Option<String>,
    shipping: Option<String>,
    discount: Option<String>,
    total: String,
}

/// Render an order as a standalone HTML invoice with amounts in `currency`.
///
/// # Errors
///
/// Returns `askama::Error` if rendering fails.
pub fn render(
    store: &StoreSettings,
    order: &Order,
    items: &[OrderItem],
    currency: Currency,
) -> Result<String, askama::Error> {
    let money = |amount: Decimal| currency.format_from_base(amount);
    let non_zero = |amount: Decimal| (!amount.is_zero()).then(|| money(amount));

    InvoiceTemplate {
        store_name: &store.store_name,
        store_address: &store.store_address,
        bill_to: &order.billing_address.0,
        order_number: &order.order_number,
        order_id: order.id.to_string(),
        date: order.created_at.format("%B %-d, %Y").to_string(),
        payment_method: order.payment_method.label(),
        lines: items
            .iter()
            .map(|item| InvoiceLine {
                name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price: money(item.unit_price),
                total: money(item.total_price),
            })
            .collect(),
        subtotal: money(order.subtotal),
        tax: non_zero(order.tax_amount),
        shipping: non_zero(order.shipping_amount),
        discount: non_zero(order.discount_amount),
        total: money(order.total_amount),
    }
    .render()
}

/// `Content-Disposition` file name for an order's invoice.
#[must_use]
pub fn file_name(order_number: &str) -> String {
    format!("invoice-{order_number}.html")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    use soko_core::{
        OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
    };

    use super::*;

    fn address() -> Address {
        Address {
            first_name: "Wanjiru".to_owned(),
            last_name: "Kamau".to_owned(),
            email: "wanjiru@example.com".to_owned(),
            phone: None,
            address: "12 Ngong Road".to_owned(),
            city: "Nairobi".to_owned(),
            state: None,
            zip_code: "00100".to_owned(),
            country: "Kenya".to_owned(),
        }
    }

    fn order(tax: Decimal) -> Order {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 10, 0, 0).unwrap();
        Order {
            id: OrderId::new(Uuid::from_u128(5)),
            user_id: UserId::new(Uuid::from_u128(6)),
            order_number: "ORD-20260307-0042".to_owned(),
            status: OrderStatus::OrderPlaced,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Mpesa,
            payment_reference: None,
            subtotal: Decimal::from(2000),
            tax_amount: tax,
            shipping_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount: Decimal::from(2000) + tax,
            billing_address: Json(address()),
            shipping_address: Json(address()),
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn items() -> Vec<OrderItem> {
        vec![OrderItem {
            id: OrderItemId::new(Uuid::from_u128(8)),
            order_id: OrderId::new(Uuid::from_u128(5)),
            product_id: Some(ProductId::new(Uuid::from_u128(9))),
            product_name: "Kiondo <Basket>".to_owned(),
            quantity: 2,
            unit_price: Decimal::from(1000),
            total_price: Decimal::from(2000),
        }]
    }

    #[test]
    fn test_invoice_contains_order_details() {
        let html = render(
            &StoreSettings::default(),
            &order(Decimal::from(160)),
            &items(),
            Currency::Kes,
        )
        .unwrap();

        assert!(html.contains("Invoice #:</strong> ORD-20260307-0042"));
        assert!(html.contains("Wanjiru Kamau"));
        assert!(html.contains("March 7, 2026"));
        assert!(html.contains("M-Pesa"));
        assert!(html.contains("KSh 2,160.00"));
        assert!(html.contains("Tax:"));
        assert!(!html.contains("Shipping:"));
        assert!(html.contains("Kiondo &#60;Basket&#62;") || html.contains("Kiondo &lt;Basket&gt;"));
    }

    #[test]
    fn test_invoice_converts_currency_and_hides_zero_tax() {
        let html = render(
            &StoreSettings::default(),
            &order(Decimal::ZERO),
            &items(),
            Currency::Usd,
        )
        .unwrap();
        assert!(html.contains("$15.40"));
        assert!(!html.contains("Tax:"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("ORD-20260307-0042"), "invoice-ORD-20260307-0042.html");
    }
}
