//! Order and cart arithmetic.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Store-wide pricing rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Fraction of the subtotal charged as tax (0.08 = 8%).
    pub tax_rate: Decimal,
    /// Flat shipping fee in KES.
    pub shipping_fee: Decimal,
    /// Subtotal at or above which shipping is free.
    pub free_shipping_threshold: Option<Decimal>,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            shipping_fee: Decimal::ZERO,
            free_shipping_threshold: None,
        }
    }
}

/// Monetary breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals from `(unit_price, quantity)` lines.
    #[must_use]
    pub fn compute<I>(lines: I, policy: &PricingPolicy, discount: Decimal) -> Self
    where
        I: IntoIterator<Item = (Decimal, i32)>,
    {
        let subtotal: Decimal = lines
            .into_iter()
            .map(|(price, qty)| price * Decimal::from(qty))
            .sum();
        let tax = round_money(subtotal * policy.tax_rate);
        let shipping = match policy.free_shipping_threshold {
            Some(threshold) if subtotal >= threshold => Decimal::ZERO,
            _ if subtotal.is_zero() => Decimal::ZERO,
            _ => policy.shipping_fee,
        };
        let discount = discount.max(Decimal::ZERO);
        let total = (subtotal + tax + shipping - discount).max(Decimal::ZERO);

        Self {
            subtotal,
            tax,
            shipping,
            discount,
            total,
        }
    }
}

/// Running totals for a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub total: Decimal,
    pub item_count: i64,
}

impl CartSummary {
    /// Sum `(unit_price, quantity)` lines.
    #[must_use]
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, i32)>,
    {
        lines
            .into_iter()
            .fold(Self::default(), |acc, (price, qty)| Self {
                total: acc.total + price * Decimal::from(qty),
                item_count: acc.item_count + i64::from(qty),
            })
    }
}

/// Round half away from zero to cents.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Build a human-facing order number: `ORD-YYYYMMDD-NNNN`.
#[must_use]
pub fn order_number(date: NaiveDate, sequence: i64) -> String {
    format!("ORD-{}-{sequence:04}", date.format("%Y%m%d"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_policy_charges_eight_percent_tax() {
        let totals = OrderTotals::compute(
            [(dec("1500"), 2), (dec("250.50"), 1)],
            &PricingPolicy::default(),
            Decimal::ZERO,
        );
        assert_eq!(totals.subtotal, dec("3250.50"));
        assert_eq!(totals.tax, dec("260.04"));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, dec("3510.54"));
    }

    #[test]
    fn test_shipping_waived_above_threshold() {
        let policy = PricingPolicy {
            tax_rate: Decimal::ZERO,
            shipping_fee: dec("300"),
            free_shipping_threshold: Some(dec("5000")),
        };
        let below = OrderTotals::compute([(dec("4999"), 1)], &policy, Decimal::ZERO);
        assert_eq!(below.shipping, dec("300"));
        let at = OrderTotals::compute([(dec("5000"), 1)], &policy, Decimal::ZERO);
        assert_eq!(at.shipping, Decimal::ZERO);
    }

    #[test]
    fn test_discount_never_drives_total_negative() {
        let totals = OrderTotals::compute(
            [(dec("100"), 1)],
            &PricingPolicy::default(),
            dec("1000"),
        );
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_cart_summary_counts_units() {
        let summary = CartSummary::from_lines([(dec("10"), 3), (dec("2.5"), 2)]);
        assert_eq!(summary.total, dec("35"));
        assert_eq!(summary.item_count, 5);
        assert_eq!(CartSummary::from_lines(Vec::<(Decimal, i32)>::new()), CartSummary::default());
    }

    #[test]
    fn test_order_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(order_number(date, 42), "ORD-20260307-0042");
        assert_eq!(order_number(date, 123_456), "ORD-20260307-123456");
    }
}
