//! Status enums for orders, payments, wallets, and users.
//!
//! Every enum maps to a `PostgreSQL` enum type in the `shop` schema and
//! serializes as `snake_case`.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Generates `as_str`, `Display`, and `FromStr` for a unit-only enum.
macro_rules! string_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Database and wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseStatusError::new($kind, other)),
                }
            }
        }
    };
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    OrderPlaced,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus, "order status", {
    OrderPlaced => "order_placed",
    Processing => "processing",
    Shipped => "shipped",
    OutForDelivery => "out_for_delivery",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// The progress sequence shown to customers. `Cancelled` is not part of it.
    pub const PROGRESS: [Self; 5] = [
        Self::OrderPlaced,
        Self::Processing,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Every status, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::OrderPlaced,
        Self::Processing,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OrderPlaced => "Order Placed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Position in [`Self::PROGRESS`], or `None` for `Cancelled`.
    #[must_use]
    pub fn progress_index(self) -> Option<usize> {
        Self::PROGRESS.iter().position(|s| *s == self)
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

string_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
    Refunded => "refunded",
});

/// How the customer chose to pay.
///
/// Only `Wallet` settles immediately; the others are placeholders that leave
/// the order pending until an admin marks it paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(alias = "stripe")]
    Card,
    Paypal,
    #[serde(alias = "m-pesa")]
    Mpesa,
    Wallet,
}

string_enum!(PaymentMethod, "payment method", {
    Card => "card",
    Paypal => "paypal",
    Mpesa => "mpesa",
    Wallet => "wallet",
});

impl PaymentMethod {
    /// Human-readable label for invoices.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Card",
            Self::Paypal => "PayPal",
            Self::Mpesa => "M-Pesa",
            Self::Wallet => "Wallet",
        }
    }

    /// Payment status an order starts with when paid this way.
    #[must_use]
    pub const fn initial_payment_status(self) -> PaymentStatus {
        match self {
            Self::Wallet => PaymentStatus::Paid,
            Self::Card | Self::Paypal | Self::Mpesa => PaymentStatus::Pending,
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

string_enum!(UserRole, "user role", {
    Customer => "customer",
    Admin => "admin",
});

/// Kind of wallet movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.wallet_transaction_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum WalletTransactionKind {
    Deposit,
    Withdrawal,
    Purchase,
    Refund,
}

string_enum!(WalletTransactionKind, "wallet transaction kind", {
    Deposit => "deposit",
    Withdrawal => "withdrawal",
    Purchase => "purchase",
    Refund => "refund",
});

/// Settlement state of a wallet transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.wallet_transaction_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum WalletTransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Cancelled,
}

string_enum!(WalletTransactionStatus, "wallet transaction status", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Cancelled => "cancelled",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("lost_in_transit".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_labels() {
        assert_eq!(OrderStatus::OutForDelivery.label(), "Out for Delivery");
        assert_eq!(OrderStatus::OrderPlaced.label(), "Order Placed");
    }

    #[test]
    fn test_progress_index_excludes_cancelled() {
        assert_eq!(OrderStatus::OrderPlaced.progress_index(), Some(0));
        assert_eq!(OrderStatus::Delivered.progress_index(), Some(4));
        assert_eq!(OrderStatus::Cancelled.progress_index(), None);
    }

    #[test]
    fn test_payment_method_aliases() {
        let card: PaymentMethod = serde_json::from_str("\"stripe\"").unwrap();
        assert_eq!(card, PaymentMethod::Card);
        let mpesa: PaymentMethod = serde_json::from_str("\"m-pesa\"").unwrap();
        assert_eq!(mpesa, PaymentMethod::Mpesa);
    }

    #[test]
    fn test_only_wallet_payments_start_paid() {
        assert_eq!(
            PaymentMethod::Wallet.initial_payment_status(),
            PaymentStatus::Paid
        );
        assert_eq!(
            PaymentMethod::Mpesa.initial_payment_status(),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_parse_error_names_kind() {
        let err = "root".parse::<UserRole>().unwrap_err();
        assert_eq!(err.to_string(), "unknown user role: root");
    }
}
