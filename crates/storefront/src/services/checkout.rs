//! Checkout request validation.
//!
//! Turns the posted checkout form into a [`NewOrder`]. Card details are
//! checked for shape and then dropped; nothing about the card is persisted.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use soko_backend::db::PlaceOrderError;
use soko_backend::models::{Address, NewOrder};
use soko_core::{Email, PaymentMethod, PricingPolicy, UserId};

/// Reasons a checkout request is refused.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("card details are required for card payments")]
    CardDetailsRequired,

    #[error("invalid card: {0}")]
    InvalidCard(&'static str),

    #[error(transparent)]
    Order(#[from] PlaceOrderError),
}

/// Address fields as posted. Everything is optional so missing fields can be
/// reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl AddressForm {
    /// Validate required fields and build an [`Address`].
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` naming the first blank required field,
    /// or `CheckoutError::InvalidEmail`.
    pub fn into_address(self) -> Result<Address, CheckoutError> {
        let first_name = required(self.first_name, "first_name")?;
        let last_name = required(self.last_name, "last_name")?;
        let email = required(self.email, "email")?;
        let email = Email::parse(&email)
            .map_err(|_| CheckoutError::InvalidEmail)?
            .into_inner();
        let address = required(self.address, "address")?;
        let city = required(self.city, "city")?;
        let zip_code = required(self.zip_code, "zip_code")?;

        Ok(Address {
            first_name,
            last_name,
            email,
            phone: optional(self.phone),
            address,
            city,
            state: optional(self.state),
            zip_code,
            country: optional(self.country).unwrap_or_else(|| "United States".to_string()),
        })
    }
}

/// Card fields. Validated, never stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardDetails {
    pub card_number: Option<String>,
    pub expiry_date: Option<String>,
    pub cvv: Option<String>,
    pub card_name: Option<String>,
}

impl CardDetails {
    /// Check number length, `MM/YY` expiry not in the past, and CVV length.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::CardDetailsRequired` when a field is blank,
    /// `CheckoutError::InvalidCard` when a field is malformed.
    pub fn validate(&self, today: NaiveDate) -> Result<(), CheckoutError> {
        let number = present(self.card_number.as_deref())?;
        let expiry = present(self.expiry_date.as_deref())?;
        let cvv = present(self.cvv.as_deref())?;
        present(self.card_name.as_deref())?;

        let digits: String = number.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
        if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(CheckoutError::InvalidCard("card number"));
        }

        let (month, year) = parse_expiry(expiry).ok_or(CheckoutError::InvalidCard("expiry date"))?;
        if (year, month) < (today.year(), today.month()) {
            return Err(CheckoutError::InvalidCard("card has expired"));
        }

        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(CheckoutError::InvalidCard("cvv"));
        }
        Ok(())
    }
}

/// `POST /api/checkout` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub billing: AddressForm,
    /// Defaults to the billing address.
    pub shipping: Option<AddressForm>,
    pub payment_method: PaymentMethod,
    pub card: Option<CardDetails>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Validate the request and build the order to place.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` for missing address fields or bad card details.
    pub fn into_new_order(
        self,
        user_id: UserId,
        pricing: PricingPolicy,
        today: NaiveDate,
    ) -> Result<NewOrder, CheckoutError> {
        if self.payment_method == PaymentMethod::Card {
            self.card
                .as_ref()
                .ok_or(CheckoutError::CardDetailsRequired)?
                .validate(today)?;
        }

        let billing_address = self.billing.into_address()?;
        let shipping_address = match self.shipping {
            Some(form) => form.into_address()?,
            None => billing_address.clone(),
        };

        Ok(NewOrder {
            user_id,
            payment_method: self.payment_method,
            payment_reference: optional(self.payment_reference),
            billing_address,
            shipping_address,
            notes: optional(self.notes),
            pricing,
            discount: Decimal::ZERO,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, CheckoutError> {
    optional(value).ok_or(CheckoutError::MissingField(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn present(value: Option<&str>) -> Result<&str, CheckoutError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(CheckoutError::CardDetailsRequired)
}

/// Parse `MM/YY` or `MM/YYYY`.
fn parse_expiry(value: &str) -> Option<(u32, i32)> {
    let (month, year) = value.split_once('/')?;
    let month: u32 = month.trim().parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let year = year.trim();
    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };
    Some((month, year))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn billing() -> AddressForm {
        AddressForm {
            first_name: Some("Amina".into()),
            last_name: Some("Otieno".into()),
            email: Some("amina@soko.test".into()),
            address: Some("12 Kenyatta Ave".into()),
            city: Some("Nairobi".into()),
            zip_code: Some("00100".into()),
            ..AddressForm::default()
        }
    }

    fn card() -> CardDetails {
        CardDetails {
            card_number: Some("4242 4242 4242 4242".into()),
            expiry_date: Some("08/27".into()),
            cvv: Some("123".into()),
            card_name: Some("Amina Otieno".into()),
        }
    }

    fn request(payment_method: PaymentMethod) -> CheckoutRequest {
        CheckoutRequest {
            billing: billing(),
            shipping: None,
            payment_method,
            card: None,
            payment_reference: None,
            notes: Some("  ".into()),
        }
    }

    #[test]
    fn test_address_defaults_country() {
        let address = billing().into_address().unwrap();
        assert_eq!(address.country, "United States");
        assert_eq!(address.phone, None);
    }

    #[test]
    fn test_missing_field_is_named() {
        let form = AddressForm {
            city: Some(" ".into()),
            ..billing()
        };
        let err = form.into_address().unwrap_err();
        assert_eq!(err.to_string(), "city is required");
    }

    #[test]
    fn test_invalid_billing_email() {
        let form = AddressForm {
            email: Some("not-an-email".into()),
            ..billing()
        };
        assert!(matches!(form.into_address(), Err(CheckoutError::InvalidEmail)));
    }

    #[test]
    fn test_card_payment_requires_card() {
        let err = request(PaymentMethod::Card)
            .into_new_order(UserId::new(uuid::Uuid::nil()), PricingPolicy::default(), today())
            .unwrap_err();
        assert!(matches!(err, CheckoutError::CardDetailsRequired));
    }

    #[test]
    fn test_card_validation() {
        assert!(card().validate(today()).is_ok());

        let expired = CardDetails {
            expiry_date: Some("05/26".into()),
            ..card()
        };
        assert!(matches!(
            expired.validate(today()),
            Err(CheckoutError::InvalidCard("card has expired"))
        ));

        let short = CardDetails {
            card_number: Some("4242".into()),
            ..card()
        };
        assert!(short.validate(today()).is_err());

        let bad_cvv = CardDetails {
            cvv: Some("12a".into()),
            ..card()
        };
        assert!(bad_cvv.validate(today()).is_err());
    }

    #[test]
    fn test_shipping_defaults_to_billing() {
        let order = request(PaymentMethod::Wallet)
            .into_new_order(UserId::new(uuid::Uuid::nil()), PricingPolicy::default(), today())
            .unwrap();
        assert_eq!(order.shipping_address, order.billing_address);
        assert_eq!(order.notes, None);
    }

    #[test]
    fn test_parse_expiry_formats() {
        assert_eq!(parse_expiry("08/27"), Some((8, 2027)));
        assert_eq!(parse_expiry("8/2031"), Some((8, 2031)));
        assert_eq!(parse_expiry("13/27"), None);
        assert_eq!(parse_expiry("0827"), None);
    }
}
