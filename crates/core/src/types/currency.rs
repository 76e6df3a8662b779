//! Display currencies and conversion from the Kenyan Shilling base.
//!
//! All prices are stored in KES. Other currencies are presentation only and
//! use fixed rates.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Error returned for an unsupported currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency: {0}")]
pub struct CurrencyError(pub String);

/// A supported display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Kes,
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Zar,
    Ngn,
}

/// Serializable description of a currency.
#[derive(Debug, Clone, Serialize)]
pub struct CurrencyInfo {
    pub code: Currency,
    pub name: &'static str,
    pub symbol: &'static str,
    pub locale: &'static str,
    pub rate: Decimal,
}

impl Currency {
    /// Currency every stored amount is denominated in.
    pub const BASE: Self = Self::Kes;

    /// Every supported currency, base first.
    pub const ALL: [Self; 8] = [
        Self::Kes,
        Self::Usd,
        Self::Eur,
        Self::Gbp,
        Self::Cad,
        Self::Aud,
        Self::Zar,
        Self::Ngn,
    ];

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Kes => "KES",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
            Self::Zar => "ZAR",
            Self::Ngn => "NGN",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Kes => "Kenyan Shilling",
            Self::Usd => "US Dollar",
            Self::Eur => "Euro",
            Self::Gbp => "British Pound",
            Self::Cad => "Canadian Dollar",
            Self::Aud => "Australian Dollar",
            Self::Zar => "South African Rand",
            Self::Ngn => "Nigerian Naira",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Kes => "KSh",
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Cad => "C$",
            Self::Aud => "A$",
            Self::Zar => "R",
            Self::Ngn => "₦",
        }
    }

    #[must_use]
    pub const fn locale(self) -> &'static str {
        match self {
            Self::Kes => "en-KE",
            Self::Usd => "en-US",
            Self::Eur => "en-EU",
            Self::Gbp => "en-GB",
            Self::Cad => "en-CA",
            Self::Aud => "en-AU",
            Self::Zar => "en-ZA",
            Self::Ngn => "en-NG",
        }
    }

    /// Units of this currency per one KES.
    #[must_use]
    pub const fn rate(self) -> Decimal {
        match self {
            Self::Kes => Decimal::ONE,
            Self::Usd => Decimal::from_parts(77, 0, 0, false, 4),
            Self::Eur => Decimal::from_parts(71, 0, 0, false, 4),
            Self::Gbp => Decimal::from_parts(61, 0, 0, false, 4),
            Self::Cad => Decimal::from_parts(105, 0, 0, false, 4),
            Self::Aud => Decimal::from_parts(117, 0, 0, false, 4),
            Self::Zar => Decimal::from_parts(14, 0, 0, false, 2),
            Self::Ngn => Decimal::from_parts(125, 0, 0, false, 1),
        }
    }

    #[must_use]
    pub const fn info(self) -> CurrencyInfo {
        CurrencyInfo {
            code: self,
            name: self.name(),
            symbol: self.symbol(),
            locale: self.locale(),
            rate: self.rate(),
        }
    }

    /// Convert a KES amount into this currency.
    #[must_use]
    pub fn from_base(self, amount: Decimal) -> Decimal {
        amount * self.rate()
    }

    /// Convert an amount in this currency back to KES.
    #[must_use]
    pub fn to_base(self, amount: Decimal) -> Decimal {
        amount / self.rate()
    }

    /// Format an amount already expressed in this currency.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use soko_core::Currency;
    ///
    /// assert_eq!(Currency::Usd.format(Decimal::new(123_456_7, 3)), "$1,234.57");
    /// assert_eq!(Currency::Kes.format(Decimal::new(2500, 0)), "KSh 2,500.00");
    /// ```
    #[must_use]
    pub fn format(self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let symbol = self.symbol();
        let separator = if symbol.chars().all(char::is_alphabetic) {
            " "
        } else {
            ""
        };
        let sign = if negative { "-" } else { "" };
        format!("{sign}{symbol}{separator}{}.{fraction}", group_thousands(whole))
    }

    /// Convert a KES amount and format it in this currency.
    #[must_use]
    pub fn format_from_base(self, amount: Decimal) -> String {
        self.format(self.from_base(amount))
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| CurrencyError(code.to_owned()))
    }
}

/// Parse a user-entered amount such as `"KSh 1,250.50"`.
///
/// Everything except digits, `.` and `-` is discarded; unparseable input
/// yields zero.
#[must_use]
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(Decimal::ZERO)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
