//! # Money Types
//!
//! Currency mapping and price types for the storefront.
//! Catalog prices are USD; display prices are converted per country.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    MXN,
    INR,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::MXN => "MXN",
            Currency::INR => "INR",
        }
    }

    /// Display symbol for this currency
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF ",
            Currency::MXN => "MX$",
            Currency::INR => "₹",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, most others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, paise, etc.)
    pub fn to_minor_units(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_minor_units(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a new price from a decimal amount
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_minor_units(amount),
            currency,
        }
    }

    /// Create a price from smallest unit (cents)
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Convenience: a USD price from a decimal amount
    pub fn usd(amount: f64) -> Self {
        Self::new(amount, Currency::USD)
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_minor_units(self.amount)
    }

    /// Format for display (e.g., "$10.00")
    pub fn display(&self) -> String {
        if self.currency.decimal_places() == 0 {
            format!("{}{}", self.currency.symbol(), self.amount)
        } else {
            format!("{}{:.2}", self.currency.symbol(), self.as_decimal())
        }
    }
}

/// A display-converted quote for the viewer's local currency.
///
/// Ephemeral: derived from a cached exchange rate, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalPrice {
    /// Decimal amount in the local currency
    pub amount: f64,
    /// Display symbol
    pub symbol: String,
    /// ISO 4217 code
    pub code: String,
}

impl LocalPrice {
    /// The USD identity quote (used whenever conversion is unavailable)
    pub fn usd(amount: f64) -> Self {
        Self {
            amount,
            symbol: "$".to_string(),
            code: "USD".to_string(),
        }
    }

    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount,
            symbol: currency.symbol().to_string(),
            code: currency.code().to_string(),
        }
    }
}

/// Countries where shopping is enabled for this storefront.
pub const SUPPORTED_COUNTRIES: &[&str] = &[
    "US", "CA", "GB", "AU", "IN", "DE", "FR", "JP", "CH", "MX",
];

/// Static country → display currency table. One entry per supported
/// country; anything else falls back to USD.
const COUNTRY_CURRENCIES: &[(&str, Currency)] = &[
    ("US", Currency::USD),
    ("CA", Currency::CAD),
    ("GB", Currency::GBP),
    ("AU", Currency::AUD),
    ("IN", Currency::INR),
    ("DE", Currency::EUR),
    ("FR", Currency::EUR),
    ("JP", Currency::JPY),
    ("CH", Currency::CHF),
    ("MX", Currency::MXN),
];

/// Map a country code to its display currency (USD fallback)
pub fn currency_for_country(country_code: &str) -> Currency {
    COUNTRY_CURRENCIES
        .iter()
        .find(|(code, _)| *code == country_code)
        .map(|(_, currency)| *currency)
        .unwrap_or(Currency::USD)
}

/// Whether shopping is enabled for the given country
pub fn shopping_supported(country_code: &str) -> bool {
    SUPPORTED_COUNTRIES.contains(&country_code)
}
