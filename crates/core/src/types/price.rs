//! Monetary amounts attached to variant snapshots.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with its ISO 4217 currency code.
///
/// The amount is kept as a [`Decimal`] and serialized as a string, matching
/// how the storefront API reports money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD").
    pub currency_code: String,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// Currency symbol for common codes, if known.
    #[must_use]
    pub fn symbol(&self) -> Option<&'static str> {
        match self.currency_code.as_str() {
            "USD" | "CAD" | "AUD" | "NZD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            _ => None,
        }
    }
}

impl fmt::Display for Money {
    /// Formats as `$19.99`, or `19.99 SEK` for codes without a known symbol.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.amount.round_dp(2);
        match self.symbol() {
            Some(symbol) => write!(f, "{symbol}{amount:.2}"),
            None => write!(f, "{amount:.2} {}", self.currency_code),
        }
    }
}
