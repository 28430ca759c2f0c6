//! Type-safe price representation using decimal arithmetic.
//!
//! Cart totals are summed as [`Decimal`] so `0.1 + 0.2` stays `0.30` and the
//! derived total always equals what the backend computes from the same lines.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A price in the default currency.
    #[must_use]
    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::default())
    }
}

impl fmt::Display for Price {
    /// Formats as symbol plus two decimal places, e.g. `$19.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.amount.round_dp(2);
        write!(f, "{}{rounded:.2}", self.currency_code.symbol())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_cents() {
        assert_eq!(Price::usd(Decimal::new(20, 0)).to_string(), "$20.00");
        assert_eq!(Price::usd(Decimal::new(1999, 2)).to_string(), "$19.99");
    }

    #[test]
    fn test_display_rounds_sub_cent_amounts() {
        let price = Price::new(Decimal::new(10_005, 3), CurrencyCode::GBP);
        assert_eq!(price.to_string(), "£10.00");
    }
}
