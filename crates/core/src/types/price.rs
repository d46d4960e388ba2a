//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., đồng, not hào).
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

    /// Create a VND price from a whole-đồng amount.
    #[must_use]
    pub fn vnd(amount: i64) -> Self {
        Self {
            amount: Decimal::new(amount, 0),
            currency_code: CurrencyCode::VND,
        }
    }
}

impl fmt::Display for Price {
    /// Format for display the way the storefront shows prices,
    /// e.g. `120.000 ₫` for VND or `$19.99` for USD.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.currency_code {
            CurrencyCode::VND => {
                write!(f, "{} ₫", group_thousands(&self.amount.trunc().to_string()))
            }
            CurrencyCode::USD => write!(f, "${:.2}", self.amount),
        }
    }
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    VND,
    USD,
}

/// Insert `.` thousands separators into a decimal integer string (vi-VN style).
fn group_thousands(digits: &str) -> String {
    let (sign, digits) = digits
        .strip_prefix('-')
        .map_or(("", digits), |rest| ("-", rest));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && i % 3 == offset % 3 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vnd_display_grouping() {
        assert_eq!(Price::vnd(0).to_string(), "0 ₫");
        assert_eq!(Price::vnd(500).to_string(), "500 ₫");
        assert_eq!(Price::vnd(50_000).to_string(), "50.000 ₫");
        assert_eq!(Price::vnd(1_250_000).to_string(), "1.250.000 ₫");
    }

    #[test]
    fn test_usd_display() {
        let price = Price::new(Decimal::new(1999, 2), CurrencyCode::USD);
        assert_eq!(price.to_string(), "$19.99");
    }
}
