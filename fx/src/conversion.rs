//! Conversion result types.

use fxwidget_common::{CurrencyCode, RateSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::formatter::format_rate;

/// Which branch of the conversion produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionStatus {
    /// Amount converted at a cached rate.
    Converted,
    /// Amount text was not a non-negative number, or the converted amount
    /// is out of range.
    InvalidInput,
    /// No rate table for the source currency yet.
    Loading,
    /// Rate table present but it does not quote the target.
    MissingTarget,
}

/// Outcome of converting one amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Parsed input amount, zero when the input was invalid.
    pub source_amount: Decimal,
    /// Currency converted from.
    pub source_currency: CurrencyCode,
    /// Currency converted to.
    pub target_currency: CurrencyCode,
    /// Rate used. `None` while loading or when no rate is available.
    pub rate: Option<Decimal>,
    /// Where the rate came from.
    pub rate_source: Option<RateSource>,
    /// Text for the converted-amount field.
    pub display_value: String,
    /// Which branch produced this result.
    pub status: ConversionStatus,
}

impl ConversionResult {
    /// Rate line such as `1 SGD = 0.7367 USD`, when a rate was used.
    pub fn rate_info(&self) -> Option<String> {
        self.rate.map(|rate| {
            format!(
                "1 {} = {} {}",
                self.source_currency,
                format_rate(rate),
                self.target_currency
            )
        })
    }

    /// Whether the rate came from fallback data rather than the service.
    pub fn is_approximate(&self) -> bool {
        self.rate_source == Some(RateSource::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn result(rate: Option<Decimal>) -> ConversionResult {
        ConversionResult {
            source_amount: dec!(1000),
            source_currency: CurrencyCode::sgd(),
            target_currency: CurrencyCode::usd(),
            rate,
            rate_source: rate.map(|_| RateSource::Fallback),
            display_value: "736.70".to_string(),
            status: ConversionStatus::Converted,
        }
    }

    #[test]
    fn test_rate_info() {
        assert_eq!(
            result(Some(dec!(0.7367))).rate_info().as_deref(),
            Some("1 SGD = 0.7367 USD")
        );
        assert_eq!(result(None).rate_info(), None);
    }

    #[test]
    fn test_is_approximate() {
        assert!(result(Some(dec!(0.7367))).is_approximate());
        assert!(!result(None).is_approximate());
    }
}
