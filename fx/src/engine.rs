//! Conversion engine.
//!
//! Reads whatever the rate store holds at call time and never starts a
//! fetch itself; fetching is the caller's job (see [`crate::widget`]).

use std::sync::Arc;

use fxwidget_common::CurrencyCode;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::conversion::{ConversionResult, ConversionStatus};
use crate::formatter::{format, Grouping};
use crate::parser::parse_numeric;
use crate::store::{RateLookup, RateStore};

/// Shown while the source currency has no rate table.
pub const LOADING_TEXT: &str = "Loading...";

/// Shown for invalid input or an unquoted target.
pub const ZERO_TEXT: &str = "0.00";

/// Turns amount text plus a currency pair into a display result.
pub struct ConversionEngine {
    store: Arc<RateStore>,
}

impl ConversionEngine {
    /// Create an engine reading from `store`.
    pub fn new(store: Arc<RateStore>) -> Self {
        Self { store }
    }

    /// Convert `raw_amount` from `source` to `target`.
    pub fn convert(
        &self,
        raw_amount: &str,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> ConversionResult {
        let mut result = ConversionResult {
            source_amount: Decimal::ZERO,
            source_currency: source.clone(),
            target_currency: target.clone(),
            rate: None,
            rate_source: None,
            display_value: ZERO_TEXT.to_string(),
            status: ConversionStatus::InvalidInput,
        };

        let amount = match parse_numeric(raw_amount) {
            Ok(amount) if amount >= Decimal::ZERO => amount,
            _ => {
                trace!(raw_amount, "Invalid amount");
                return result;
            }
        };
        result.source_amount = amount;

        match self.store.lookup(source, target) {
            RateLookup::Cold => {
                result.display_value = LOADING_TEXT.to_string();
                result.status = ConversionStatus::Loading;
            }
            RateLookup::MissingTarget => {
                result.status = ConversionStatus::MissingTarget;
            }
            RateLookup::Rate(rate) => match amount.checked_mul(rate) {
                Some(converted) => {
                    result.rate = Some(rate);
                    result.rate_source = self.store.source(source);
                    result.display_value = format(converted, Grouping::Auto);
                    result.status = ConversionStatus::Converted;
                }
                None => {
                    // Product does not fit a Decimal; treat like unreadable input.
                    debug!(amount = %amount, rate = %rate, "Converted amount out of range");
                }
            },
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxwidget_common::{RateSource, RateTable};
    use rust_decimal_macros::dec;

    fn setup_engine() -> ConversionEngine {
        let store = Arc::new(RateStore::new());
        let table: RateTable = [
            (CurrencyCode::usd(), dec!(0.7367)),
            (CurrencyCode::jpy(), dec!(81.25)),
        ]
        .into_iter()
        .collect();
        store.store(CurrencyCode::sgd(), table);
        ConversionEngine::new(store)
    }

    #[test]
    fn test_convert_grouped_input() {
        let engine = setup_engine();

        let result = engine.convert("1,000.00", &CurrencyCode::sgd(), &CurrencyCode::usd());

        assert_eq!(result.display_value, "736.70");
        assert_eq!(result.rate, Some(dec!(0.7367)));
        assert_eq!(result.rate_info().as_deref(), Some("1 SGD = 0.7367 USD"));
        assert_eq!(result.source_amount, dec!(1000));
        assert_eq!(result.status, ConversionStatus::Converted);
        assert_eq!(result.rate_source, Some(RateSource::Live));
    }

    #[test]
    fn test_convert_groups_large_results() {
        let engine = setup_engine();

        let result = engine.convert("1000", &CurrencyCode::sgd(), &CurrencyCode::jpy());

        assert_eq!(result.display_value, "81,250.00");
    }

    #[test]
    fn test_convert_cold_base_is_loading() {
        let engine = setup_engine();

        for amount in ["1,000.00", "0", "12.5"] {
            let result = engine.convert(amount, &CurrencyCode::eur(), &CurrencyCode::usd());
            assert_eq!(result.display_value, LOADING_TEXT);
            assert_eq!(result.rate, None);
            assert_eq!(result.status, ConversionStatus::Loading);
        }
    }

    #[test]
    fn test_convert_missing_target() {
        let engine = setup_engine();

        let result = engine.convert("10", &CurrencyCode::sgd(), &CurrencyCode::gbp());

        assert_eq!(result.display_value, ZERO_TEXT);
        assert_eq!(result.rate, None);
        assert_eq!(result.status, ConversionStatus::MissingTarget);
    }

    #[test]
    fn test_convert_invalid_or_negative_amount() {
        let engine = setup_engine();

        for amount in ["-5.00", "", ".", "abc"] {
            let result = engine.convert(amount, &CurrencyCode::sgd(), &CurrencyCode::usd());
            assert_eq!(result.display_value, ZERO_TEXT, "amount {amount:?}");
            assert_eq!(result.rate, None);
            assert_eq!(result.status, ConversionStatus::InvalidInput);
        }
    }

    #[test]
    fn test_negative_amount_wins_over_cold_base() {
        let engine = setup_engine();

        let result = engine.convert("-5.00", &CurrencyCode::eur(), &CurrencyCode::usd());

        assert_eq!(result.display_value, ZERO_TEXT);
    }

    #[test]
    fn test_convert_out_of_range_product_shows_zero() {
        let store = Arc::new(RateStore::new());
        store.store_fallback(&CurrencyCode::usd());
        let engine = ConversionEngine::new(store);
        let huge = "9".repeat(28);

        for target in [CurrencyCode::jpy(), CurrencyCode::new("INR")] {
            let result = engine.convert(&huge, &CurrencyCode::usd(), &target);
            assert_eq!(result.display_value, ZERO_TEXT);
            assert_eq!(result.rate, None);
            assert_eq!(result.status, ConversionStatus::InvalidInput);
        }

        let fits = engine.convert(&"9".repeat(20), &CurrencyCode::usd(), &CurrencyCode::jpy());
        assert_eq!(fits.status, ConversionStatus::Converted);
    }

    #[test]
    fn test_convert_reports_fallback_source() {
        let store = Arc::new(RateStore::new());
        store.store_fallback(&CurrencyCode::gbp());
        let engine = ConversionEngine::new(store);

        let result = engine.convert("100", &CurrencyCode::gbp(), &CurrencyCode::usd());

        assert_eq!(result.display_value, "136.15");
        assert!(result.is_approximate());
    }
}
