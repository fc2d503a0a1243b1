//! Display formatting for amounts and rates.
//!
//! Fixed `en-US` convention: `,` groups thousands, `.` separates the
//! fraction.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::parser::{DECIMAL_POINT, GROUP_SEPARATOR};

/// Fractional digits shown for amounts.
pub const AMOUNT_DECIMALS: u32 = 2;

/// Fractional digits shown in the rate-info line.
pub const RATE_DECIMALS: u32 = 4;

/// Smallest rounded value that gets separators under [`Grouping::Auto`].
pub const AUTO_GROUPING_THRESHOLD: Decimal = Decimal::ONE_THOUSAND;

/// Whether thousands separators are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Always group. Used for the amount the user typed.
    Always,
    /// Never group.
    Never,
    /// Group only from 1,000 upward. Used for the converted amount.
    Auto,
}

/// Render an amount with exactly two fractional digits.
pub fn format(value: Decimal, grouping: Grouping) -> String {
    let rounded =
        value.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    let grouped = match grouping {
        Grouping::Always => true,
        Grouping::Never => false,
        Grouping::Auto => rounded >= AUTO_GROUPING_THRESHOLD,
    };
    render_fixed(rounded, AMOUNT_DECIMALS, grouped)
}

/// Render a rate with four fractional digits and no grouping.
pub fn format_rate(rate: Decimal) -> String {
    let rounded =
        rate.round_dp_with_strategy(RATE_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    render_fixed(rounded, RATE_DECIMALS, false)
}

// `value` is already rounded to at most `places` digits. The fraction is
// padded as text; `rescale` cannot widen a value near the `Decimal` limit.
fn render_fixed(value: Decimal, places: u32, grouped: bool) -> String {
    let text = value.abs().to_string();

    let (whole, fraction) = text.split_once(DECIMAL_POINT).unwrap_or((text.as_str(), ""));
    let fraction = format!("{fraction:0<width$}", width = places as usize);
    let whole = if grouped {
        group_thousands(whole)
    } else {
        whole.to_string()
    };
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}{whole}{DECIMAL_POINT}{fraction}")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_numeric;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_always_groups() {
        assert_eq!(format(dec!(1234.5), Grouping::Always), "1,234.50");
        assert_eq!(format(dec!(1000), Grouping::Always), "1,000.00");
        assert_eq!(format(dec!(12), Grouping::Always), "12.00");
        assert_eq!(format(dec!(1234567.891), Grouping::Always), "1,234,567.89");
    }

    #[test]
    fn test_format_auto_threshold() {
        assert_eq!(format(dec!(999.999), Grouping::Auto), "1,000.00");
        assert_eq!(format(dec!(999.99), Grouping::Auto), "999.99");
        assert_eq!(format(dec!(736.7), Grouping::Auto), "736.70");
        assert_eq!(format(dec!(81250), Grouping::Auto), "81,250.00");
    }

    #[test]
    fn test_format_never_groups() {
        assert_eq!(format(dec!(1234.5), Grouping::Never), "1234.50");
    }

    #[test]
    fn test_format_rounds_half_away_from_zero() {
        assert_eq!(format(dec!(0.005), Grouping::Always), "0.01");
        assert_eq!(format(dec!(2.675), Grouping::Always), "2.68");
        assert_eq!(format(Decimal::ZERO, Grouping::Auto), "0.00");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format(dec!(-1234.5), Grouping::Always), "-1,234.50");
        assert_eq!(format(dec!(-0.001), Grouping::Always), "0.00");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(dec!(0.7367)), "0.7367");
        assert_eq!(format_rate(dec!(110.25)), "110.2500");
        assert_eq!(format_rate(dec!(0.00907)), "0.0091");
        assert_eq!(format_rate(dec!(1)), "1.0000");
    }

    #[test]
    fn test_format_at_decimal_limit_keeps_fraction() {
        let nines: Decimal = "9999999999999999999999999999".parse().unwrap();

        assert_eq!(
            format(nines, Grouping::Always),
            "9,999,999,999,999,999,999,999,999,999.00"
        );
        assert_eq!(
            format(Decimal::MAX, Grouping::Never),
            "79228162514264337593543950335.00"
        );
        assert_eq!(format_rate(Decimal::MAX), "79228162514264337593543950335.0000");
    }

    proptest! {
        #[test]
        fn prop_format_is_fixed_point(units in 0i64..1_000_000_000_000, scale in 0u32..6) {
            let value = Decimal::new(units, scale);
            for grouping in [Grouping::Always, Grouping::Auto, Grouping::Never] {
                let once = format(value, grouping);
                let reparsed = parse_numeric(&once).unwrap();
                prop_assert_eq!(format(reparsed, grouping), once);
            }
        }
    }
}
