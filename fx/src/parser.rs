//! Amount text parsing.
//!
//! Two entry points: [`sanitize`] cleans keystroke text while the user is
//! typing, and [`parse_numeric`] reads a (possibly grouped) display string
//! back into a decimal.

use rust_decimal::Decimal;

use crate::error::{FxError, FxResult};

/// Thousands separator accepted and stripped on input.
pub const GROUP_SEPARATOR: char = ',';

/// Decimal point.
pub const DECIMAL_POINT: char = '.';

/// Fractional digits kept while typing.
pub const MAX_FRACTION_DIGITS: usize = 2;

/// Clean raw amount text.
///
/// Keeps ASCII digits and the first decimal point. Everything from a second
/// decimal point onward is dropped, then the fraction is cut (not rounded)
/// to [`MAX_FRACTION_DIGITS`].
pub fn sanitize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut seen_point = false;

    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            cleaned.push(ch);
        } else if ch == DECIMAL_POINT {
            if seen_point {
                break;
            }
            seen_point = true;
            cleaned.push(ch);
        }
    }

    if let Some(point) = cleaned.find(DECIMAL_POINT) {
        let limit = point + 1 + MAX_FRACTION_DIGITS;
        if cleaned.len() > limit {
            cleaned.truncate(limit);
        }
    }

    cleaned
}

/// Parse display text into a decimal, ignoring group separators.
///
/// Accepts an optional sign, digits and at most one decimal point. Empty
/// text, a lone point and anything else non-numeric yield
/// [`FxError::NotANumber`]; callers substitute zero.
pub fn parse_numeric(text: &str) -> FxResult<Decimal> {
    let stripped: String = text.chars().filter(|c| *c != GROUP_SEPARATOR).collect();
    let trimmed = stripped.trim();
    let not_a_number = || FxError::NotANumber(text.to_string());

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (whole, fraction) = unsigned.split_once(DECIMAL_POINT).unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(not_a_number());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(not_a_number());
    }

    let normalized = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        if whole.is_empty() { "0" } else { whole },
        if fraction.is_empty() { "0" } else { fraction },
    );

    normalized.parse::<Decimal>().map_err(|_| not_a_number())
}

/// An amount as shown in the input field together with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountState {
    display: String,
    value: Decimal,
}

impl AmountState {
    /// Derive the state from display text. Unreadable or negative text
    /// counts as zero.
    pub fn from_display(display: impl Into<String>) -> Self {
        let display = display.into();
        let value = parse_numeric(&display)
            .ok()
            .filter(|v| *v >= Decimal::ZERO)
            .unwrap_or(Decimal::ZERO);
        Self { display, value }
    }

    /// The text as shown.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The numeric value behind the text.
    pub fn value(&self) -> Decimal {
        self.value
    }
}
