//! Currency and rate types for FxWidget.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// ISO 4217 style currency code.
///
/// Codes are trimmed and uppercased on construction. The rate service may
/// hand back codes that are not three letters; those are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether the code has the usual three-letter shape.
    pub fn is_iso_shaped(&self) -> bool {
        self.0.len() == 3 && self.0.bytes().all(|b| b.is_ascii_uppercase())
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn sgd() -> Self {
        Self::new("SGD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Conversion rates from one base currency to every known target.
///
/// Each entry reads "1 unit of base converts to N units of target". A table
/// is never edited after construction; refreshing a base replaces the whole
/// table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Build a table, dropping any non-positive rate.
    pub fn new(rates: BTreeMap<CurrencyCode, Decimal>) -> Self {
        Self {
            rates: rates
                .into_iter()
                .filter(|(_, rate)| *rate > Decimal::ZERO)
                .collect(),
        }
    }

    /// Rate for a target currency, if the table has one.
    pub fn rate(&self, target: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(target).copied()
    }

    /// Check if the table quotes the given target.
    pub fn contains(&self, target: &CurrencyCode) -> bool {
        self.rates.contains_key(target)
    }

    /// Get the number of quoted targets.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(CurrencyCode, Decimal)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (CurrencyCode, Decimal)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A supported currency as listed by the rate service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyListing {
    /// Currency code.
    pub code: CurrencyCode,
    /// Human-readable name, e.g. "Singapore Dollar".
    pub name: String,
}

impl CurrencyListing {
    /// Create a new listing.
    pub fn new(code: impl Into<CurrencyCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CurrencyListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}

/// Where a piece of rate data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Returned by the rate service.
    Live,
    /// Static approximation used while the service is unreachable.
    Fallback,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSource::Live => write!(f, "live"),
            RateSource::Fallback => write!(f, "fallback"),
        }
    }
}
