//! Rate cache keyed by base currency, with static fallback tables.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use fxwidget_common::{CurrencyCode, RateSource, RateTable};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::debug;

/// Approximate rates used when the live service is unreachable.
///
/// Each rate is `(target, mantissa, scale)`, i.e. `Decimal::new(mantissa, scale)`.
const FALLBACK_RATES: &[(&str, &[(&str, i64, u32)])] = &[
    (
        "USD",
        &[
            ("SGD", 13567, 4),
            ("EUR", 8515, 4),
            ("GBP", 7345, 4),
            ("JPY", 11025, 2),
            ("AUD", 15367, 4),
            ("CAD", 13562, 4),
            ("CHF", 8999, 4),
            ("CNY", 72345, 4),
            ("INR", 7450, 2),
            ("RUB", 7350, 2),
        ],
    ),
    (
        "SGD",
        &[
            ("USD", 7367, 4),
            ("EUR", 6275, 4),
            ("GBP", 5412, 4),
            ("JPY", 8125, 2),
            ("AUD", 11324, 4),
            ("CAD", 9998, 4),
            ("CHF", 6632, 4),
            ("CNY", 53321, 4),
            ("INR", 5487, 2),
            ("RUB", 5415, 2),
        ],
    ),
    (
        "EUR",
        &[
            ("USD", 11742, 4),
            ("SGD", 15935, 4),
            ("GBP", 8623, 4),
            ("JPY", 12945, 2),
            ("AUD", 16723, 4),
            ("CAD", 14756, 4),
            ("CHF", 9567, 4),
            ("CNY", 78567, 4),
            ("INR", 8750, 2),
            ("RUB", 8630, 2),
        ],
    ),
    (
        "GBP",
        &[
            ("USD", 13615, 4),
            ("SGD", 18478, 4),
            ("EUR", 11595, 4),
            ("JPY", 15012, 2),
            ("AUD", 19387, 4),
            ("CAD", 17109, 4),
            ("CHF", 11098, 4),
            ("CNY", 91123, 4),
            ("INR", 10145, 2),
            ("RUB", 10010, 2),
        ],
    ),
    (
        "JPY",
        &[
            ("USD", 907, 5),
            ("SGD", 1231, 5),
            ("EUR", 772, 5),
            ("GBP", 666, 5),
            ("AUD", 1393, 5),
            ("CAD", 1229, 5),
            ("CHF", 797, 5),
            ("CNY", 6548, 5),
            ("INR", 6755, 4),
            ("RUB", 6667, 4),
        ],
    ),
];

/// Cached table for one base.
#[derive(Debug, Clone)]
struct CacheEntry {
    table: Arc<RateTable>,
    source: RateSource,
}

impl CacheEntry {
    fn new(table: RateTable, source: RateSource) -> Self {
        Self {
            table: Arc::new(table),
            source,
        }
    }
}

/// Result of looking up a single rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLookup {
    /// No table cached for the base yet.
    Cold,
    /// A table is cached but does not quote the target.
    MissingTarget,
    /// Rate from base to target.
    Rate(Decimal),
}

/// Thread-safe store of rate tables with per-base fetch tracking.
#[derive(Default)]
pub struct RateStore {
    cache: DashMap<CurrencyCode, CacheEntry>,
    in_flight: Mutex<HashSet<CurrencyCode>>,
}

impl RateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the rate from `base` to `target`.
    pub fn lookup(&self, base: &CurrencyCode, target: &CurrencyCode) -> RateLookup {
        match self.cache.get(base) {
            None => {
                debug!(base = %base, "Cache miss");
                RateLookup::Cold
            }
            Some(entry) => match entry.table.rate(target) {
                Some(rate) => RateLookup::Rate(rate),
                None => RateLookup::MissingTarget,
            },
        }
    }

    /// Snapshot of the table cached for `base`.
    pub fn table(&self, base: &CurrencyCode) -> Option<Arc<RateTable>> {
        self.cache.get(base).map(|entry| entry.table.clone())
    }

    /// Where the cached table for `base` came from.
    pub fn source(&self, base: &CurrencyCode) -> Option<RateSource> {
        self.cache.get(base).map(|entry| entry.source)
    }

    /// Store a live table, replacing whatever was cached for `base`.
    pub fn store(&self, base: CurrencyCode, table: RateTable) {
        debug!(base = %base, targets = table.len(), "Storing live rates");
        self.cache.insert(base, CacheEntry::new(table, RateSource::Live));
    }

    /// Store the static fallback table for `base`.
    pub fn store_fallback(&self, base: &CurrencyCode) {
        let table = Self::fallback(base);
        debug!(base = %base, targets = table.len(), "Storing fallback rates");
        self.cache
            .insert(base.clone(), CacheEntry::new(table, RateSource::Fallback));
    }

    /// Hard-coded approximation for `base`. Unknown bases get `{USD: 1}`.
    pub fn fallback(base: &CurrencyCode) -> RateTable {
        FALLBACK_RATES
            .iter()
            .find(|(code, _)| *code == base.code())
            .map(|(_, rates)| {
                rates
                    .iter()
                    .map(|(target, mantissa, scale)| {
                        (CurrencyCode::new(*target), Decimal::new(*mantissa, *scale))
                    })
                    .collect()
            })
            .unwrap_or_else(|| [(CurrencyCode::usd(), Decimal::ONE)].into_iter().collect())
    }

    /// Mark a fetch for `base` as in flight.
    ///
    /// Returns `None` if one is already running. The mark is cleared when
    /// the guard is dropped.
    pub fn begin_fetch(&self, base: &CurrencyCode) -> Option<FetchGuard<'_>> {
        if self.in_flight.lock().insert(base.clone()) {
            Some(FetchGuard {
                store: self,
                base: base.clone(),
            })
        } else {
            None
        }
    }

    /// Check if a fetch for `base` is in flight.
    pub fn is_loading(&self, base: &CurrencyCode) -> bool {
        self.in_flight.lock().contains(base)
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        // One pass so a concurrent insert cannot make the counts disagree.
        let (total, live) = self.cache.iter().fold((0, 0), |(total, live), entry| {
            (total + 1, live + usize::from(entry.source == RateSource::Live))
        });

        StoreStats {
            cached_bases: total,
            live_bases: live,
            fallback_bases: total - live,
            in_flight: self.in_flight.lock().len(),
        }
    }
}

/// Clears the in-flight mark for a base on drop.
pub struct FetchGuard<'a> {
    store: &'a RateStore,
    base: CurrencyCode,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.store.in_flight.lock().remove(&self.base);
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub cached_bases: usize,
    pub live_bases: usize,
    pub fallback_bases: usize,
    pub in_flight: usize,
}
