//! Rate fetching with retry and fallback substitution.

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;

use fxwidget_common::{CurrencyCode, CurrencyListing, RateSource, ServiceError, ServiceResult};
use tracing::{debug, info, instrument, warn};

use crate::config::RetryPolicy;
use crate::service::RateService;
use crate::store::RateStore;

/// Currency list used when the codes endpoint is unavailable.
const FALLBACK_CURRENCIES: &[(&str, &str)] = &[
    ("USD", "US Dollar"),
    ("EUR", "Euro"),
    ("GBP", "British Pound"),
    ("JPY", "Japanese Yen"),
    ("SGD", "Singapore Dollar"),
    ("AUD", "Australian Dollar"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CNY", "Chinese Yuan"),
    ("INR", "Indian Rupee"),
    ("RUB", "Russian Ruble"),
];

/// How a rate fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Live table stored.
    Live { targets: usize },
    /// The service failed; the fallback table was stored instead.
    Fallback(ServiceError),
    /// Another fetch for the same base was already running. Nothing done.
    Suppressed,
}

/// Supported currencies and where the list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyList {
    pub listings: Vec<CurrencyListing>,
    pub source: RateSource,
}

impl CurrencyList {
    /// Check if `code` is listed.
    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.listings.iter().any(|l| &l.code == code)
    }
}

/// The 11-entry list used when the service cannot list currencies.
pub fn fallback_currencies() -> Vec<CurrencyListing> {
    FALLBACK_CURRENCIES
        .iter()
        .map(|(code, name)| CurrencyListing::new(*code, *name))
        .collect()
}

/// Sort listings by display name.
pub fn sort_by_name(listings: &mut [CurrencyListing]) {
    listings.sort_by(|a, b| collate(&a.name, &b.name));
}

/// Compare display names the way a user expects: letters first by their
/// base form ignoring case and accents, then accents, then case.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| -> String {
        s.chars()
            .map(fold_accent)
            .flat_map(char::to_lowercase)
            .collect()
    };
    let secondary = |s: &str| -> String { s.chars().flat_map(char::to_lowercase).collect() };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| b.cmp(a))
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}

/// Fetches rates and currency lists, keeping the store populated.
pub struct RateFetcher {
    service: Arc<dyn RateService>,
    store: Arc<RateStore>,
    retry: RetryPolicy,
}

impl RateFetcher {
    /// Create a new fetcher.
    pub fn new(service: Arc<dyn RateService>, store: Arc<RateStore>, retry: RetryPolicy) -> Self {
        Self {
            service,
            store,
            retry,
        }
    }

    /// The store this fetcher writes to.
    pub fn store(&self) -> &Arc<RateStore> {
        &self.store
    }

    /// Fetch rates for `base` and store them.
    ///
    /// A failure stores the fallback table instead, so after any
    /// non-suppressed call the base is no longer cold.
    #[instrument(skip(self, base), fields(base = %base, service = self.service.name()))]
    pub async fn fetch_rates(&self, base: &CurrencyCode) -> FetchOutcome {
        let Some(_guard) = self.store.begin_fetch(base) else {
            debug!("Fetch already in flight, skipping");
            return FetchOutcome::Suppressed;
        };

        match self
            .with_retry("latest_rates", || self.service.latest_rates(base))
            .await
        {
            Ok(table) => {
                let targets = table.len();
                self.store.store(base.clone(), table);
                info!(targets, "Stored live rates");
                FetchOutcome::Live { targets }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.error_code(),
                    "Rate fetch failed, substituting fallback rates"
                );
                self.store.store_fallback(base);
                FetchOutcome::Fallback(e)
            }
        }
    }

    /// Fetch the supported currency list sorted by display name.
    #[instrument(skip(self), fields(service = self.service.name()))]
    pub async fn fetch_supported_currencies(&self) -> CurrencyList {
        match self
            .with_retry("supported_codes", || self.service.supported_codes())
            .await
        {
            Ok(mut listings) => {
                sort_by_name(&mut listings);
                info!(count = listings.len(), "Loaded supported currencies");
                CurrencyList {
                    listings,
                    source: RateSource::Live,
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.error_code(),
                    "Currency list unavailable, using fallback list"
                );
                CurrencyList {
                    listings: fallback_currencies(),
                    source: RateSource::Fallback,
                }
            }
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> ServiceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    debug!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying rate service call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockRateService;
    use crate::store::RateLookup;
    use fxwidget_common::RateTable;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn sgd_table() -> RateTable {
        [
            (CurrencyCode::usd(), dec!(0.7367)),
            (CurrencyCode::eur(), dec!(0.6275)),
        ]
        .into_iter()
        .collect()
    }

    fn setup(retry: RetryPolicy) -> (Arc<MockRateService>, RateFetcher) {
        let service = Arc::new(MockRateService::new());
        service.set_table(CurrencyCode::sgd(), sgd_table());
        let fetcher = RateFetcher::new(service.clone(), Arc::new(RateStore::new()), retry);
        (service, fetcher)
    }

    fn quick_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn test_fetch_stores_live_table() {
        let (_, fetcher) = setup(RetryPolicy::none());
        let sgd = CurrencyCode::sgd();

        let outcome = fetcher.fetch_rates(&sgd).await;

        assert_eq!(outcome, FetchOutcome::Live { targets: 2 });
        assert_eq!(
            fetcher.store().lookup(&sgd, &CurrencyCode::usd()),
            RateLookup::Rate(dec!(0.7367))
        );
        assert_eq!(fetcher.store().source(&sgd), Some(RateSource::Live));
        assert!(!fetcher.store().is_loading(&sgd));
    }

    #[tokio::test]
    async fn test_api_failure_substitutes_fallback_without_retry() {
        let (service, fetcher) = setup(quick_retry(3));
        service.fail_next(ServiceError::api("quota-reached"));

        let outcome = fetcher.fetch_rates(&CurrencyCode::usd()).await;

        assert_eq!(outcome, FetchOutcome::Fallback(ServiceError::api("quota-reached")));
        assert_eq!(service.rate_calls(), 1);
        assert_eq!(
            fetcher.store().lookup(&CurrencyCode::usd(), &CurrencyCode::sgd()),
            RateLookup::Rate(dec!(1.3567))
        );
        assert_eq!(
            fetcher.store().source(&CurrencyCode::usd()),
            Some(RateSource::Fallback)
        );
    }

    #[tokio::test]
    async fn test_unknown_base_falls_back_to_usd_only() {
        let (_, fetcher) = setup(RetryPolicy::none());
        let xxx = CurrencyCode::new("XXX");

        let outcome = fetcher.fetch_rates(&xxx).await;

        assert!(matches!(outcome, FetchOutcome::Fallback(_)));
        assert_eq!(
            fetcher.store().lookup(&xxx, &CurrencyCode::usd()),
            RateLookup::Rate(rust_decimal::Decimal::ONE)
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_retried() {
        let (service, fetcher) = setup(quick_retry(2));
        service.fail_next(ServiceError::Transport("connection reset".into()));
        service.fail_next(ServiceError::Status { status: 502 });

        let outcome = fetcher.fetch_rates(&CurrencyCode::sgd()).await;

        assert_eq!(outcome, FetchOutcome::Live { targets: 2 });
        assert_eq!(service.rate_calls(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted_falls_back() {
        let (service, fetcher) = setup(quick_retry(1));
        service.fail_next(ServiceError::Transport("timeout".into()));
        service.fail_next(ServiceError::Transport("timeout".into()));

        let outcome = fetcher.fetch_rates(&CurrencyCode::sgd()).await;

        assert!(matches!(outcome, FetchOutcome::Fallback(ServiceError::Transport(_))));
        assert_eq!(service.rate_calls(), 2);
        assert_eq!(
            fetcher.store().source(&CurrencyCode::sgd()),
            Some(RateSource::Fallback)
        );
    }

    #[tokio::test]
    async fn test_concurrent_fetch_for_same_base_is_suppressed() {
        let (service, fetcher) = setup(RetryPolicy::none());
        service.set_delay(Duration::from_millis(20));
        let sgd = CurrencyCode::sgd();

        let (first, second) = tokio::join!(fetcher.fetch_rates(&sgd), async {
            tokio::task::yield_now().await;
            fetcher.fetch_rates(&sgd).await
        });

        let outcomes = [first, second];
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == FetchOutcome::Suppressed)
                .count(),
            1
        );
        assert!(outcomes.contains(&FetchOutcome::Live { targets: 2 }));
        assert_eq!(service.rate_calls(), 1);
        assert!(!fetcher.store().is_loading(&sgd));
    }

    #[tokio::test]
    async fn test_currency_list_sorted_by_name() {
        let (service, fetcher) = setup(RetryPolicy::none());
        service.set_listings(vec![
            CurrencyListing::new("USD", "US Dollar"),
            CurrencyListing::new("AED", "UAE Dirham"),
            CurrencyListing::new("STN", "São Tomé and Príncipe Dobra"),
            CurrencyListing::new("SGD", "Singapore Dollar"),
            CurrencyListing::new("EUR", "Euro"),
        ]);

        let list = fetcher.fetch_supported_currencies().await;

        let codes: Vec<&str> = list.listings.iter().map(|l| l.code.code()).collect();
        assert_eq!(codes, vec!["EUR", "STN", "SGD", "AED", "USD"]);
        assert_eq!(list.source, RateSource::Live);
    }

    #[tokio::test]
    async fn test_currency_list_fallback() {
        let (_, fetcher) = setup(RetryPolicy::none());

        let list = fetcher.fetch_supported_currencies().await;

        assert_eq!(list.source, RateSource::Fallback);
        assert_eq!(list.listings.len(), 11);
        assert_eq!(list.listings[0].code, CurrencyCode::usd());
        assert!(list.contains(&CurrencyCode::new("RUB")));
    }

    #[test]
    fn test_collate_ignores_case_and_accents_first() {
        assert_eq!(collate("euro", "Euro"), Ordering::Less);
        assert_eq!(collate("Émirati", "Euro"), Ordering::Less);
        assert_eq!(collate("Zloty", "yen"), Ordering::Greater);
    }
}
