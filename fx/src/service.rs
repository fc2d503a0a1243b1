//! Rate service trait and implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use fxwidget_common::{CurrencyCode, CurrencyListing, RateTable, ServiceError, ServiceResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::config::WidgetConfig;
use crate::error::{FxError, FxResult};

/// Result value the service uses for a good response.
const SUCCESS: &str = "success";

/// Trait for the external rate service.
#[async_trait]
pub trait RateService: Send + Sync {
    /// Get the service name.
    fn name(&self) -> &str;

    /// List supported currency codes with display names.
    async fn supported_codes(&self) -> ServiceResult<Vec<CurrencyListing>>;

    /// Get conversion rates from `base` to every known target.
    async fn latest_rates(&self, base: &CurrencyCode) -> ServiceResult<RateTable>;
}

#[derive(Debug, Deserialize)]
struct CodesEnvelope {
    result: String,
    #[serde(default)]
    supported_codes: Vec<(String, String)>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatestEnvelope {
    result: String,
    #[serde(default)]
    conversion_rates: BTreeMap<String, f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

fn check_result(result: &str, error_type: Option<String>) -> ServiceResult<()> {
    if result == SUCCESS {
        Ok(())
    } else {
        Err(ServiceError::api(
            error_type.unwrap_or_else(|| result.to_string()),
        ))
    }
}

/// Decode a `/codes` response body.
pub fn decode_codes(body: &str) -> ServiceResult<Vec<CurrencyListing>> {
    let envelope: CodesEnvelope =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    check_result(&envelope.result, envelope.error_type)?;

    Ok(envelope
        .supported_codes
        .into_iter()
        .map(|(code, name)| CurrencyListing::new(code, name))
        .collect())
}

/// Decode a `/latest/{base}` response body.
///
/// Rates arrive as JSON numbers; each goes through its shortest decimal
/// text so `0.7367` stays `0.7367`. Unrepresentable or non-positive rates
/// are dropped.
pub fn decode_latest(body: &str) -> ServiceResult<RateTable> {
    let envelope: LatestEnvelope =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    check_result(&envelope.result, envelope.error_type)?;

    Ok(envelope
        .conversion_rates
        .into_iter()
        .filter_map(|(code, rate)| match rate.to_string().parse::<Decimal>() {
            Ok(rate) => Some((CurrencyCode::new(code), rate)),
            Err(e) => {
                debug!(code = %code, error = %e, "Dropping unrepresentable rate");
                None
            }
        })
        .collect())
}

/// Client for the exchangerate-api.com v6 HTTP API.
pub struct ExchangeRateApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ExchangeRateApi {
    /// Create a client from configuration.
    pub fn new(config: &WidgetConfig) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fxwidget/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FxError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get(&self, path: &str) -> ServiceResult<String> {
        let url = format!("{}/{}/{}", self.base_url, self.api_key, path);
        debug!(path = path, "Requesting rate service");

        let response = self.client.get(&url).send().await.map_err(|e| {
            let e = e.without_url();
            if e.is_timeout() {
                ServiceError::Transport(format!("request timeout: {e}"))
            } else if e.is_connect() {
                ServiceError::Transport(format!("connection failed: {e}"))
            } else {
                ServiceError::Transport(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            ServiceError::Transport(format!("failed to read body: {}", e.without_url()))
        })
    }
}

#[async_trait]
impl RateService for ExchangeRateApi {
    fn name(&self) -> &str {
        "exchangerate-api"
    }

    async fn supported_codes(&self) -> ServiceResult<Vec<CurrencyListing>> {
        let body = self.get("codes").await?;
        decode_codes(&body)
    }

    async fn latest_rates(&self, base: &CurrencyCode) -> ServiceResult<RateTable> {
        let body = self.get(&format!("latest/{}", base.code())).await?;
        decode_latest(&body)
    }
}

/// Service that is never reachable. Every call fails, so the widget runs
/// entirely on fallback data.
#[derive(Debug, Default)]
pub struct OfflineRateService;

#[async_trait]
impl RateService for OfflineRateService {
    fn name(&self) -> &str {
        "offline"
    }

    async fn supported_codes(&self) -> ServiceResult<Vec<CurrencyListing>> {
        Err(ServiceError::Transport("offline mode".to_string()))
    }

    async fn latest_rates(&self, _base: &CurrencyCode) -> ServiceResult<RateTable> {
        Err(ServiceError::Transport("offline mode".to_string()))
    }
}

/// Mock rate service for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateService {
    listings: parking_lot::Mutex<Option<Vec<CurrencyListing>>>,
    tables: dashmap::DashMap<CurrencyCode, RateTable>,
    failures: parking_lot::Mutex<std::collections::VecDeque<ServiceError>>,
    delay: parking_lot::Mutex<std::time::Duration>,
    rate_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateService {
    /// Create a mock with no listings and no tables.
    pub fn new() -> Self {
        Self {
            listings: parking_lot::Mutex::new(None),
            tables: dashmap::DashMap::new(),
            failures: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            delay: parking_lot::Mutex::new(std::time::Duration::ZERO),
            rate_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Serve these listings from `supported_codes`.
    pub fn set_listings(&self, listings: Vec<CurrencyListing>) {
        *self.listings.lock() = Some(listings);
    }

    /// Serve this table for `base`.
    pub fn set_table(&self, base: CurrencyCode, table: RateTable) {
        self.tables.insert(base, table);
    }

    /// Fail the next `latest_rates` call with `error`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, error: ServiceError) {
        self.failures.lock().push_back(error);
    }

    /// Delay every `latest_rates` call.
    pub fn set_delay(&self, delay: std::time::Duration) {
        *self.delay.lock() = delay;
    }

    /// Number of `latest_rates` calls made so far.
    pub fn rate_calls(&self) -> usize {
        self.rate_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockRateService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateService for MockRateService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn supported_codes(&self) -> ServiceResult<Vec<CurrencyListing>> {
        self.listings
            .lock()
            .clone()
            .ok_or_else(|| ServiceError::api("no-listings"))
    }

    async fn latest_rates(&self, base: &CurrencyCode) -> ServiceResult<RateTable> {
        self.rate_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }

        self.tables
            .get(base)
            .map(|t| t.clone())
            .ok_or_else(|| ServiceError::api("unsupported-code"))
    }
}
