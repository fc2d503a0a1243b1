//! Widget configuration.

use std::time::Duration;

use fxwidget_common::CurrencyCode;

use crate::error::{FxError, FxResult};

/// Retry settings for transport-level rate service failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Main widget configuration.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Rate service root, without the API key segment.
    pub api_base_url: String,
    /// Rate service API key.
    pub api_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retry settings.
    pub retry: RetryPolicy,
    /// Source currency selected at startup.
    pub default_source: CurrencyCode,
    /// Target currency selected at startup.
    pub default_target: CurrencyCode,
    /// Skip the network and run on fallback data only.
    pub offline: bool,
    /// Log level.
    pub log_level: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://v6.exchangerate-api.com/v6".to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            default_source: CurrencyCode::sgd(),
            default_target: CurrencyCode::usd(),
            offline: false,
            log_level: "info".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FXWIDGET_API_URL") {
            config.api_base_url = url;
        }

        if let Ok(key) = std::env::var("FXWIDGET_API_KEY") {
            config.api_key = key;
        }

        if let Ok(ms) = std::env::var("FXWIDGET_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.request_timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(retries) = std::env::var("FXWIDGET_MAX_RETRIES") {
            if let Ok(retries) = retries.parse() {
                config.retry.max_retries = retries;
            }
        }

        if let Ok(code) = std::env::var("FXWIDGET_FROM") {
            config.default_source = CurrencyCode::new(code);
        }

        if let Ok(code) = std::env::var("FXWIDGET_TO") {
            config.default_target = CurrencyCode::new(code);
        }

        if let Ok(offline) = std::env::var("FXWIDGET_OFFLINE") {
            config.offline = matches!(offline.as_str(), "1" | "true" | "yes");
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> FxResult<()> {
        if !self.offline {
            if self.api_base_url.is_empty() {
                return Err(FxError::InvalidConfig(
                    "API base URL cannot be empty".to_string(),
                ));
            }

            if self.api_key.is_empty() {
                return Err(FxError::InvalidConfig(
                    "API key is required unless running offline".to_string(),
                ));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(FxError::InvalidConfig(
                "Request timeout cannot be zero".to_string(),
            ));
        }

        if self.retry.base_delay > self.retry.max_delay {
            return Err(FxError::InvalidConfig(
                "Retry base delay cannot exceed max delay".to_string(),
            ));
        }

        if self.default_source.code().is_empty() || self.default_target.code().is_empty() {
            return Err(FxError::InvalidConfig(
                "Default currencies cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
