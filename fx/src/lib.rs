//! FxWidget conversion core
//!
//! Input normalization, rate caching and conversion for a currency
//! converter widget.
//!
//! # Features
//!
//! - Keystroke sanitizing and tolerant amount parsing
//! - Fixed `en-US` amount and rate formatting
//! - Per-base rate cache with in-flight fetch suppression
//! - Static fallback rates when the rate service is unreachable
//! - Command handlers for a UI dispatcher
//!
//! # Example
//!
//! ```rust,ignore
//! use fxwidget_fx::{Command, ConverterWidget, LogFlagSink, WidgetConfig};
//!
//! let config = WidgetConfig::from_env();
//! let mut widget = ConverterWidget::from_config(&config, Arc::new(LogFlagSink))?;
//!
//! let view = widget.bootstrap().await;
//! println!("{} -> {}", view.amount, view.converted);
//!
//! let view = widget.handle(Command::Input("250".into())).await;
//! ```

pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod flags;
pub mod formatter;
pub mod parser;
pub mod service;
pub mod store;
pub mod widget;

pub use config::{RetryPolicy, WidgetConfig};
pub use conversion::{ConversionResult, ConversionStatus};
pub use engine::{ConversionEngine, LOADING_TEXT, ZERO_TEXT};
pub use error::{FxError, FxResult};
pub use fetcher::{CurrencyList, FetchOutcome, RateFetcher};
pub use flags::{FlagSink, FlagSlot, LogFlagSink, NoopFlagSink};
pub use formatter::Grouping;
pub use service::{ExchangeRateApi, OfflineRateService, RateService};
pub use store::{RateLookup, RateStore};
pub use widget::{AmountField, AmountPhase, Command, ConverterWidget, WidgetView};

#[cfg(any(test, feature = "test-utils"))]
pub use service::MockRateService;
