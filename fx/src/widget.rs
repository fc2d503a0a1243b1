//! Converter widget command handlers.
//!
//! A UI dispatcher turns toolkit events into [`Command`]s and renders the
//! returned [`WidgetView`]. The widget owns the selections and the amount
//! field; rates live in the shared [`RateStore`](crate::store::RateStore).

use std::sync::Arc;

use fxwidget_common::{CurrencyCode, RateSource};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::config::WidgetConfig;
use crate::conversion::{ConversionResult, ConversionStatus};
use crate::engine::{ConversionEngine, LOADING_TEXT};
use crate::error::FxResult;
use crate::fetcher::{fallback_currencies, CurrencyList, FetchOutcome, RateFetcher};
use crate::flags::{flag_url, FlagSink, FlagSlot};
use crate::formatter::{format, Grouping};
use crate::parser::{parse_numeric, sanitize, AmountState};
use crate::service::{ExchangeRateApi, OfflineRateService, RateService};
use crate::store::RateStore;

/// Amount shown before the user types anything.
pub const INITIAL_AMOUNT: &str = "1,000.00";

/// Events the UI forwards to the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The amount field text changed.
    Input(String),
    /// The amount field gained focus.
    Focus,
    /// The amount field lost focus.
    Blur,
    /// A new source currency was picked.
    SelectSource(CurrencyCode),
    /// A new target currency was picked.
    SelectTarget(CurrencyCode),
    /// Swap source and target.
    Swap,
}

/// Lifecycle of the amount field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountPhase {
    /// Keystrokes are sanitized as they arrive.
    Editing,
    /// Text is in canonical grouped two-decimal form.
    Committed,
}

/// The amount input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountField {
    text: String,
    phase: AmountPhase,
}

impl AmountField {
    /// A committed field showing `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            phase: AmountPhase::Committed,
        }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current phase.
    pub fn phase(&self) -> AmountPhase {
        self.phase
    }

    /// Text and value.
    pub fn state(&self) -> AmountState {
        AmountState::from_display(self.text.clone())
    }

    /// Replace the text with the sanitized form of `raw`.
    pub fn input(&mut self, raw: &str) {
        self.text = sanitize(raw);
        self.phase = AmountPhase::Editing;
    }

    /// Start editing.
    pub fn focus(&mut self) {
        self.phase = AmountPhase::Editing;
    }

    /// Reformat to canonical form. Unreadable text becomes `0.00`.
    pub fn blur(&mut self) {
        let value = parse_numeric(&self.text).unwrap_or(Decimal::ZERO);
        self.text = format(value, Grouping::Always);
        self.phase = AmountPhase::Committed;
    }
}

/// Everything the UI needs to render the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub amount: String,
    pub phase: AmountPhase,
    pub converted: String,
    pub rate_info: Option<String>,
    pub source: CurrencyCode,
    pub target: CurrencyCode,
    /// The shown rate is fallback data, not a live quote.
    pub approximate: bool,
}

/// The converter: selections, amount field and rate plumbing.
pub struct ConverterWidget {
    fetcher: RateFetcher,
    engine: ConversionEngine,
    flags: Arc<dyn FlagSink>,
    currencies: CurrencyList,
    source: CurrencyCode,
    target: CurrencyCode,
    amount: AmountField,
    last: Option<ConversionResult>,
}

impl ConverterWidget {
    /// Create a widget with `source`/`target` as preferred selections.
    pub fn new(
        fetcher: RateFetcher,
        flags: Arc<dyn FlagSink>,
        source: CurrencyCode,
        target: CurrencyCode,
    ) -> Self {
        let engine = ConversionEngine::new(fetcher.store().clone());
        Self {
            fetcher,
            engine,
            flags,
            currencies: CurrencyList {
                listings: fallback_currencies(),
                source: RateSource::Fallback,
            },
            source,
            target,
            amount: AmountField::new(INITIAL_AMOUNT),
            last: None,
        }
    }

    /// Build a widget, and its rate service, from configuration.
    pub fn from_config(config: &WidgetConfig, flags: Arc<dyn FlagSink>) -> FxResult<Self> {
        config.validate()?;

        let service: Arc<dyn RateService> = if config.offline {
            Arc::new(OfflineRateService)
        } else {
            Arc::new(ExchangeRateApi::new(config)?)
        };
        let fetcher = RateFetcher::new(service, Arc::new(RateStore::new()), config.retry.clone());

        Ok(Self::new(
            fetcher,
            flags,
            config.default_source.clone(),
            config.default_target.clone(),
        ))
    }

    /// Load the currency list, pick initial selections and load rates for
    /// the source currency.
    #[instrument(skip(self))]
    pub async fn bootstrap(&mut self) -> WidgetView {
        self.currencies = self.fetcher.fetch_supported_currencies().await;
        self.source = self.pick(&self.source);
        self.target = self.pick(&self.target);
        self.update_flags();

        match self.currencies.source {
            RateSource::Live => {
                self.fetcher.fetch_rates(&self.source).await;
            }
            RateSource::Fallback => self.fetcher.store().store_fallback(&self.source),
        }

        self.recompute();
        info!(
            source = %self.source,
            target = %self.target,
            currencies = self.currencies.listings.len(),
            "Widget ready"
        );
        self.view()
    }

    /// Apply one UI event and return the new view.
    pub async fn handle(&mut self, command: Command) -> WidgetView {
        debug!(command = ?command, "Handling command");
        match command {
            Command::Input(raw) => {
                self.amount.input(&raw);
                self.recompute();
            }
            Command::Focus => self.amount.focus(),
            Command::Blur => {
                self.amount.blur();
                self.recompute();
            }
            Command::SelectSource(code) => {
                self.source = code;
                self.currency_changed().await;
            }
            Command::SelectTarget(code) => {
                self.target = code;
                self.currency_changed().await;
            }
            Command::Swap => {
                std::mem::swap(&mut self.source, &mut self.target);
                self.currency_changed().await;
            }
        }
        self.view()
    }

    /// Current view.
    pub fn view(&self) -> WidgetView {
        let converted = self
            .last
            .as_ref()
            .map(|r| r.display_value.clone())
            .unwrap_or_else(|| LOADING_TEXT.to_string());

        let rate_info = self.last.as_ref().and_then(|r| {
            r.rate_info().or_else(|| {
                (r.status == ConversionStatus::Loading)
                    .then(|| format!("1 {} = {}", r.source_currency, LOADING_TEXT))
            })
        });

        WidgetView {
            amount: self.amount.text().to_string(),
            phase: self.amount.phase(),
            converted,
            rate_info,
            source: self.source.clone(),
            target: self.target.clone(),
            approximate: self.last.as_ref().is_some_and(|r| r.is_approximate()),
        }
    }

    /// Supported currencies as last loaded.
    pub fn currencies(&self) -> &CurrencyList {
        &self.currencies
    }

    /// The amount field.
    pub fn amount(&self) -> &AmountField {
        &self.amount
    }

    /// Re-run the conversion against the current cache contents.
    pub fn recompute(&mut self) -> &ConversionResult {
        let result = self
            .engine
            .convert(self.amount.text(), &self.source, &self.target);
        self.last.insert(result)
    }

    // Flags, then rates for the source, then conversion. The conversion
    // needs the fetch to have finished when the cache is cold.
    async fn currency_changed(&mut self) {
        self.update_flags();
        let outcome = self.fetcher.fetch_rates(&self.source).await;
        if outcome == FetchOutcome::Suppressed {
            debug!(base = %self.source, "Rates still loading");
        }
        self.recompute();
    }

    fn update_flags(&self) {
        self.flags
            .show_flag(FlagSlot::Source, &self.source, &flag_url(&self.source));
        self.flags
            .show_flag(FlagSlot::Target, &self.target, &flag_url(&self.target));
    }

    fn pick(&self, preferred: &CurrencyCode) -> CurrencyCode {
        if self.currencies.contains(preferred) {
            return preferred.clone();
        }
        self.currencies
            .listings
            .first()
            .map(|l| l.code.clone())
            .unwrap_or_else(|| preferred.clone())
    }
}
