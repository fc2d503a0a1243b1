//! FxWidget console
//!
//! Drives the converter widget from stdin, one command per line.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fxwidget_common::CurrencyCode;
use fxwidget_fx::{ConverterWidget, LogFlagSink, WidgetConfig};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod dispatcher;
mod session;

/// FxWidget console CLI
#[derive(Parser, Debug)]
#[command(name = "fxwidget")]
#[command(about = "Currency converter widget driven from the terminal")]
struct Args {
    /// Rate service API key (overrides FXWIDGET_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Run on fallback rates without contacting the rate service
    #[arg(long)]
    offline: bool,

    /// Initial source currency
    #[arg(long)]
    from: Option<String>,

    /// Initial target currency
    #[arg(long)]
    to: Option<String>,

    /// Retries for transport failures
    #[arg(long)]
    max_retries: Option<u32>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(self, config: &mut WidgetConfig) {
        if let Some(key) = self.api_key {
            config.api_key = key;
        }
        if self.offline {
            config.offline = true;
        }
        if let Some(code) = self.from {
            config.default_source = CurrencyCode::new(code);
        }
        if let Some(code) = self.to {
            config.default_target = CurrencyCode::new(code);
        }
        if let Some(retries) = self.max_retries {
            config.retry.max_retries = retries;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let json_logs = args.json_logs;

    let mut config = WidgetConfig::from_env();
    args.apply(&mut config);

    // Logs go to stderr; stdout carries the rendered views.
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(json_logs.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    info!(
        offline = config.offline,
        source = %config.default_source,
        target = %config.default_target,
        "Starting FxWidget console"
    );

    let mut widget = ConverterWidget::from_config(&config, Arc::new(LogFlagSink))
        .context("invalid configuration")?;

    let view = widget.bootstrap().await;
    let mut out = std::io::stdout();
    println!("{}", session::render(&view));
    println!("type `help` for commands");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session::run(&mut widget, stdin, &mut out).await?;

    Ok(())
}
