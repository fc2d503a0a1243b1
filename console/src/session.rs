//! Interactive session loop.

use std::io::Write;

use fxwidget_fx::{AmountPhase, ConverterWidget, WidgetView};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::dispatcher::{parse_line, Directive, HELP};

/// Render a view as two lines: the amounts, then the rate.
pub fn render(view: &WidgetView) -> String {
    let cursor = match view.phase {
        AmountPhase::Editing => "_",
        AmountPhase::Committed => "",
    };
    let mut rate = view.rate_info.clone().unwrap_or_else(|| "-".to_string());
    if view.approximate {
        rate.push_str(" (offline estimate)");
    }

    format!(
        "{} {}{} => {} {}\n{}",
        view.source, view.amount, cursor, view.target, view.converted, rate
    )
}

/// Read commands from `input` until EOF or `quit`, writing views to `out`.
pub async fn run<R, W>(widget: &mut ConverterWidget, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let directive = match parse_line(&line) {
            None => continue,
            Some(Ok(directive)) => directive,
            Some(Err(message)) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        debug!(directive = ?directive, "Dispatching");

        match directive {
            Directive::Widget(command) => {
                let view = widget.handle(command).await;
                writeln!(out, "{}", render(&view))?;
            }
            Directive::Show => writeln!(out, "{}", render(&widget.view()))?,
            Directive::List => {
                for listing in &widget.currencies().listings {
                    writeln!(out, "{listing}")?;
                }
            }
            Directive::Help => writeln!(out, "{HELP}")?,
            Directive::Quit => break,
        }
    }

    info!("Session ended");
    Ok(())
}
