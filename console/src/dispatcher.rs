//! Maps console input lines onto widget commands.

use fxwidget_common::CurrencyCode;
use fxwidget_fx::Command;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Forward to the widget.
    Widget(Command),
    /// Print the current view.
    Show,
    /// Print the supported currencies.
    List,
    /// Print usage.
    Help,
    /// Leave the session.
    Quit,
}

/// Usage text.
pub const HELP: &str = "\
commands:
  type <text>   replace the amount text (sanitized as typed)
  focus         start editing the amount
  blur          commit the amount
  from <CODE>   pick the source currency
  to <CODE>     pick the target currency
  swap          swap source and target
  show          print the current view
  list          print supported currencies
  help          print this text
  quit          exit";

/// Parse a line. Blank lines yield `None`; unknown input is an error
/// message for the user.
pub fn parse_line(line: &str) -> Option<Result<Directive, String>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    let directive = match word.to_ascii_lowercase().as_str() {
        "type" | "t" => Ok(Directive::Widget(Command::Input(rest.to_string()))),
        "focus" => Ok(Directive::Widget(Command::Focus)),
        "blur" => Ok(Directive::Widget(Command::Blur)),
        "from" => currency_arg(rest).map(|c| Directive::Widget(Command::SelectSource(c))),
        "to" => currency_arg(rest).map(|c| Directive::Widget(Command::SelectTarget(c))),
        "swap" => Ok(Directive::Widget(Command::Swap)),
        "show" => Ok(Directive::Show),
        "list" => Ok(Directive::List),
        "help" | "?" => Ok(Directive::Help),
        "quit" | "exit" => Ok(Directive::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    };

    Some(directive)
}

fn currency_arg(rest: &str) -> Result<CurrencyCode, String> {
    if rest.is_empty() {
        Err("expected a currency code".to_string())
    } else {
        Ok(CurrencyCode::new(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_widget_commands() {
        assert_eq!(
            parse_line("type 1,234.567"),
            Some(Ok(Directive::Widget(Command::Input("1,234.567".to_string()))))
        );
        assert_eq!(
            parse_line("  from eur "),
            Some(Ok(Directive::Widget(Command::SelectSource(CurrencyCode::eur()))))
        );
        assert_eq!(parse_line("SWAP"), Some(Ok(Directive::Widget(Command::Swap))));
        assert_eq!(parse_line("type"), Some(Ok(Directive::Widget(Command::Input(String::new())))));
    }

    #[test]
    fn test_parse_session_directives() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("show"), Some(Ok(Directive::Show)));
        assert_eq!(parse_line("exit"), Some(Ok(Directive::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_line("to"), Some(Err(_))));
        assert!(matches!(parse_line("convert 5"), Some(Err(_))));
    }
}
