//! Flag images for currency selections.

use fxwidget_common::CurrencyCode;
use tracing::debug;

const FLAG_CDN: &str = "https://flagcdn.com/w80";

/// Currency → ISO 3166 region used by the flag CDN.
const KNOWN_REGIONS: &[(&str, &str)] = &[
    ("USD", "us"),
    ("EUR", "eu"),
    ("GBP", "gb"),
    ("JPY", "jp"),
    ("SGD", "sg"),
    ("AUD", "au"),
    ("CAD", "ca"),
    ("CHF", "ch"),
    ("CNY", "cn"),
    ("RUB", "ru"),
    ("INR", "in"),
    ("BRL", "br"),
    ("MXN", "mx"),
    ("KRW", "kr"),
    ("TRY", "tr"),
    ("ZAR", "za"),
    ("NZD", "nz"),
    ("SEK", "se"),
    ("NOK", "no"),
    ("DKK", "dk"),
    ("PLN", "pl"),
    ("THB", "th"),
    ("MYR", "my"),
    ("IDR", "id"),
    ("PHP", "ph"),
    ("CZK", "cz"),
    ("ILS", "il"),
    ("CLP", "cl"),
    ("AED", "ae"),
    ("SAR", "sa"),
    ("HKD", "hk"),
    ("TWD", "tw"),
];

/// Which selector a flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSlot {
    Source,
    Target,
}

/// Region code for a currency's flag.
///
/// Unknown currencies use their first two letters, lowercased. That guess
/// is often not a real region (e.g. "XAF" gives "xa").
pub fn flag_region(code: &CurrencyCode) -> String {
    KNOWN_REGIONS
        .iter()
        .find(|(currency, _)| *currency == code.code())
        .map(|(_, region)| region.to_string())
        .unwrap_or_else(|| code.code().chars().take(2).collect::<String>().to_lowercase())
}

/// Flag image URL for a currency.
pub fn flag_url(code: &CurrencyCode) -> String {
    format!("{}/{}.png", FLAG_CDN, flag_region(code))
}

/// Receives flag updates. Nothing is read back.
pub trait FlagSink: Send + Sync {
    /// Show the flag for `code` in `slot`.
    fn show_flag(&self, slot: FlagSlot, code: &CurrencyCode, url: &str);
}

/// Discards flag updates.
#[derive(Debug, Default)]
pub struct NoopFlagSink;

impl FlagSink for NoopFlagSink {
    fn show_flag(&self, _slot: FlagSlot, _code: &CurrencyCode, _url: &str) {}
}

/// Writes flag updates to the debug log.
#[derive(Debug, Default)]
pub struct LogFlagSink;

impl FlagSink for LogFlagSink {
    fn show_flag(&self, slot: FlagSlot, code: &CurrencyCode, url: &str) {
        debug!(slot = ?slot, code = %code, url, "Flag updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_flags() {
        assert_eq!(flag_url(&CurrencyCode::sgd()), "https://flagcdn.com/w80/sg.png");
        assert_eq!(flag_url(&CurrencyCode::eur()), "https://flagcdn.com/w80/eu.png");
        assert_eq!(flag_region(&CurrencyCode::new("ILS")), "il");
    }

    #[test]
    fn test_unknown_flag_uses_code_prefix() {
        assert_eq!(flag_region(&CurrencyCode::new("VND")), "vn");
        assert_eq!(flag_region(&CurrencyCode::new("XAF")), "xa");
        assert_eq!(flag_region(&CurrencyCode::new("A")), "a");
    }
}
