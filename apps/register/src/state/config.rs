//! # Configuration State
//!
//! Store settings loaded once at startup.
//!
//! ## Sources (priority order)
//! 1. Environment variables (`PARTSDESK_*`)
//! 2. Defaults (this file): an Indonesian shop, rupiah, PPN 11%, 58mm paper
//!
//! | Variable | Field |
//! |---|---|
//! | `PARTSDESK_STORE_NAME` | store name on receipts |
//! | `PARTSDESK_STORE_ADDRESS` | address line on receipts |
//! | `PARTSDESK_STORE_PHONE` | phone line on receipts |
//! | `PARTSDESK_CURRENCY_SYMBOL` | e.g. `Rp` |
//! | `PARTSDESK_CURRENCY_DECIMALS` | digits after the decimal separator |
//! | `PARTSDESK_TAX_RATE_BPS` | tax rate in basis points, `1100` = 11% |
//! | `PARTSDESK_PAPER_WIDTH` | receipt width in characters |
//! | `PARTSDESK_UTC_OFFSET_MINUTES` | shop timezone, `420` = WIB |
//! | `PARTSDESK_JWT_SECRET` | HS256 secret shared with the auth service |
//! | `PARTSDESK_DB_PATH` | database file override |
//!
//! Read-only after initialization, so no lock.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, Utc};
use serde::Serialize;
use tracing::warn;

use partsdesk_core::money::CurrencyFormat;
use partsdesk_core::receipt::{StoreInfo, DEFAULT_RECEIPT_WIDTH};
use partsdesk_core::validation::validate_tax_rate_bps;
use partsdesk_core::{Money, TaxRate};

/// Western Indonesia Time, UTC+7.
const WIB_OFFSET_MINUTES: i32 = 7 * 60;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    pub store_name: String,
    pub store_address: String,
    pub store_phone: Option<String>,

    pub currency: CurrencyFormat,

    pub tax_rate: TaxRate,

    /// Receipt width in characters (32 for 58mm, 48 for 80mm)
    pub paper_width: usize,

    pub utc_offset_minutes: i32,

    #[serde(skip)]
    pub jwt_secret: Option<String>,

    #[serde(skip)]
    pub database_path: Option<PathBuf>,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            store_name: "PartsDesk Auto Parts".to_string(),
            store_address: "Jl. Otista Raya No. 12, Jakarta Timur".to_string(),
            store_phone: None,
            currency: CurrencyFormat::default(),
            tax_rate: TaxRate::ppn(),
            paper_width: DEFAULT_RECEIPT_WIDTH,
            utc_offset_minutes: WIB_OFFSET_MINUTES,
            jwt_secret: None,
            database_path: None,
        }
    }
}

impl ConfigState {
    pub fn from_env() -> Self {
        ConfigState::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unparseable values are
    /// logged and left at their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(name) = lookup("PARTSDESK_STORE_NAME") {
            config.store_name = name;
        }
        if let Some(address) = lookup("PARTSDESK_STORE_ADDRESS") {
            config.store_address = address;
        }
        config.store_phone = lookup("PARTSDESK_STORE_PHONE").filter(|p| !p.trim().is_empty());

        if let Some(symbol) = lookup("PARTSDESK_CURRENCY_SYMBOL") {
            config.currency.symbol = symbol;
        }
        if let Some(decimals) = parsed::<u8>(&lookup, "PARTSDESK_CURRENCY_DECIMALS") {
            if decimals <= 4 {
                config.currency.decimals = decimals;
            } else {
                warn!(decimals, "PARTSDESK_CURRENCY_DECIMALS out of range, ignored");
            }
        }

        if let Some(bps) = parsed::<u32>(&lookup, "PARTSDESK_TAX_RATE_BPS") {
            match validate_tax_rate_bps(bps) {
                Ok(()) => config.tax_rate = TaxRate::from_bps(bps),
                Err(e) => warn!(error = %e, "PARTSDESK_TAX_RATE_BPS ignored"),
            }
        }

        if let Some(width) = parsed::<usize>(&lookup, "PARTSDESK_PAPER_WIDTH") {
            config.paper_width = width;
        }

        if let Some(minutes) = parsed::<i32>(&lookup, "PARTSDESK_UTC_OFFSET_MINUTES") {
            if minutes.abs() < 24 * 60 {
                config.utc_offset_minutes = minutes;
            } else {
                warn!(minutes, "PARTSDESK_UTC_OFFSET_MINUTES out of range, ignored");
            }
        }

        config.jwt_secret = lookup("PARTSDESK_JWT_SECRET").filter(|s| !s.is_empty());
        config.database_path = lookup("PARTSDESK_DB_PATH").map(PathBuf::from);

        config
    }

    pub fn format_currency(&self, amount: Money) -> String {
        self.currency.format(amount)
    }

    pub fn store_info(&self) -> StoreInfo {
        StoreInfo {
            name: self.store_name.clone(),
            address: self.store_address.clone(),
            phone: self.store_phone.clone(),
        }
    }

    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// `at` in shop-local time.
    pub fn local_time(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.utc_offset())
    }

    /// Start of the shop-local day containing `now`, as UTC.
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let offset = self.utc_offset();
        now.with_timezone(&offset)
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_local_timezone(offset)
            .single()
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or(now)
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Unparseable configuration value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ConfigState {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigState::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = ConfigState::default();
        assert_eq!(config.tax_rate, TaxRate::ppn());
        assert_eq!(config.paper_width, 32);
        assert_eq!(config.format_currency(Money::from_minor(249_750)), "Rp 249.750");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PARTSDESK_STORE_NAME", "Bengkel Maju"),
            ("PARTSDESK_TAX_RATE_BPS", "1200"),
            ("PARTSDESK_PAPER_WIDTH", "48"),
            ("PARTSDESK_CURRENCY_SYMBOL", "IDR"),
            ("PARTSDESK_JWT_SECRET", "s3cret"),
        ]);
        assert_eq!(config.store_name, "Bengkel Maju");
        assert_eq!(config.tax_rate.bps(), 1200);
        assert_eq!(config.paper_width, 48);
        assert_eq!(config.format_currency(Money::from_minor(5_000)), "IDR 5.000");
        assert_eq!(config.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = config_from(&[
            ("PARTSDESK_TAX_RATE_BPS", "eleven"),
            ("PARTSDESK_PAPER_WIDTH", "-3"),
            ("PARTSDESK_UTC_OFFSET_MINUTES", "99999"),
        ]);
        assert_eq!(config.tax_rate, TaxRate::ppn());
        assert_eq!(config.paper_width, 32);
        assert_eq!(config.utc_offset_minutes, 420);

        let config = config_from(&[("PARTSDESK_TAX_RATE_BPS", "20000")]);
        assert_eq!(config.tax_rate, TaxRate::ppn());
    }

    #[test]
    fn test_start_of_day_uses_shop_timezone() {
        let config = ConfigState::default();
        // 20:00 UTC on the 1st is 03:00 WIB on the 2nd
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap();
        let start = config.start_of_day(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let config = config_from(&[("PARTSDESK_JWT_SECRET", "s3cret")]);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(json.contains("\"taxRate\":1100"));
    }
}
