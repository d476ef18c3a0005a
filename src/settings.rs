//! Environment-driven configuration.

use std::env;

use log::warn;

use crate::constants::DEFAULT_USD_CNY_RATE;
use crate::errors::ConfigError;

/// Runtime settings. Flex credentials are required; everything else has a
/// sensible default.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Flex web service token (`IBKR_FLEX_TOKEN`).
    pub flex_token: String,
    /// Flex query id (`IBKR_QUERY_ID`).
    pub flex_query_id: String,
    /// Flat USD→CNY rate (`USD_CNY_RATE`); an unparseable value falls back
    /// to the default with a warning.
    pub usd_cny_rate: f64,
    /// Whether to resolve per-date rates (`USE_DYNAMIC_EXCHANGE_RATES`).
    pub use_dynamic_rates: bool,
    /// First year to cover in multi-year fetches (`FIRST_TRADE_YEAR`).
    pub first_trade_year: Option<i32>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let flex_token = get("IBKR_FLEX_TOKEN").unwrap_or_default();
        if flex_token.is_empty() {
            return Err(ConfigError::MissingKey("IBKR_FLEX_TOKEN"));
        }
        let flex_query_id = get("IBKR_QUERY_ID").unwrap_or_default();
        if flex_query_id.is_empty() {
            return Err(ConfigError::MissingKey("IBKR_QUERY_ID"));
        }

        let usd_cny_rate = match get("USD_CNY_RATE") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Unparseable USD_CNY_RATE {:?}, using default {}", raw, DEFAULT_USD_CNY_RATE);
                DEFAULT_USD_CNY_RATE
            }),
            None => DEFAULT_USD_CNY_RATE,
        };
        let use_dynamic_rates = get("USE_DYNAMIC_EXCHANGE_RATES")
            .map(|raw| raw.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let first_trade_year = match get("FIRST_TRADE_YEAR") {
            Some(raw) => Some(raw.parse().map_err(|_| {
                ConfigError::InvalidValue(format!("FIRST_TRADE_YEAR: {raw}"))
            })?),
            None => None,
        };

        Ok(Self {
            flex_token,
            flex_query_id,
            usd_cny_rate,
            use_dynamic_rates,
            first_trade_year,
        })
    }
}
