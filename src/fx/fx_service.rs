//! USD→CNY exchange rate service with a per-date cache.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::constants::{EXCHANGE_RATE_API_URL, FRANKFURTER_API_URL};

use super::fx_traits::RateProvider;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches and caches USD→CNY rates, one per calendar date.
///
/// Rates come from free public endpoints tried in order: a historical
/// endpoint for the requested date, then a latest-rate endpoint. A date that
/// cannot be resolved at all is pinned to the caller's fallback, so every
/// row for that date sees the same value within a run and across runs.
pub struct ExchangeRateService {
    client: Client,
    historical_url: String,
    latest_url: String,
    cache_file: Option<PathBuf>,
    cache: RwLock<HashMap<String, f64>>,
}

impl ExchangeRateService {
    pub fn new(cache_file: Option<PathBuf>) -> Self {
        Self::with_endpoints(
            cache_file,
            FRANKFURTER_API_URL.to_string(),
            EXCHANGE_RATE_API_URL.to_string(),
        )
    }

    pub fn with_endpoints(
        cache_file: Option<PathBuf>,
        historical_url: String,
        latest_url: String,
    ) -> Self {
        let cache = cache_file.as_deref().map(load_cache).unwrap_or_default();
        Self {
            client: Client::new(),
            historical_url,
            latest_url,
            cache_file,
            cache: RwLock::new(cache),
        }
    }

    fn fetch_rate(&self, date: &str) -> Option<f64> {
        self.fetch_historical(date)
            .or_else(|| self.fetch_latest())
    }

    fn fetch_historical(&self, date: &str) -> Option<f64> {
        let url = format!("{}/{}", self.historical_url, date);
        let response = self
            .client
            .get(&url)
            .query(&[("from", "USD"), ("to", "CNY")])
            .timeout(FETCH_TIMEOUT)
            .send()
            .ok()?;
        if !response.status().is_success() {
            debug!("Historical rate endpoint returned {} for {}", response.status(), date);
            return None;
        }
        let body: Value = response.json().ok()?;
        body.get("rates")?.get("CNY")?.as_f64()
    }

    fn fetch_latest(&self) -> Option<f64> {
        let response = self
            .client
            .get(&self.latest_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: Value = response.json().ok()?;
        body.get("rates")?.get("CNY")?.as_f64()
    }

    fn save_cache(&self) {
        let Some(path) = &self.cache_file else { return };
        let Ok(cache) = self.cache.read() else { return };
        let result = File::create(path)
            .map_err(|e| e.to_string())
            .and_then(|file| {
                serde_json::to_writer_pretty(BufWriter::new(file), &*cache)
                    .map_err(|e| e.to_string())
            });
        if let Err(err) = result {
            warn!("Failed to save exchange rate cache to {}: {}", path.display(), err);
        }
    }
}

impl RateProvider for ExchangeRateService {
    fn get_rate(&self, date: &str, fallback: f64) -> f64 {
        let date = normalize_date(date);
        if let Ok(cache) = self.cache.read() {
            if let Some(rate) = cache.get(&date) {
                return *rate;
            }
        }

        let rate = match self.fetch_rate(&date) {
            Some(rate) => {
                debug!("Fetched USD/CNY rate {} for {}", rate, date);
                rate
            }
            None => {
                warn!("No exchange rate available for {}, using fallback {}", date, fallback);
                fallback
            }
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(date, rate);
        }
        self.save_cache();
        rate
    }
}

/// Static-rate oracle for the fixed-rate path and for tests.
pub struct FixedRateProvider(pub f64);

impl RateProvider for FixedRateProvider {
    fn get_rate(&self, _date: &str, _fallback: f64) -> f64 {
        self.0
    }
}

/// `YYYYMMDD` → `YYYY-MM-DD`; already-hyphenated input passes through.
pub(crate) fn normalize_date(date: &str) -> String {
    if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &date[0..4], &date[4..6], &date[6..8])
    } else {
        date.to_string()
    }
}

fn load_cache(path: &Path) -> HashMap<String, f64> {
    if !path.exists() {
        return HashMap::new();
    }
    let result = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())
        });
    match result {
        Ok(cache) => cache,
        Err(err) => {
            warn!("Failed to load exchange rate cache from {}: {}", path.display(), err);
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("20250115"), "2025-01-15");
        assert_eq!(normalize_date("2025-01-15"), "2025-01-15");
        assert_eq!(normalize_date("bad"), "bad");
    }

    #[test]
    fn test_fixed_rate_provider_ignores_date_and_fallback() {
        let provider = FixedRateProvider(7.2);
        assert_eq!(provider.get_rate("20250101", 1.0), 7.2);
        assert_eq!(provider.get_rate("2024-06-30", 9.9), 7.2);
    }

    #[test]
    fn test_cached_rate_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        std::fs::write(&path, r#"{"2025-01-15": 7.1}"#).unwrap();

        // Unroutable endpoints: a network attempt would fail, not hang.
        let service = ExchangeRateService::with_endpoints(
            Some(path),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        assert_eq!(service.get_rate("20250115", 7.2), 7.1);
    }

    #[test]
    fn test_fallback_is_cached_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");

        let service = ExchangeRateService::with_endpoints(
            Some(path.clone()),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        assert_eq!(service.get_rate("20250116", 7.2), 7.2);

        // A fresh service reads the pinned fallback back from disk.
        let reloaded = ExchangeRateService::with_endpoints(
            Some(path),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        assert_eq!(reloaded.get_rate("2025-01-16", 1.0), 7.2);
    }

    #[test]
    fn test_historical_endpoint_preferred() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/2025-01-15")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"base": "USD", "rates": {"CNY": 7.25}}"#)
            .create();

        let service = ExchangeRateService::with_endpoints(
            None,
            server.url(),
            "http://127.0.0.1:9".to_string(),
        );
        assert_eq!(service.get_rate("20250115", 7.2), 7.25);
    }

    #[test]
    fn test_latest_endpoint_used_when_historical_fails() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/2025-01-15")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create();
        server
            .mock("GET", "/latest")
            .with_status(200)
            .with_body(r#"{"rates": {"CNY": 7.3}}"#)
            .create();

        let service = ExchangeRateService::with_endpoints(
            None,
            server.url(),
            format!("{}/latest", server.url()),
        );
        assert_eq!(service.get_rate("20250115", 7.2), 7.3);
    }

    #[test]
    fn test_corrupt_cache_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        std::fs::write(&path, "not json").unwrap();
        let service = ExchangeRateService::with_endpoints(
            Some(path),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        assert_eq!(service.get_rate("20250115", 7.2), 7.2);
    }
}
