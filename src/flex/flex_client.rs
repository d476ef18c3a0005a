use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::constants::{
    FLEX_API_VERSION, FLEX_GET_STATEMENT_URL, FLEX_SEND_REQUEST_URL, MAX_POLL_ATTEMPTS,
    REPORT_WARMUP_SECS, RETRY_BACKOFF, RETRY_DELAY_SECS,
};

use super::flex_errors::FlexError;
use super::flex_model::{PollOutcome, StatementSet};
use super::xml::xml_to_value;

/// Tunable fetch policy. Defaults mirror the production service behavior;
/// tests zero the delays and point the URLs at a local server.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub send_request_url: String,
    pub get_statement_url: String,
    /// Pause between requesting a report and the first poll.
    pub warmup: Duration,
    /// Flat delay while the report is still generating; also the base for
    /// the transport-error backoff.
    pub retry_delay: Duration,
    pub retry_backoff: u32,
    pub max_poll_attempts: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            send_request_url: FLEX_SEND_REQUEST_URL.to_string(),
            get_statement_url: FLEX_GET_STATEMENT_URL.to_string(),
            warmup: Duration::from_secs(REPORT_WARMUP_SECS),
            retry_delay: Duration::from_secs(RETRY_DELAY_SECS),
            retry_backoff: RETRY_BACKOFF,
            max_poll_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

/// Client for the two-phase Flex Query web service: request a report, then
/// poll for it under a reference code.
pub struct FlexQueryClient {
    client: Client,
    token: String,
    query_id: String,
    config: FetchConfig,
}

impl FlexQueryClient {
    pub fn new(
        token: impl Into<String>,
        query_id: impl Into<String>,
    ) -> Result<Self, FlexError> {
        Self::with_config(token, query_id, FetchConfig::default())
    }

    pub fn with_config(
        token: impl Into<String>,
        query_id: impl Into<String>,
        config: FetchConfig,
    ) -> Result<Self, FlexError> {
        let token = token.into();
        let query_id = query_id.into();
        if token.is_empty() || query_id.is_empty() {
            return Err(FlexError::InvalidCredentials(
                "token and query id cannot be empty".to_string(),
            ));
        }
        debug!("Initialized Flex Query client for query {}", query_id);
        Ok(Self {
            client: Client::new(),
            token,
            query_id,
            config,
        })
    }

    /// Ask the service to generate a report, returning the reference code
    /// used to poll for it. Date overrides are `YYYYMMDD`.
    pub fn request_report(
        &self,
        from_date: Option<&str>,
        to_date: Option<&str>,
    ) -> Result<String, FlexError> {
        let mut params: Vec<(&str, &str)> = vec![
            ("t", &self.token),
            ("q", &self.query_id),
            ("v", FLEX_API_VERSION),
        ];
        if let Some(from) = from_date {
            params.push(("fd", from));
        }
        if let Some(to) = to_date {
            params.push(("td", to));
        }

        match (from_date, to_date) {
            (Some(from), Some(to)) => info!("Requesting Flex report ({} to {})...", from, to),
            _ => info!("Requesting Flex report..."),
        }

        let body = self.get_text(&self.config.send_request_url, &params)?;
        let envelope = xml_to_value(&body)?;
        let response = envelope.get("FlexStatementResponse").ok_or_else(|| {
            FlexError::MalformedEnvelope("FlexStatementResponse missing".to_string())
        })?;

        if response.get("Status").and_then(Value::as_str) == Some("Success") {
            let reference_code = response
                .get("ReferenceCode")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    FlexError::MalformedEnvelope("ReferenceCode missing".to_string())
                })?;
            info!("Report request accepted, reference code {}", reference_code);
            Ok(reference_code.to_string())
        } else {
            let message = response
                .get("ErrorMessage")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            Err(FlexError::RequestFailed(message.to_string()))
        }
    }

    /// Poll for a generated report.
    ///
    /// "Not yet ready" waits the flat retry delay before the next attempt;
    /// transport errors back off exponentially. Both draw from the same
    /// attempt budget.
    pub fn poll_report(&self, reference_code: &str) -> Result<StatementSet, FlexError> {
        let params: Vec<(&str, &str)> = vec![
            ("t", &self.token),
            ("q", reference_code),
            ("v", FLEX_API_VERSION),
        ];
        let max = self.config.max_poll_attempts;

        for attempt in 0..max {
            let body = match self.get_text(&self.config.get_statement_url, &params) {
                Ok(body) => body,
                Err(err) => {
                    warn!("Poll request failed (attempt {}/{}): {}", attempt + 1, max, err);
                    if attempt + 1 < max {
                        thread::sleep(self.config.retry_delay * self.config.retry_backoff.pow(attempt));
                        continue;
                    }
                    return Err(FlexError::RetriesExhausted(max));
                }
            };

            let envelope = xml_to_value(&body)?;
            match PollOutcome::classify(&envelope)? {
                PollOutcome::Ready(set) => {
                    info!("Report retrieved: {} account(s)", set.len());
                    return Ok(set);
                }
                PollOutcome::Pending => {
                    info!("Report still generating (attempt {}/{})", attempt + 1, max);
                    thread::sleep(self.config.retry_delay);
                }
                PollOutcome::Failed(message) => {
                    return Err(FlexError::RetrievalFailed(message));
                }
            }
        }

        Err(FlexError::Timeout(max))
    }

    /// Request a report, give the service time to generate it, then poll.
    pub fn fetch_data(
        &self,
        from_date: Option<&str>,
        to_date: Option<&str>,
    ) -> Result<StatementSet, FlexError> {
        let reference_code = self.request_report(from_date, to_date)?;
        thread::sleep(self.config.warmup);
        self.poll_report(&reference_code)
    }

    /// Fetch one statement set per calendar year. A year that fails is
    /// logged and skipped; the call errors only when every year fails.
    pub fn fetch_years(&self, years: &[i32]) -> Result<Vec<StatementSet>, FlexError> {
        let mut sets = Vec::with_capacity(years.len());
        for year in years {
            let from = format!("{year}0101");
            let to = format!("{year}1231");
            info!("Fetching year {}...", year);
            match self.fetch_data(Some(&from), Some(&to)) {
                Ok(set) => sets.push(set),
                Err(err) => {
                    warn!("Failed to fetch year {}: {}; continuing with remaining years", year, err)
                }
            }
        }
        if sets.is_empty() && !years.is_empty() {
            return Err(FlexError::RetrievalFailed(
                "no year could be fetched".to_string(),
            ));
        }
        Ok(sets)
    }

    fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<String, FlexError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()?
            .error_for_status()?;
        Ok(response.text()?)
    }
}
