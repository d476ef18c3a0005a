//! Shared constants and protocol defaults.

/// Flex Query web service endpoint that requests report generation.
pub const FLEX_SEND_REQUEST_URL: &str =
    "https://gdcdyn.interactivebrokers.com/Universal/servlet/FlexStatementService.SendRequest";

/// Flex Query web service endpoint that retrieves a generated report.
pub const FLEX_GET_STATEMENT_URL: &str =
    "https://gdcdyn.interactivebrokers.com/Universal/servlet/FlexStatementService.GetStatement";

/// Flex API protocol version sent with every call.
pub const FLEX_API_VERSION: &str = "3";

/// Poll attempts before giving up on a report.
pub const MAX_POLL_ATTEMPTS: u32 = 3;

/// Flat delay between polls while the report is still generating, seconds.
pub const RETRY_DELAY_SECS: u64 = 2;

/// Multiplier applied per attempt when a poll fails at the transport level.
pub const RETRY_BACKOFF: u32 = 2;

/// Pause between requesting a report and the first poll, seconds.
pub const REPORT_WARMUP_SECS: u64 = 2;

/// Default USD/CNY rate when no dynamic rate is available.
pub const DEFAULT_USD_CNY_RATE: f64 = 7.2;

/// PRC individual income tax rate on investment income.
pub const CHINA_INVESTMENT_TAX_RATE: f64 = 0.20;

/// Historical exchange rate endpoint, tried first.
pub const FRANKFURTER_API_URL: &str = "https://api.frankfurter.app";

/// Latest-rate endpoint used when no historical rate is available.
pub const EXCHANGE_RATE_API_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Trailing percentage applied to newly discovered positions.
pub const DEFAULT_TRAILING_PERCENT: f64 = 5.0;
