pub mod fx_service;
pub mod fx_traits;

pub use fx_service::{ExchangeRateService, FixedRateProvider};
pub use fx_traits::{resolve_rate, RateProvider};
