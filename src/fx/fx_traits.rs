/// Boundary to the exchange-rate oracle.
///
/// Implementations never fail: the worst case is the caller-supplied
/// fallback rate, so report calculators stay infallible.
pub trait RateProvider {
    /// USD→CNY rate for a date in `YYYYMMDD` or `YYYY-MM-DD` form.
    fn get_rate(&self, date: &str, fallback: f64) -> f64;
}

/// Per-row rate resolution: the oracle's date-specific rate when dynamic
/// rates are enabled, the flat default otherwise.
pub fn resolve_rate(rates: Option<&dyn RateProvider>, date: &str, default_rate: f64) -> f64 {
    match rates {
        Some(provider) => provider.get_rate(date, default_rate),
        None => default_rate,
    }
}
