use serde::{Deserialize, Serialize};

/// Trailing stop state for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingStop {
    pub symbol: String,
    /// Percent below the peak at which the stop triggers.
    pub trailing_percent: f64,
    /// Highest price seen since tracking began; only moves up.
    pub peak_price: f64,
    pub stop_price: f64,
    /// RFC 3339 timestamp of the last ratchet.
    pub last_updated: String,
}

/// Position as reported by the trading gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPosition {
    pub symbol: String,
    pub quantity: i64,
    pub avg_cost: f64,
}

/// Outcome of checking one position against its trailing stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionCheck {
    pub symbol: String,
    pub quantity: i64,
    pub avg_cost: f64,
    pub current_price: f64,
    pub stop_price: f64,
    pub unrealized_pnl: f64,
    pub pnl_percent: f64,
    pub triggered: bool,
    pub action: CheckAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CheckAction {
    /// Stop not triggered, nothing to do.
    None,
    /// Stop triggered and an order was placed.
    OrderPlaced { order_id: String },
    /// Stop triggered but the order was rejected.
    OrderFailed { message: String },
    /// Stop triggered with auto-execution disabled.
    ManualActionSuggested,
}
