use super::stoploss_errors::StopLossError;
use super::stoploss_model::GatewayPosition;

/// Boundary to the live trading gateway.
///
/// Implementations wrap a broker terminal connection; the stop-loss checker
/// only needs these three calls.
pub trait TradingGateway {
    fn open_positions(&self) -> Result<Vec<GatewayPosition>, StopLossError>;

    /// Latest market price, or `None` when the feed has no quote for the
    /// symbol.
    fn market_price(&self, symbol: &str) -> Result<Option<f64>, StopLossError>;

    /// Place a stop order, returning the broker's order id.
    fn place_stop_order(
        &self,
        symbol: &str,
        quantity: i64,
        stop_price: f64,
    ) -> Result<String, StopLossError>;
}
