pub mod stoploss_errors;
pub mod stoploss_model;
pub mod stoploss_service;
pub mod stoploss_traits;

pub use stoploss_errors::StopLossError;
pub use stoploss_model::{CheckAction, GatewayPosition, PositionCheck, TrailingStop};
pub use stoploss_service::{StopLossChecker, StopLossManager};
pub use stoploss_traits::TradingGateway;
