//! Trailing stop-loss tracking and position monitoring.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};

use super::stoploss_errors::StopLossError;
use super::stoploss_model::{CheckAction, PositionCheck, TrailingStop};
use super::stoploss_traits::TradingGateway;

/// Tracks trailing stops per symbol, persisting them as JSON so peaks
/// survive restarts.
pub struct StopLossManager {
    state_file: Option<PathBuf>,
    stops: HashMap<String, TrailingStop>,
}

impl StopLossManager {
    pub fn new(state_file: Option<PathBuf>) -> Self {
        let stops = state_file.as_deref().map(load_stops).unwrap_or_default();
        Self { state_file, stops }
    }

    /// Create or ratchet the trailing stop for a symbol.
    ///
    /// The peak only moves up: a price below the recorded peak leaves both
    /// the peak and the stop where they are.
    pub fn set_trailing_stop(
        &mut self,
        symbol: &str,
        current_price: f64,
        trailing_percent: f64,
    ) {
        match self.stops.get_mut(symbol) {
            Some(stop) => {
                stop.trailing_percent = trailing_percent;
                if current_price > stop.peak_price {
                    stop.peak_price = current_price;
                    stop.stop_price = current_price * (1.0 - trailing_percent / 100.0);
                    stop.last_updated = Utc::now().to_rfc3339();
                    info!(
                        "{}: peak raised to {:.2}, stop now {:.2}",
                        symbol, stop.peak_price, stop.stop_price
                    );
                }
            }
            None => {
                let stop_price = current_price * (1.0 - trailing_percent / 100.0);
                info!(
                    "{}: trailing stop {}% set at price {:.2}, stop {:.2}",
                    symbol, trailing_percent, current_price, stop_price
                );
                self.stops.insert(
                    symbol.to_string(),
                    TrailingStop {
                        symbol: symbol.to_string(),
                        trailing_percent,
                        peak_price: current_price,
                        stop_price,
                        last_updated: Utc::now().to_rfc3339(),
                    },
                );
            }
        }
        self.save();
    }

    /// Ratchet on the new price, then report whether the stop fired.
    ///
    /// Returns `None` for an untracked symbol, otherwise the trigger flag
    /// and the effective stop price.
    pub fn check_triggered(&mut self, symbol: &str, current_price: f64) -> Option<(bool, f64)> {
        let mut raised = false;
        let stop_price = {
            let stop = self.stops.get_mut(symbol)?;
            if current_price > stop.peak_price {
                stop.peak_price = current_price;
                stop.stop_price = current_price * (1.0 - stop.trailing_percent / 100.0);
                stop.last_updated = Utc::now().to_rfc3339();
                raised = true;
                info!(
                    "{}: new high {:.2}, stop raised to {:.2}",
                    symbol, current_price, stop.stop_price
                );
            }
            stop.stop_price
        };
        if raised {
            self.save();
        }
        Some((current_price <= stop_price, stop_price))
    }

    pub fn get(&self, symbol: &str) -> Option<&TrailingStop> {
        self.stops.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.stops.contains_key(symbol)
    }

    pub fn stops(&self) -> &HashMap<String, TrailingStop> {
        &self.stops
    }

    pub fn remove(&mut self, symbol: &str) {
        if self.stops.remove(symbol).is_some() {
            info!("{}: trailing stop removed", symbol);
            self.save();
        }
    }

    fn save(&self) {
        let Some(path) = &self.state_file else { return };
        let result = File::create(path)
            .map_err(|e| e.to_string())
            .and_then(|file| {
                serde_json::to_writer_pretty(BufWriter::new(file), &self.stops)
                    .map_err(|e| e.to_string())
            });
        if let Err(err) = result {
            warn!("Failed to save stop-loss state to {}: {}", path.display(), err);
        }
    }
}

fn load_stops(path: &Path) -> HashMap<String, TrailingStop> {
    if !path.exists() {
        return HashMap::new();
    }
    let result = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())
        });
    match result {
        Ok(stops) => stops,
        Err(err) => {
            warn!("Failed to load stop-loss state from {}: {}", path.display(), err);
            HashMap::new()
        }
    }
}

/// Walks the gateway's open positions and evaluates each against its
/// trailing stop, optionally placing stop orders when one fires.
pub struct StopLossChecker {
    gateway: Arc<dyn TradingGateway>,
    manager: StopLossManager,
    default_trailing_percent: f64,
}

impl StopLossChecker {
    pub fn new(
        gateway: Arc<dyn TradingGateway>,
        manager: StopLossManager,
        default_trailing_percent: f64,
    ) -> Self {
        Self {
            gateway,
            manager,
            default_trailing_percent,
        }
    }

    /// Check every long position once.
    ///
    /// Short and flat positions are skipped, as are symbols without a
    /// market quote. Untracked symbols get a trailing stop at the default
    /// percentage seeded from the current price. With `auto_execute` a
    /// triggered stop places a sell stop order through the gateway; an
    /// order failure is recorded on the result, not raised.
    pub fn check_positions(&mut self, auto_execute: bool) -> Result<Vec<PositionCheck>, StopLossError> {
        let positions = self.gateway.open_positions()?;
        info!("Checking stop-loss conditions for {} position(s)", positions.len());

        let mut results = Vec::new();
        for position in positions {
            if position.quantity <= 0 {
                debug!("{}: not a long position, skipping", position.symbol);
                continue;
            }
            let Some(current_price) = self.gateway.market_price(&position.symbol)? else {
                warn!("{}: no market price available, skipping", position.symbol);
                continue;
            };

            if !self.manager.contains(&position.symbol) {
                self.manager.set_trailing_stop(
                    &position.symbol,
                    current_price,
                    self.default_trailing_percent,
                );
            }
            let Some((triggered, stop_price)) =
                self.manager.check_triggered(&position.symbol, current_price)
            else {
                continue;
            };

            let unrealized_pnl = (current_price - position.avg_cost) * position.quantity as f64;
            let pnl_percent = if position.avg_cost == 0.0 {
                0.0
            } else {
                (current_price - position.avg_cost) / position.avg_cost * 100.0
            };

            let action = if triggered {
                warn!(
                    "{}: stop triggered, price {:.2} <= stop {:.2}",
                    position.symbol, current_price, stop_price
                );
                if auto_execute {
                    match self.gateway.place_stop_order(
                        &position.symbol,
                        position.quantity,
                        stop_price,
                    ) {
                        Ok(order_id) => {
                            info!("{}: stop order {} placed", position.symbol, order_id);
                            CheckAction::OrderPlaced { order_id }
                        }
                        Err(err) => {
                            error!("{}: stop order failed: {}", position.symbol, err);
                            CheckAction::OrderFailed {
                                message: err.to_string(),
                            }
                        }
                    }
                } else {
                    CheckAction::ManualActionSuggested
                }
            } else {
                debug!(
                    "{}: price {:.2}, stop {:.2}, unrealized {:+.2} ({:+.2}%)",
                    position.symbol, current_price, stop_price, unrealized_pnl, pnl_percent
                );
                CheckAction::None
            };

            results.push(PositionCheck {
                symbol: position.symbol,
                quantity: position.quantity,
                avg_cost: position.avg_cost,
                current_price,
                stop_price,
                unrealized_pnl,
                pnl_percent,
                triggered,
                action,
            });
        }
        Ok(results)
    }

    pub fn manager(&self) -> &StopLossManager {
        &self.manager
    }
}
