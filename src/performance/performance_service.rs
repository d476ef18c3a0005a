//! Portfolio performance over the parsed record tables.
//!
//! Net worth is cash plus USD open position value. Beginning positions are
//! assumed zero-valued: the statement does not carry historical position
//! marks, so the period start is the starting cash balance alone.

use chrono::{NaiveDate, Utc};
use log::warn;

use crate::fx::{resolve_rate, RateProvider};
use crate::parsers::{CashReport, ClosedLot, DepositWithdrawal, Dividend, OpenPosition};
use crate::utils::{round2, round4};

use super::performance_model::{PerformanceReport, PerformanceSummary, PositionDetails};

/// Sources feeding the drawdown event stream, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventSource {
    Trade,
    Dividend,
    Deposit,
}

/// Build the performance report.
///
/// `cash` is the end-of-period cash snapshot; `None` treats both cash
/// balances as zero. `rates` enables per-date dynamic conversion, `None`
/// applies the flat `default_rate`.
pub fn calculate_performance(
    trades: &[ClosedLot],
    dividends: &[Dividend],
    deposits: &[DepositWithdrawal],
    positions: &[OpenPosition],
    cash: Option<&CashReport>,
    rates: Option<&dyn RateProvider>,
    default_rate: f64,
) -> PerformanceReport {
    let starting_cash = cash.map(|c| c.starting_cash).unwrap_or(0.0);
    let ending_cash = cash.map(|c| c.ending_cash).unwrap_or(0.0);

    let today = Utc::now().format("%Y%m%d").to_string();
    let earliest_trade_date = trades.iter().map(|t| t.date.as_str()).min();
    let latest_trade_date = trades.iter().map(|t| t.date.as_str()).max();

    // Period start is valued at the earliest trade date's rate, position
    // values at the latest.
    let beginning_rate = match earliest_trade_date {
        Some(date) => resolve_rate(rates, date, default_rate),
        None => default_rate,
    };
    let position_rate = resolve_rate(rates, latest_trade_date.unwrap_or(&today), default_rate);
    let current_rate = resolve_rate(rates, &today, default_rate);

    let usd_positions: Vec<&OpenPosition> =
        positions.iter().filter(|p| p.currency == "USD").collect();
    let position_value_usd: f64 = usd_positions.iter().map(|p| p.position_value).sum();

    let beginning_net_worth = starting_cash;
    let ending_net_worth = ending_cash + position_value_usd;
    let net_deposits_usd: f64 = deposits.iter().map(|d| d.amount_base).sum();

    let period_days = investment_period_days(trades, dividends, deposits);

    let total_return = if beginning_net_worth == 0.0 {
        if ending_net_worth != 0.0 {
            warn!("Beginning net worth is zero, reporting 0% total return");
        }
        0.0
    } else {
        (ending_net_worth - beginning_net_worth - net_deposits_usd) / beginning_net_worth * 100.0
    };

    let annualized_return = if period_days >= 1 {
        ((1.0 + total_return / 100.0).powf(365.0 / period_days as f64) - 1.0) * 100.0
    } else {
        0.0
    };

    // Lot cost arrives negative (money out), so the ROI denominator is the
    // magnitude of the summed cost basis.
    let usd_trades: Vec<&ClosedLot> = trades.iter().filter(|t| t.currency == "USD").collect();
    let realized_pnl: f64 = usd_trades.iter().map(|t| t.realized_pnl).sum();
    let cost_basis: f64 = usd_trades.iter().map(|t| t.cost).sum();
    let realized_roi = if cost_basis == 0.0 {
        0.0
    } else {
        realized_pnl / cost_basis.abs() * 100.0
    };

    let max_drawdown = max_drawdown_percent(
        trades,
        dividends,
        deposits,
        beginning_net_worth,
        ending_net_worth,
    );

    let mut report = PerformanceReport {
        summary: Some(PerformanceSummary {
            beginning_net_worth_usd: round2(beginning_net_worth),
            beginning_net_worth_cny: round2(beginning_net_worth * beginning_rate),
            ending_net_worth_usd: round2(ending_net_worth),
            ending_net_worth_cny: round2(ending_net_worth * position_rate),
            net_deposits_usd: round2(net_deposits_usd),
            net_deposits_cny: round2(net_deposits_usd * current_rate),
            investment_period_days: period_days,
            total_return_percent: round2(total_return),
            annualized_return_percent: round2(annualized_return),
            realized_roi_percent: round2(realized_roi),
            max_drawdown_percent: round2(max_drawdown),
            exchange_rate: round4(position_rate),
        }),
        positions: None,
    };

    if !positions.is_empty() {
        let cost_basis_usd: f64 = usd_positions.iter().map(|p| p.cost_basis).sum();
        let unrealized_usd: f64 = usd_positions.iter().map(|p| p.unrealized_pnl).sum();
        report.positions = Some(PositionDetails {
            total_positions: usd_positions.len(),
            total_position_value_usd: round2(position_value_usd),
            total_position_value_cny: round2(position_value_usd * position_rate),
            total_cost_basis_usd: round2(cost_basis_usd),
            total_unrealized_pnl_usd: round2(unrealized_usd),
            total_unrealized_pnl_cny: round2(unrealized_usd * position_rate),
        });
    }

    report
}

/// Maximum peak-to-trough decline of a reconstructed equity curve.
///
/// The curve starts at the beginning net worth and applies realized P&L,
/// dividends and cash movements in chronological order. Ties on date keep
/// trades before dividends before cash movements, then original row order.
/// The externally valued ending net worth can sit below the running total,
/// so it enters a final peak comparison.
fn max_drawdown_percent(
    trades: &[ClosedLot],
    dividends: &[Dividend],
    deposits: &[DepositWithdrawal],
    beginning: f64,
    ending: f64,
) -> f64 {
    if beginning == 0.0 {
        warn!("Beginning net worth is zero, reporting 0% max drawdown");
        return 0.0;
    }

    let mut events: Vec<(&str, EventSource, usize, f64)> = Vec::new();
    for (idx, trade) in trades.iter().enumerate() {
        events.push((trade.date.as_str(), EventSource::Trade, idx, trade.realized_pnl));
    }
    for (idx, dividend) in dividends.iter().enumerate() {
        events.push((dividend.date.as_str(), EventSource::Dividend, idx, dividend.amount));
    }
    for (idx, deposit) in deposits.iter().enumerate() {
        events.push((deposit.date.as_str(), EventSource::Deposit, idx, deposit.amount_base));
    }
    events.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

    let mut value = beginning;
    let mut peak = beginning;
    let mut max_drawdown: f64 = 0.0;
    for (_, _, _, delta) in &events {
        value += delta;
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - value) / peak * 100.0);
        }
    }

    if peak > 0.0 && ending < peak {
        max_drawdown = max_drawdown.max((peak - ending) / peak * 100.0);
    }

    max_drawdown
}

/// Day span between the earliest and latest dated row, minimum one day.
fn investment_period_days(
    trades: &[ClosedLot],
    dividends: &[Dividend],
    deposits: &[DepositWithdrawal],
) -> i64 {
    let mut dates: Vec<&str> = Vec::new();
    dates.extend(trades.iter().map(|t| t.date.as_str()));
    dates.extend(dividends.iter().map(|d| d.date.as_str()));
    dates.extend(deposits.iter().map(|d| d.date.as_str()));
    dates.retain(|d| !d.is_empty());

    let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) else {
        return 1;
    };
    match (parse_statement_date(first), parse_statement_date(last)) {
        (Some(start), Some(end)) => (end - start).num_days().max(1),
        _ => {
            warn!("Unparseable period dates ({} / {}), assuming 1 day", first, last);
            1
        }
    }
}

fn parse_statement_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y%m%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
}
