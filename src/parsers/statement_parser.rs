//! Tolerant extraction of flat record tables from a Flex statement.
//!
//! Statements are semi-structured: sections may be missing, collections may
//! collapse to a single object, and numeric attributes arrive as strings
//! that may be empty or malformed. Every parser here degrades instead of
//! failing: missing sections yield empty tables, bad numbers fall back to a
//! default.

use log::debug;
use serde_json::Value;

use crate::flex::FlexStatement;

use super::parser_model::{
    CashReport, ClosedLot, DepositWithdrawal, Dividend, OpenPosition, TransactionType,
    WithholdingTax,
};

/// Tolerant numeric coercion for statement attributes.
pub fn safe_f64(value: Option<&Value>, default: f64) -> f64 {
    match value {
        None | Some(Value::Null) => default,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => {
            if s.is_empty() {
                default
            } else {
                s.parse().unwrap_or(default)
            }
        }
        Some(_) => default,
    }
}

fn attr<'a>(row: &'a Value, name: &str) -> Option<&'a Value> {
    row.get(format!("@{name}").as_str())
}

fn attr_str(row: &Value, name: &str) -> String {
    attr(row, name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn attr_f64(row: &Value, name: &str, default: f64) -> f64 {
    safe_f64(attr(row, name), default)
}

/// The date half of a `date;time` attribute; a bare date passes through.
fn split_date(date_time: &str) -> String {
    date_time.split(';').next().unwrap_or_default().to_string()
}

/// The time half of a `date;time` attribute, empty when absent.
fn split_time(date_time: &str) -> String {
    match date_time.split_once(';') {
        Some((_, time)) => time.to_string(),
        None => String::new(),
    }
}

/// Cash transactions carry `dateTime` or, on older query setups, only
/// `reportDate`.
fn date_or_report_date(row: &Value) -> String {
    attr(row, "dateTime")
        .and_then(Value::as_str)
        .or_else(|| attr(row, "reportDate").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Parse closed lots from the `Trades` section.
pub fn parse_closed_lots(statement: &FlexStatement) -> Vec<ClosedLot> {
    let lots = statement.section_items("Trades", "Lot");
    if lots.is_empty() {
        debug!("No closed lot data in this period");
        return Vec::new();
    }

    let mut trades = Vec::with_capacity(lots.len());
    for lot in lots {
        let trade_date = attr_str(lot, "tradeDate");
        let date_time = attr_str(lot, "dateTime");
        let date = if trade_date.is_empty() {
            split_date(&date_time)
        } else {
            split_date(&trade_date)
        };

        trades.push(ClosedLot {
            date,
            time: split_time(&date_time),
            symbol: attr_str(lot, "symbol"),
            description: attr_str(lot, "description"),
            quantity: attr_f64(lot, "quantity", 0.0).abs(),
            price: attr_f64(lot, "tradePrice", 0.0),
            proceeds: attr_f64(lot, "proceeds", 0.0),
            cost: attr_f64(lot, "cost", 0.0),
            commission: 0.0,
            realized_pnl: attr_f64(lot, "fifoPnlRealized", 0.0),
            buy_sell: attr_str(lot, "buySell"),
            currency: attr_str(lot, "currency"),
            asset_category: attr_str(lot, "assetCategory"),
            open_date_time: attr_str(lot, "openDateTime"),
            account: None,
        });
    }
    debug!("Parsed {} closed lots", trades.len());
    trades
}

/// Parse dividend rows from the `CashTransactions` section. A row qualifies
/// when "Dividend" appears in its type or its description.
pub fn parse_dividends(statement: &FlexStatement) -> Vec<Dividend> {
    let transactions = statement.section_items("CashTransactions", "CashTransaction");
    if transactions.is_empty() {
        debug!("No cash transaction data in this period");
        return Vec::new();
    }

    let mut dividends = Vec::new();
    for transaction in transactions {
        let txn_type = attr_str(transaction, "type");
        let description = attr_str(transaction, "description");
        if !(txn_type.contains("Dividend") || description.contains("Dividend")) {
            continue;
        }
        let date_time = date_or_report_date(transaction);
        dividends.push(Dividend {
            date: split_date(&date_time),
            symbol: attr_str(transaction, "symbol"),
            description,
            amount: attr_f64(transaction, "amount", 0.0),
            currency: attr_str(transaction, "currency"),
            txn_type,
            account: None,
        });
    }
    debug!("Parsed {} dividend transactions", dividends.len());
    dividends
}

/// Parse withholding tax rows.
///
/// The dedicated `WithholdingTax` section takes precedence; without it,
/// cash transactions whose type mentions withholding or tax are scanned
/// instead. Amounts are normalized to positive.
pub fn parse_withholding_tax(statement: &FlexStatement) -> Vec<WithholdingTax> {
    let taxes = statement.section_items("WithholdingTax", "Tax");
    if !taxes.is_empty() {
        let rows: Vec<WithholdingTax> = taxes
            .iter()
            .map(|tax| WithholdingTax {
                date: attr_str(tax, "date"),
                symbol: attr_str(tax, "symbol"),
                description: attr_str(tax, "description"),
                amount: attr_f64(tax, "amount", 0.0).abs(),
                currency: attr_str(tax, "currency"),
                txn_type: attr_str(tax, "code"),
                account: None,
            })
            .collect();
        debug!("Parsed {} withholding tax rows", rows.len());
        return rows;
    }

    let transactions = statement.section_items("CashTransactions", "CashTransaction");
    if transactions.is_empty() {
        debug!("No withholding tax data in this period");
        return Vec::new();
    }

    let mut rows = Vec::new();
    for transaction in transactions {
        let txn_type = attr_str(transaction, "type");
        if !(txn_type.contains("Withholding") || txn_type.to_uppercase().contains("TAX")) {
            continue;
        }
        let date_time = date_or_report_date(transaction);
        rows.push(WithholdingTax {
            date: split_date(&date_time),
            symbol: attr_str(transaction, "symbol"),
            description: attr_str(transaction, "description"),
            amount: attr_f64(transaction, "amount", 0.0).abs(),
            currency: attr_str(transaction, "currency"),
            txn_type,
            account: None,
        });
    }
    debug!("Parsed {} withholding tax rows from cash transactions", rows.len());
    rows
}

/// Parse external cash movements, classified as deposits or withdrawals by
/// the sign of the base-currency amount.
pub fn parse_deposits_withdrawals(statement: &FlexStatement) -> Vec<DepositWithdrawal> {
    let transactions = statement.section_items("CashTransactions", "CashTransaction");
    if transactions.is_empty() {
        debug!("No deposit/withdrawal data in this period");
        return Vec::new();
    }

    let mut rows = Vec::new();
    for transaction in transactions {
        if attr_str(transaction, "type") != "Deposits/Withdrawals" {
            continue;
        }
        let amount = attr_f64(transaction, "amount", 0.0);
        let fx_rate_to_base = attr_f64(transaction, "fxRateToBase", 1.0);
        let amount_base = amount * fx_rate_to_base;

        let date_time = date_or_report_date(transaction);
        let (date, time) = match date_time.split_once(';') {
            Some((date, time)) => (date.to_string(), format_hhmmss(time)),
            None => (date_time, String::new()),
        };

        rows.push(DepositWithdrawal {
            date,
            time,
            description: attr_str(transaction, "description"),
            amount,
            currency: attr_str(transaction, "currency"),
            fx_rate_to_base,
            amount_base,
            transaction_type: if amount_base > 0.0 {
                TransactionType::Deposit
            } else {
                TransactionType::Withdrawal
            },
            account: None,
        });
    }
    debug!("Parsed {} deposits/withdrawals", rows.len());
    rows
}

/// `HHMMSS` → `HH:MM:SS`; anything else passes through untouched.
fn format_hhmmss(time: &str) -> String {
    if time.len() == 6 && time.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}:{}:{}", &time[0..2], &time[2..4], &time[4..6])
    } else {
        time.to_string()
    }
}

/// Parse end-of-period open positions.
pub fn parse_open_positions(statement: &FlexStatement) -> Vec<OpenPosition> {
    let positions = statement.section_items("OpenPositions", "OpenPosition");
    if positions.is_empty() {
        debug!("No open positions in this period");
        return Vec::new();
    }

    let rows: Vec<OpenPosition> = positions
        .iter()
        .map(|position| OpenPosition {
            symbol: attr_str(position, "symbol"),
            description: attr_str(position, "description"),
            quantity: attr_f64(position, "quantity", 0.0),
            mark_price: attr_f64(position, "markPrice", 0.0),
            position_value: attr_f64(position, "positionValue", 0.0),
            cost_basis: attr_f64(position, "costBasisMoney", 0.0),
            unrealized_pnl: attr_f64(position, "fxPnl", 0.0),
            currency: attr_str(position, "currency"),
            asset_category: attr_str(position, "assetCategory"),
        })
        .collect();
    debug!("Parsed {} open positions", rows.len());
    rows
}

/// Parse the cash report, preferring the broker's `BASE_SUMMARY` aggregate
/// over per-currency entries. Returns `None` when the section is absent.
pub fn parse_cash_report(statement: &FlexStatement) -> Option<CashReport> {
    let entries = statement.section_items("CashReport", "CashReportCurrency");
    if entries.is_empty() {
        debug!("No cash report in this period");
        return None;
    }

    let entry = entries
        .iter()
        .find(|e| attr(e, "currency").and_then(Value::as_str) == Some("BASE_SUMMARY"))
        .copied()
        .unwrap_or(entries[0]);

    Some(CashReport {
        starting_cash: attr_f64(entry, "startingCash", 0.0),
        ending_cash: attr_f64(entry, "endingCash", 0.0),
        net_trades_sales: attr_f64(entry, "netTradesSales", 0.0),
        net_trades_purchases: attr_f64(entry, "netTradesPurchases", 0.0),
        deposit_withdrawals: attr_f64(entry, "depositWithdrawals", 0.0),
        deposits: attr_f64(entry, "deposits", 0.0),
        withdrawals: attr_f64(entry, "withdrawals", 0.0),
        dividends: attr_f64(entry, "dividends", 0.0),
        commissions: attr_f64(entry, "commissions", 0.0),
        currency: attr_str(entry, "currency"),
    })
}
