//! Multi-account and multi-year aggregation of parsed statement tables.

use log::{debug, info};

use crate::flex::StatementSet;

use super::parser_model::{
    CashReport, ClosedLot, DepositWithdrawal, Dividend, OpenPosition, WithholdingTax,
};
use super::statement_parser::{
    parse_cash_report, parse_closed_lots, parse_deposits_withdrawals, parse_dividends,
    parse_open_positions, parse_withholding_tax,
};

/// Flat record tables combined across accounts and fetches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTables {
    pub trades: Vec<ClosedLot>,
    pub dividends: Vec<Dividend>,
    pub taxes: Vec<WithholdingTax>,
    pub deposits: Vec<DepositWithdrawal>,
}

impl ParsedTables {
    /// Concatenate tables from several fetches, preserving order.
    pub fn combine(sets: Vec<ParsedTables>) -> ParsedTables {
        let mut combined = ParsedTables::default();
        for set in sets {
            combined.trades.extend(set.trades);
            combined.dividends.extend(set.dividends);
            combined.taxes.extend(set.taxes);
            combined.deposits.extend(set.deposits);
        }
        combined
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
            && self.dividends.is_empty()
            && self.taxes.is_empty()
            && self.deposits.is_empty()
    }
}

/// Parse every account in a statement set into combined flat tables.
///
/// With several accounts each record is tagged with its account id (or a
/// synthesized `Account_N` placeholder); a single account stays untagged.
pub fn process_accounts(set: &StatementSet) -> ParsedTables {
    match set {
        StatementSet::Single(statement) => {
            debug!("Processing single account statement");
            ParsedTables {
                trades: parse_closed_lots(statement),
                dividends: parse_dividends(statement),
                taxes: parse_withholding_tax(statement),
                deposits: parse_deposits_withdrawals(statement),
            }
        }
        StatementSet::Many(statements) => {
            info!("Processing {} accounts...", statements.len());
            let mut tables = ParsedTables::default();
            for (idx, statement) in statements.iter().enumerate() {
                let account_id = statement
                    .account_id()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Account_{}", idx + 1));
                debug!("Processing account {}", account_id);

                let mut trades = parse_closed_lots(statement);
                for row in &mut trades {
                    row.account = Some(account_id.clone());
                }
                let mut dividends = parse_dividends(statement);
                for row in &mut dividends {
                    row.account = Some(account_id.clone());
                }
                let mut taxes = parse_withholding_tax(statement);
                for row in &mut taxes {
                    row.account = Some(account_id.clone());
                }
                let mut deposits = parse_deposits_withdrawals(statement);
                for row in &mut deposits {
                    row.account = Some(account_id.clone());
                }

                tables.trades.extend(trades);
                tables.dividends.extend(dividends);
                tables.taxes.extend(taxes);
                tables.deposits.extend(deposits);
            }
            info!(
                "Total across all accounts: {} trades, {} dividends, {} taxes, {} deposits",
                tables.trades.len(),
                tables.dividends.len(),
                tables.taxes.len(),
                tables.deposits.len()
            );
            tables
        }
    }
}

/// Parse and combine several fetches (one per year) in order.
pub fn process_years(sets: &[StatementSet]) -> ParsedTables {
    ParsedTables::combine(sets.iter().map(process_accounts).collect())
}

/// Open positions and cash snapshot for the performance path.
///
/// Both describe end-of-period state, so the last statement in document
/// order (the most recent) is the one that matters.
pub fn latest_positions_and_cash(set: &StatementSet) -> (Vec<OpenPosition>, Option<CashReport>) {
    match set.statements().last() {
        Some(statement) => (parse_open_positions(statement), parse_cash_report(statement)),
        None => (Vec::new(), None),
    }
}
