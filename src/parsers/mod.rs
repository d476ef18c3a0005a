pub mod accounts;
pub mod parser_model;
pub mod statement_parser;

pub use accounts::{latest_positions_and_cash, process_accounts, process_years, ParsedTables};
pub use parser_model::{
    CashReport, ClosedLot, DepositWithdrawal, Dividend, OpenPosition, TransactionType,
    WithholdingTax,
};
pub use statement_parser::{
    parse_cash_report, parse_closed_lots, parse_deposits_withdrawals, parse_dividends,
    parse_open_positions, parse_withholding_tax, safe_f64,
};
