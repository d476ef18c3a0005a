//! Flat record types extracted from Flex statements.
//!
//! Serialized field names keep the report's original column headers, which
//! downstream spreadsheet and JSON consumers key on.

use serde::Serialize;

/// One closed lot: a matched buy/sell pair whose P&L has been realized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedLot {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Description")]
    pub description: String,
    /// Always positive; the direction lives in `buy_sell`.
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Amount")]
    pub proceeds: f64,
    #[serde(rename = "Cost")]
    pub cost: f64,
    /// Always zero: commissions live on execution rows, not on lots.
    #[serde(rename = "Commission")]
    pub commission: f64,
    #[serde(rename = "Realized P&L")]
    pub realized_pnl: f64,
    #[serde(rename = "Buy_Sell")]
    pub buy_sell: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Asset_Category")]
    pub asset_category: String,
    #[serde(rename = "Open_DateTime")]
    pub open_date_time: String,
    /// Set only when aggregating across multiple accounts.
    #[serde(rename = "Account", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// A dividend cash transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dividend {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Type")]
    pub txn_type: String,
    #[serde(rename = "Account", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// A withholding tax row. Amounts are stored positive regardless of the
/// report's sign convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithholdingTax {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Type")]
    pub txn_type: String,
    #[serde(rename = "Account", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

/// An external cash movement, classified by the sign of its base-currency
/// amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositWithdrawal {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "FX_Rate_To_Base")]
    pub fx_rate_to_base: f64,
    #[serde(rename = "Amount_Base_Currency")]
    pub amount_base: f64,
    #[serde(rename = "Transaction_Type")]
    pub transaction_type: TransactionType,
    #[serde(rename = "Account", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// An open position snapshot at the end of the statement period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenPosition {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Mark_Price")]
    pub mark_price: f64,
    #[serde(rename = "Position_Value")]
    pub position_value: f64,
    #[serde(rename = "Cost_Basis")]
    pub cost_basis: f64,
    #[serde(rename = "Unrealized_P&L")]
    pub unrealized_pnl: f64,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Asset_Category")]
    pub asset_category: String,
}

/// Account-level cash summary for the period, preferring the broker's
/// base-currency aggregate entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashReport {
    #[serde(rename = "Starting_Cash")]
    pub starting_cash: f64,
    #[serde(rename = "Ending_Cash")]
    pub ending_cash: f64,
    #[serde(rename = "Net_Trades_Sales")]
    pub net_trades_sales: f64,
    #[serde(rename = "Net_Trades_Purchases")]
    pub net_trades_purchases: f64,
    #[serde(rename = "Deposit_Withdrawals")]
    pub deposit_withdrawals: f64,
    #[serde(rename = "Deposits")]
    pub deposits: f64,
    #[serde(rename = "Withdrawals")]
    pub withdrawals: f64,
    #[serde(rename = "Dividends")]
    pub dividends: f64,
    #[serde(rename = "Commissions")]
    pub commissions: f64,
    #[serde(rename = "Currency")]
    pub currency: String,
}
