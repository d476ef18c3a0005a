//! China tax summary report types.
//!
//! Serialized key names are the report's original section and column
//! headers. A category is present only when its source table had rows;
//! consumers probe key presence to decide what to render.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaxSummaryReport {
    #[serde(rename = "Trade_Summary", skip_serializing_if = "Option::is_none")]
    pub trade: Option<TradeSummary>,
    #[serde(rename = "Dividend_Summary", skip_serializing_if = "Option::is_none")]
    pub dividend: Option<DividendSummary>,
    #[serde(rename = "Tax_Summary", skip_serializing_if = "Option::is_none")]
    pub tax: Option<TaxSummary>,
    #[serde(rename = "China_Tax_Calculation", skip_serializing_if = "Option::is_none")]
    pub china_tax: Option<ChinaTaxCalculation>,
    #[serde(rename = "Account_Summary", skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountSummary>,
}

impl TaxSummaryReport {
    pub fn is_empty(&self) -> bool {
        self.trade.is_none()
            && self.dividend.is_none()
            && self.tax.is_none()
            && self.china_tax.is_none()
            && self.account.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSummary {
    #[serde(rename = "Total_Trades")]
    pub total_trades: usize,
    #[serde(rename = "USD_Trades")]
    pub usd_trades: usize,
    #[serde(rename = "Realized_P&L_USD")]
    pub realized_pnl_usd: f64,
    #[serde(rename = "Realized_P&L_CNY")]
    pub realized_pnl_cny: f64,
    #[serde(rename = "Total_Commission_USD")]
    pub total_commission_usd: f64,
    #[serde(rename = "Total_Commission_CNY")]
    pub total_commission_cny: f64,
    #[serde(rename = "Net_P&L_USD")]
    pub net_pnl_usd: f64,
    #[serde(rename = "Net_P&L_CNY")]
    pub net_pnl_cny: f64,
    #[serde(rename = "Average_Exchange_Rate")]
    pub average_exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendSummary {
    #[serde(rename = "Total_Dividends")]
    pub total_dividends: usize,
    #[serde(rename = "Total_Amount_USD")]
    pub total_amount_usd: f64,
    #[serde(rename = "Total_Amount_CNY")]
    pub total_amount_cny: f64,
    #[serde(rename = "Average_Exchange_Rate")]
    pub average_exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxSummary {
    #[serde(rename = "Total_Withholding_Tax_USD")]
    pub total_withholding_tax_usd: f64,
    #[serde(rename = "Total_Withholding_Tax_CNY")]
    pub total_withholding_tax_cny: f64,
    #[serde(rename = "Average_Exchange_Rate")]
    pub average_exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChinaTaxCalculation {
    #[serde(rename = "Taxable_Income_CNY")]
    pub taxable_income_cny: f64,
    #[serde(rename = "Tax_Due_20pct_CNY")]
    pub tax_due_cny: f64,
    #[serde(rename = "Foreign_Tax_Credit_CNY")]
    pub foreign_tax_credit_cny: f64,
    #[serde(rename = "Tax_Payable_CNY")]
    pub tax_payable_cny: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    #[serde(rename = "Total_Deposits_Count")]
    pub total_deposits_count: usize,
    #[serde(rename = "Total_Withdrawals_Count")]
    pub total_withdrawals_count: usize,
    #[serde(rename = "Total_Deposits_Base_Currency")]
    pub total_deposits_base: f64,
    #[serde(rename = "Total_Withdrawals_Base_Currency")]
    pub total_withdrawals_base: f64,
    #[serde(rename = "Net_Deposits_Base_Currency")]
    pub net_deposits_base: f64,
}
