//! Performance report types, keyed like the original report sections.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceReport {
    #[serde(rename = "Performance_Summary", skip_serializing_if = "Option::is_none")]
    pub summary: Option<PerformanceSummary>,
    #[serde(rename = "Position_Details", skip_serializing_if = "Option::is_none")]
    pub positions: Option<PositionDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    #[serde(rename = "Beginning_Net_Worth_USD")]
    pub beginning_net_worth_usd: f64,
    #[serde(rename = "Beginning_Net_Worth_CNY")]
    pub beginning_net_worth_cny: f64,
    #[serde(rename = "Ending_Net_Worth_USD")]
    pub ending_net_worth_usd: f64,
    #[serde(rename = "Ending_Net_Worth_CNY")]
    pub ending_net_worth_cny: f64,
    #[serde(rename = "Net_Deposits_USD")]
    pub net_deposits_usd: f64,
    #[serde(rename = "Net_Deposits_CNY")]
    pub net_deposits_cny: f64,
    #[serde(rename = "Investment_Period_Days")]
    pub investment_period_days: i64,
    #[serde(rename = "Total_Return_Percent")]
    pub total_return_percent: f64,
    #[serde(rename = "Annualized_Return_Percent")]
    pub annualized_return_percent: f64,
    #[serde(rename = "Realized_ROI_Percent")]
    pub realized_roi_percent: f64,
    #[serde(rename = "Max_Drawdown_Percent")]
    pub max_drawdown_percent: f64,
    #[serde(rename = "Exchange_Rate")]
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionDetails {
    #[serde(rename = "Total_Positions")]
    pub total_positions: usize,
    #[serde(rename = "Total_Position_Value_USD")]
    pub total_position_value_usd: f64,
    #[serde(rename = "Total_Position_Value_CNY")]
    pub total_position_value_cny: f64,
    #[serde(rename = "Total_Cost_Basis_USD")]
    pub total_cost_basis_usd: f64,
    #[serde(rename = "Total_Unrealized_P&L_USD")]
    pub total_unrealized_pnl_usd: f64,
    #[serde(rename = "Total_Unrealized_P&L_CNY")]
    pub total_unrealized_pnl_cny: f64,
}
