pub mod summary_model;
pub mod summary_service;

pub use summary_model::{
    AccountSummary, ChinaTaxCalculation, DividendSummary, TaxSummary, TaxSummaryReport,
    TradeSummary,
};
pub use summary_service::calculate_summary;
