//! China tax summary over the parsed record tables.
//!
//! Row counts span the whole table; only USD rows enter the monetary
//! aggregates, rows in other currencies are excluded, not converted. Money
//! outputs round to two decimals, rate averages to four.

use log::debug;

use crate::constants::CHINA_INVESTMENT_TAX_RATE;
use crate::fx::{resolve_rate, RateProvider};
use crate::parsers::{ClosedLot, DepositWithdrawal, Dividend, TransactionType, WithholdingTax};
use crate::utils::{round2, round4};

use super::summary_model::{
    AccountSummary, ChinaTaxCalculation, DividendSummary, TaxSummary, TaxSummaryReport,
    TradeSummary,
};

/// Build the per-category tax summary.
///
/// `rates` enables per-date dynamic conversion; `None` applies the flat
/// `default_rate` throughout. An empty input table omits its category from
/// the report entirely, and the China tax calculation appears only when
/// both the trade and dividend categories are present.
pub fn calculate_summary(
    trades: &[ClosedLot],
    dividends: &[Dividend],
    taxes: &[WithholdingTax],
    deposits: &[DepositWithdrawal],
    rates: Option<&dyn RateProvider>,
    default_rate: f64,
) -> TaxSummaryReport {
    let mut report = TaxSummaryReport::default();

    if !trades.is_empty() {
        report.trade = Some(summarize_trades(trades, rates, default_rate));
    }
    if !dividends.is_empty() {
        report.dividend = Some(summarize_dividends(dividends, rates, default_rate));
    }
    if !taxes.is_empty() {
        report.tax = Some(summarize_taxes(taxes, rates, default_rate));
    }

    if let (Some(trade), Some(dividend)) = (&report.trade, &report.dividend) {
        let taxable_income_cny = trade.net_pnl_cny + dividend.total_amount_cny;
        let tax_due_cny = taxable_income_cny * CHINA_INVESTMENT_TAX_RATE;
        // The foreign credit is capped at what China would levy on the
        // dividend income alone, not on total taxable income.
        let foreign_tax_credit_cny = report
            .tax
            .as_ref()
            .map(|tax| {
                tax.total_withholding_tax_cny
                    .min(dividend.total_amount_cny * CHINA_INVESTMENT_TAX_RATE)
            })
            .unwrap_or(0.0);
        report.china_tax = Some(ChinaTaxCalculation {
            taxable_income_cny: round2(taxable_income_cny),
            tax_due_cny: round2(tax_due_cny),
            foreign_tax_credit_cny: round2(foreign_tax_credit_cny),
            tax_payable_cny: round2(tax_due_cny - foreign_tax_credit_cny),
        });
    } else {
        debug!("Skipping China tax calculation: trade or dividend data missing");
    }

    if !deposits.is_empty() {
        report.account = Some(summarize_deposits(deposits));
    }

    report
}

fn summarize_trades(
    trades: &[ClosedLot],
    rates: Option<&dyn RateProvider>,
    default_rate: f64,
) -> TradeSummary {
    let usd: Vec<&ClosedLot> = trades.iter().filter(|t| t.currency == "USD").collect();

    let mut pnl_cny = 0.0;
    let mut commission_cny = 0.0;
    let mut rate_sum = 0.0;
    for trade in &usd {
        let rate = resolve_rate(rates, &trade.date, default_rate);
        pnl_cny += trade.realized_pnl * rate;
        commission_cny += trade.commission * rate;
        rate_sum += rate;
    }

    let pnl_usd: f64 = usd.iter().map(|t| t.realized_pnl).sum();
    let commission_usd: f64 = usd.iter().map(|t| t.commission).sum();
    let average_rate = if usd.is_empty() {
        default_rate
    } else {
        rate_sum / usd.len() as f64
    };

    TradeSummary {
        total_trades: trades.len(),
        usd_trades: usd.len(),
        realized_pnl_usd: round2(pnl_usd),
        realized_pnl_cny: round2(pnl_cny),
        total_commission_usd: round2(commission_usd),
        total_commission_cny: round2(commission_cny),
        net_pnl_usd: round2(pnl_usd - commission_usd),
        net_pnl_cny: round2(pnl_cny - commission_cny),
        average_exchange_rate: round4(average_rate),
    }
}

fn summarize_dividends(
    dividends: &[Dividend],
    rates: Option<&dyn RateProvider>,
    default_rate: f64,
) -> DividendSummary {
    let usd: Vec<&Dividend> = dividends.iter().filter(|d| d.currency == "USD").collect();

    let mut amount_cny = 0.0;
    let mut rate_sum = 0.0;
    for dividend in &usd {
        let rate = resolve_rate(rates, &dividend.date, default_rate);
        amount_cny += dividend.amount * rate;
        rate_sum += rate;
    }

    let amount_usd: f64 = usd.iter().map(|d| d.amount).sum();
    let average_rate = if usd.is_empty() {
        default_rate
    } else {
        rate_sum / usd.len() as f64
    };

    DividendSummary {
        total_dividends: dividends.len(),
        total_amount_usd: round2(amount_usd),
        total_amount_cny: round2(amount_cny),
        average_exchange_rate: round4(average_rate),
    }
}

fn summarize_taxes(
    taxes: &[WithholdingTax],
    rates: Option<&dyn RateProvider>,
    default_rate: f64,
) -> TaxSummary {
    let usd: Vec<&WithholdingTax> = taxes.iter().filter(|t| t.currency == "USD").collect();

    let mut amount_cny = 0.0;
    let mut rate_sum = 0.0;
    for tax in &usd {
        let rate = resolve_rate(rates, &tax.date, default_rate);
        amount_cny += tax.amount * rate;
        rate_sum += rate;
    }

    let amount_usd: f64 = usd.iter().map(|t| t.amount).sum();
    let average_rate = if usd.is_empty() {
        default_rate
    } else {
        rate_sum / usd.len() as f64
    };

    TaxSummary {
        total_withholding_tax_usd: round2(amount_usd),
        total_withholding_tax_cny: round2(amount_cny),
        average_exchange_rate: round4(average_rate),
    }
}

fn summarize_deposits(deposits: &[DepositWithdrawal]) -> AccountSummary {
    let (deposit_rows, withdrawal_rows): (Vec<&DepositWithdrawal>, Vec<&DepositWithdrawal>) =
        deposits
            .iter()
            .partition(|d| d.transaction_type == TransactionType::Deposit);

    let total_deposits: f64 = deposit_rows.iter().map(|d| d.amount_base).sum();
    let total_withdrawals: f64 = withdrawal_rows
        .iter()
        .map(|d| d.amount_base)
        .sum::<f64>()
        .abs();

    AccountSummary {
        total_deposits_count: deposit_rows.len(),
        total_withdrawals_count: withdrawal_rows.len(),
        total_deposits_base: round2(total_deposits),
        total_withdrawals_base: round2(total_withdrawals),
        net_deposits_base: round2(total_deposits - total_withdrawals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::FixedRateProvider;
    use serde_json::json;

    fn lot(date: &str, pnl: f64, currency: &str) -> ClosedLot {
        ClosedLot {
            date: date.to_string(),
            time: String::new(),
            symbol: "AAPL".to_string(),
            description: String::new(),
            quantity: 10.0,
            price: 0.0,
            proceeds: 0.0,
            cost: -1000.0,
            commission: 0.0,
            realized_pnl: pnl,
            buy_sell: "SELL".to_string(),
            currency: currency.to_string(),
            asset_category: "STK".to_string(),
            open_date_time: String::new(),
            account: None,
        }
    }

    fn dividend(date: &str, amount: f64, currency: &str) -> Dividend {
        Dividend {
            date: date.to_string(),
            symbol: "AAPL".to_string(),
            description: "DIV".to_string(),
            amount,
            currency: currency.to_string(),
            txn_type: "Dividends".to_string(),
            account: None,
        }
    }

    fn tax(date: &str, amount: f64) -> WithholdingTax {
        WithholdingTax {
            date: date.to_string(),
            symbol: "AAPL".to_string(),
            description: "US TAX".to_string(),
            amount,
            currency: "USD".to_string(),
            txn_type: "WHTAX".to_string(),
            account: None,
        }
    }

    fn deposit(amount_base: f64) -> DepositWithdrawal {
        DepositWithdrawal {
            date: "20250110".to_string(),
            time: String::new(),
            description: "WIRE".to_string(),
            amount: amount_base,
            currency: "USD".to_string(),
            fx_rate_to_base: 1.0,
            amount_base,
            transaction_type: if amount_base > 0.0 {
                TransactionType::Deposit
            } else {
                TransactionType::Withdrawal
            },
            account: None,
        }
    }

    #[test]
    fn test_empty_inputs_produce_empty_report() {
        let report = calculate_summary(&[], &[], &[], &[], None, 7.2);
        assert!(report.is_empty());
        assert_eq!(serde_json::to_value(&report).unwrap(), json!({}));
    }

    #[test]
    fn test_single_trade_static_rate() {
        let trades = vec![lot("20250115", 100.0, "USD")];
        let report = calculate_summary(&trades, &[], &[], &[], None, 7.0);
        let trade = report.trade.unwrap();
        assert_eq!(trade.total_trades, 1);
        assert_eq!(trade.usd_trades, 1);
        assert_eq!(trade.realized_pnl_usd, 100.0);
        assert_eq!(trade.realized_pnl_cny, 700.0);
        assert_eq!(trade.net_pnl_cny, 700.0);
        assert_eq!(trade.average_exchange_rate, 7.0);
        assert!(report.dividend.is_none());
        assert!(report.china_tax.is_none());
    }

    #[test]
    fn test_non_usd_rows_excluded_not_converted() {
        let trades = vec![lot("20250115", 100.0, "USD"), lot("20250116", 500.0, "HKD")];
        let report = calculate_summary(&trades, &[], &[], &[], None, 7.0);
        let trade = report.trade.unwrap();
        assert_eq!(trade.total_trades, 2);
        assert_eq!(trade.usd_trades, 1);
        assert_eq!(trade.realized_pnl_usd, 100.0);
    }

    #[test]
    fn test_dividend_count_covers_all_currencies() {
        // The count spans the whole table, like Total_Trades; only the
        // amounts are USD-restricted.
        let dividends = vec![
            dividend("20250301", 25.50, "USD"),
            dividend("20250302", 40.0, "HKD"),
        ];
        let report = calculate_summary(&[], &dividends, &[], &[], None, 7.2);
        let dividend = report.dividend.unwrap();
        assert_eq!(dividend.total_dividends, 2);
        assert_eq!(dividend.total_amount_usd, 25.5);
        assert_eq!(dividend.total_amount_cny, 183.6);
    }

    #[test]
    fn test_dividend_and_tax_summary_at_default_rate() {
        let dividends = vec![dividend("20250301", 25.50, "USD")];
        let taxes = vec![tax("20250301", 3.75)];
        let report = calculate_summary(&[], &dividends, &taxes, &[], None, 7.2);

        let dividend = report.dividend.unwrap();
        assert_eq!(dividend.total_amount_usd, 25.5);
        assert_eq!(dividend.total_amount_cny, 183.6);

        let tax = report.tax.unwrap();
        assert_eq!(tax.total_withholding_tax_cny, 27.0);

        // No trades, so no China tax section even with dividends present.
        assert!(report.china_tax.is_none());
    }

    #[test]
    fn test_china_tax_calculation_with_credit() {
        let trades = vec![lot("20250115", 100.0, "USD")];
        let dividends = vec![dividend("20250301", 25.50, "USD")];
        let taxes = vec![tax("20250301", 3.75)];
        let report = calculate_summary(&trades, &dividends, &taxes, &[], None, 7.2);

        let china = report.china_tax.unwrap();
        // 100 * 7.2 + 25.5 * 7.2 = 903.6
        assert_eq!(china.taxable_income_cny, 903.6);
        assert_eq!(china.tax_due_cny, 180.72);
        // Withholding 27.0 CNY < 20% of dividend CNY (36.72).
        assert_eq!(china.foreign_tax_credit_cny, 27.0);
        assert_eq!(china.tax_payable_cny, 153.72);
    }

    #[test]
    fn test_foreign_tax_credit_capped_at_dividend_levy() {
        let trades = vec![lot("20250115", 0.0, "USD")];
        let dividends = vec![dividend("20250301", 100.0, "USD")];
        // Withholding far above the Chinese levy on the dividend.
        let taxes = vec![tax("20250301", 50.0)];
        let report = calculate_summary(&trades, &dividends, &taxes, &[], None, 7.0);

        let china = report.china_tax.unwrap();
        // Cap: 0.2 * 700 = 140 CNY, not the 350 CNY withheld.
        assert_eq!(china.foreign_tax_credit_cny, 140.0);
    }

    #[test]
    fn test_china_tax_without_withholding_has_zero_credit() {
        let trades = vec![lot("20250115", 100.0, "USD")];
        let dividends = vec![dividend("20250301", 25.50, "USD")];
        let report = calculate_summary(&trades, &dividends, &[], &[], None, 7.2);

        let china = report.china_tax.unwrap();
        assert_eq!(china.foreign_tax_credit_cny, 0.0);
        assert_eq!(china.tax_payable_cny, china.tax_due_cny);
    }

    #[test]
    fn test_negative_net_pnl_yields_negative_tax_due() {
        let trades = vec![lot("20250115", -500.0, "USD")];
        let dividends = vec![dividend("20250301", 25.50, "USD")];
        let report = calculate_summary(&trades, &dividends, &[], &[], None, 7.2);

        let china = report.china_tax.unwrap();
        assert!(china.taxable_income_cny < 0.0);
        assert!(china.tax_due_cny < 0.0);
    }

    #[test]
    fn test_account_summary() {
        let deposits = vec![deposit(1000.0), deposit(2000.0), deposit(-500.0)];
        let report = calculate_summary(&[], &[], &[], &deposits, None, 7.2);

        let account = report.account.unwrap();
        assert_eq!(account.total_deposits_count, 2);
        assert_eq!(account.total_withdrawals_count, 1);
        assert_eq!(account.total_deposits_base, 3000.0);
        assert_eq!(account.total_withdrawals_base, 500.0);
        assert_eq!(account.net_deposits_base, 2500.0);
    }

    #[test]
    fn test_dynamic_rates_average_per_row() {
        struct PerDateRates;
        impl crate::fx::RateProvider for PerDateRates {
            fn get_rate(&self, date: &str, _fallback: f64) -> f64 {
                if date == "20250115" {
                    7.0
                } else {
                    7.4
                }
            }
        }

        let trades = vec![lot("20250115", 100.0, "USD"), lot("20250220", 100.0, "USD")];
        let report = calculate_summary(&trades, &[], &[], &[], Some(&PerDateRates), 7.2);
        let trade = report.trade.unwrap();
        assert_eq!(trade.realized_pnl_cny, 1440.0);
        assert_eq!(trade.average_exchange_rate, 7.2);
    }

    #[test]
    fn test_fixed_provider_matches_static_path() {
        let trades = vec![lot("20250115", 100.0, "USD")];
        let dynamic = calculate_summary(&trades, &[], &[], &[], Some(&FixedRateProvider(7.2)), 7.2);
        let static_path = calculate_summary(&trades, &[], &[], &[], None, 7.2);
        assert_eq!(dynamic, static_path);
    }

    #[test]
    fn test_serialized_section_keys() {
        let trades = vec![lot("20250115", 100.0, "USD")];
        let dividends = vec![dividend("20250301", 25.50, "USD")];
        let report = calculate_summary(&trades, &dividends, &[], &[], None, 7.2);
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("Trade_Summary").is_some());
        assert!(value.get("Dividend_Summary").is_some());
        assert!(value.get("China_Tax_Calculation").is_some());
        assert!(value.get("Tax_Summary").is_none());
        assert!(value.get("Account_Summary").is_none());
    }
}
