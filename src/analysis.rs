use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::{validate_loan_config, LoanParameters};
use crate::decimal::Money;
use crate::errors::Result;
use crate::ledger::Transaction;
use crate::report::{store_tables, LoanSummaryView, SummaryRecord, TotalsView};
use crate::schedule::generate_schedule;
use crate::summary::{summarize, MonthlySummaryRow};
use crate::types::ScheduleId;

/// whether and where to persist the generated tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOptions {
    pub store_results: bool,
    pub output_dir: PathBuf,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            store_results: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl SummaryOptions {
    /// store both tables into `dir`
    pub fn store_in(dir: impl Into<PathBuf>) -> Self {
        Self {
            store_results: true,
            output_dir: dir.into(),
        }
    }
}

/// result of one loan run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub schedule_id: ScheduleId,
    pub transactions: Vec<Transaction>,
    pub monthly_summary: Vec<MonthlySummaryRow>,
    pub total_interest_charged: Money,
    pub total_repayments: Money,
}

impl LoanSummary {
    /// date of the last ledger row
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        self.transactions.last().map(|t| t.date)
    }

    /// write `loan_transactions.csv` and `loan_schedule_summary.csv` into `dir`
    pub fn store(&self, dir: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
        let paths = store_tables(dir.as_ref(), &self.transactions, &self.monthly_summary)?;
        log::info!(
            "schedule {} stored to {} and {}",
            self.schedule_id,
            paths.0.display(),
            paths.1.display()
        );
        Ok(paths)
    }

    pub fn view(&self) -> LoanSummaryView {
        LoanSummaryView {
            schedule_id: self.schedule_id,
            totals: TotalsView {
                total_interest_charged: self.total_interest_charged.round_dp(2),
                total_repayments: self.total_repayments.round_dp(2),
            },
            payoff_date: self.payoff_date().map(|d| d.format("%Y-%m-%d").to_string()),
            transaction_count: self.transactions.len(),
            monthly_summary: self.monthly_summary.iter().map(SummaryRecord::from).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(self.view().to_json_pretty()?)
    }
}

/// run the schedule and monthly aggregation for typed parameters
pub fn prepare_loan_summary(params: &LoanParameters) -> Result<LoanSummary> {
    let schedule_id = Uuid::new_v4();
    log::debug!(
        "schedule {} starting for {} settled {}",
        schedule_id,
        params.principal,
        params.settlement_date
    );

    let transactions = generate_schedule(params)?.into_transactions();
    let (monthly_summary, totals) = summarize(&transactions);

    Ok(LoanSummary {
        schedule_id,
        transactions,
        monthly_summary,
        total_interest_charged: totals.total_interest_charged,
        total_repayments: totals.total_repayments,
    })
}

/// validate a raw parameter record, run it, and optionally persist the tables
pub fn prepare_loan_summary_from_json(value: &Value, options: &SummaryOptions) -> Result<LoanSummary> {
    let params = validate_loan_config(value)?.into_parameters()?;
    let summary = prepare_loan_summary(&params)?;

    if options.store_results {
        summary.store(&options.output_dir)?;
    }

    Ok(summary)
}

/// outcome of one scenario measured against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub label: String,
    pub total_interest_charged: Money,
    pub total_repayments: Money,
    pub payoff_date: Option<NaiveDate>,
    /// baseline interest minus this scenario's interest
    pub interest_saved: Money,
}

impl ScenarioOutcome {
    fn measure(label: &str, summary: &LoanSummary, baseline_interest: Money) -> Self {
        Self {
            label: label.to_string(),
            total_interest_charged: summary.total_interest_charged,
            total_repayments: summary.total_repayments,
            payoff_date: summary.payoff_date(),
            interest_saved: baseline_interest - summary.total_interest_charged,
        }
    }
}

/// run the baseline and every labelled scenario
///
/// The first outcome is the baseline itself, labelled `"baseline"`, with zero
/// interest saved.
pub fn compare_scenarios(
    baseline: &LoanParameters,
    scenarios: &[(&str, LoanParameters)],
) -> Result<Vec<ScenarioOutcome>> {
    let base = prepare_loan_summary(baseline)?;
    let baseline_interest = base.total_interest_charged;

    let mut outcomes = Vec::with_capacity(scenarios.len() + 1);
    outcomes.push(ScenarioOutcome::measure("baseline", &base, baseline_interest));

    for (label, params) in scenarios {
        let summary = prepare_loan_summary(params)?;
        log::info!(
            "scenario {} charges {} interest, saving {}",
            label,
            summary.total_interest_charged.round_dp(2),
            (baseline_interest - summary.total_interest_charged).round_dp(2)
        );
        outcomes.push(ScenarioOutcome::measure(label, &summary, baseline_interest));
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::errors::LoanError;
    use crate::types::{Frequency, TransactionType};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::fs;

    fn base_json() -> Value {
        json!({
            "start_date": "2025-10-05",
            "loan_amount": 650000,
            "annual_rate": 5.34,
            "loan_duration_years": 30,
            "loan_duration_months": 0,
            "repayment_frequency": "fortnightly",
            "initial_offset_amount": 0,
            "offset_contribution_frequency": "monthly",
            "offset_contribution_regular_amount": 0,
            "extra_repayments_frequency": "annually",
            "extra_repayments_regular_amount": 0,
            "capture_interest_accrual": false
        })
    }

    fn base_params() -> LoanParameters {
        LoanParameters::builder()
            .settlement_date(NaiveDate::from_ymd_opt(2025, 10, 5).unwrap())
            .amount(Money::from_major(650_000))
            .rate(Rate::from_percentage(dec!(5.34)))
            .term(30, 0)
            .repayment_frequency(Frequency::Fortnightly)
            .build()
            .unwrap()
    }

    fn close_to(actual: Money, expected: &str) -> bool {
        (actual - Money::from_str_exact(expected).unwrap()).abs() <= Money::CENT
    }

    #[test]
    fn test_summary_from_json() {
        let summary = prepare_loan_summary_from_json(&base_json(), &SummaryOptions::default()).unwrap();

        assert!(close_to(summary.total_interest_charged, "647093.34"));
        assert_eq!(summary.transactions[0].transaction_type, TransactionType::Settlement);
        assert_eq!(summary.transactions.last().unwrap().loan_balance, Money::ZERO);
        // repayments clear the principal plus every interest charge
        assert!(close_to(
            summary.total_repayments,
            &(Money::from_major(650_000) + summary.total_interest_charged).to_string()
        ));
    }

    #[test]
    fn test_monthly_totals_match_summary() {
        let summary = prepare_loan_summary(&base_params()).unwrap();

        let interest: Money = summary.monthly_summary.iter().map(|r| r.total_interest).sum();
        let repaid: Money = summary.monthly_summary.iter().map(|r| r.total_repayment).sum();
        assert_eq!(interest, summary.total_interest_charged);
        assert_eq!(repaid, summary.total_repayments);
        assert_eq!(summary.monthly_summary[0].month.to_string(), "2025-10");
    }

    #[test]
    fn test_invalid_repayment_frequency() {
        let mut value = base_json();
        value["repayment_frequency"] = json!("invalid_frequency");

        let err = prepare_loan_summary_from_json(&value, &SummaryOptions::default()).unwrap_err();
        assert!(matches!(err, LoanError::InvalidRepaymentFrequency { .. }));
        assert!(err.to_string().contains("Invalid repayment frequency"));
    }

    #[test]
    fn test_store_results() {
        let dir = std::env::temp_dir().join(Uuid::new_v4().to_string());
        let mut value = base_json();
        value["loan_amount"] = json!(100000);
        value["loan_duration_years"] = json!(1);

        let summary = prepare_loan_summary_from_json(&value, &SummaryOptions::store_in(&dir)).unwrap();

        let ledger = fs::read_to_string(dir.join("loan_transactions.csv")).unwrap();
        assert_eq!(ledger.lines().count(), summary.transactions.len() + 1);
        let monthly = fs::read_to_string(dir.join("loan_schedule_summary.csv")).unwrap();
        assert_eq!(monthly.lines().count(), summary.monthly_summary.len() + 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_store_does_not_change_results() {
        let dir = std::env::temp_dir().join(Uuid::new_v4().to_string());
        let mut value = base_json();
        value["loan_duration_years"] = json!(2);

        let stored = prepare_loan_summary_from_json(&value, &SummaryOptions::store_in(&dir)).unwrap();
        let plain = prepare_loan_summary_from_json(&value, &SummaryOptions::default()).unwrap();

        assert_eq!(stored.transactions, plain.transactions);
        assert_eq!(stored.total_interest_charged, plain.total_interest_charged);
        assert_ne!(stored.schedule_id, plain.schedule_id);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_view() {
        let mut value = base_json();
        value["loan_duration_years"] = json!(1);
        let summary = prepare_loan_summary_from_json(&value, &SummaryOptions::default()).unwrap();

        let json = summary.to_json_pretty().unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["schedule_id"], json!(summary.schedule_id.to_string()));
        assert_eq!(parsed["transaction_count"], json!(summary.transactions.len()));
        assert_eq!(parsed["monthly_summary"][0]["MONTH"], json!("2025-10"));
    }

    #[test]
    fn test_compare_scenarios() {
        let baseline = base_params();

        let mut offset_only = baseline.clone();
        offset_only.initial_offset = Money::from_major(20_000);
        offset_only.offset_contribution = Money::from_major(500);

        let mut extra_only = baseline.clone();
        extra_only.extra_repayment = Money::from_major(5_000);

        let mut both = offset_only.clone();
        both.extra_repayment = Money::from_major(5_000);

        let outcomes = compare_scenarios(
            &baseline,
            &[("offset", offset_only), ("extra", extra_only), ("both", both)],
        )
        .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0].label, "baseline");
        assert_eq!(outcomes[0].interest_saved, Money::ZERO);
        assert!(close_to(outcomes[1].total_interest_charged, "423561.75"));
        assert!(close_to(outcomes[2].total_interest_charged, "495545.42"));
        assert!(close_to(outcomes[3].total_interest_charged, "353294.29"));
        assert!(close_to(outcomes[3].interest_saved, "293799.04"));
        assert!(outcomes[3].payoff_date < outcomes[0].payoff_date);
    }
}
