// csv and json views of a loan run
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::decimal::Money;
use crate::ledger::Transaction;
use crate::summary::MonthlySummaryRow;
use crate::types::ScheduleId;

pub const TRANSACTIONS_FILE: &str = "loan_transactions.csv";
pub const SUMMARY_FILE: &str = "loan_schedule_summary.csv";

/// one ledger row as written to csv
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Transaction Type")]
    pub transaction_type: String,
    #[serde(rename = "Transaction Amount")]
    pub amount: Money,
    #[serde(rename = "Loan Balance")]
    pub loan_balance: Money,
    #[serde(rename = "Offset Balance")]
    pub offset_balance: Money,
}

impl From<&Transaction> for TransactionRecord {
    fn from(t: &Transaction) -> Self {
        TransactionRecord {
            date: t.date.format("%Y-%m-%d").to_string(),
            transaction_type: t.transaction_type.to_string(),
            amount: t.amount.round_dp(2),
            loan_balance: t.loan_balance.round_dp(2),
            offset_balance: t.offset_balance.round_dp(2),
        }
    }
}

/// one monthly summary row as written to csv
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(rename = "MONTH")]
    pub month: String,
    #[serde(rename = "Total Repayment")]
    pub total_repayment: Money,
    #[serde(rename = "Total Interest Charged")]
    pub total_interest: Money,
    #[serde(rename = "Loan Balance (First Day of Month)")]
    pub loan_balance_first_day: Money,
    #[serde(rename = "Offset Balance (Last Day of Month)")]
    pub offset_balance_last_day: Money,
}

impl From<&MonthlySummaryRow> for SummaryRecord {
    fn from(row: &MonthlySummaryRow) -> Self {
        SummaryRecord {
            month: row.month.to_string(),
            total_repayment: row.total_repayment.round_dp(2),
            total_interest: row.total_interest.round_dp(2),
            loan_balance_first_day: row.loan_balance_first_day.round_dp(2),
            offset_balance_last_day: row.offset_balance_last_day.round_dp(2),
        }
    }
}

fn write_records<T: Serialize>(path: &Path, records: impl IntoIterator<Item = T>) -> crate::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// write the ledger to `path`, one row per transaction
pub fn write_ledger_csv(path: impl AsRef<Path>, transactions: &[Transaction]) -> crate::Result<()> {
    write_records(path.as_ref(), transactions.iter().map(TransactionRecord::from))
}

/// write the monthly summary to `path`
pub fn write_summary_csv(path: impl AsRef<Path>, rows: &[MonthlySummaryRow]) -> crate::Result<()> {
    write_records(path.as_ref(), rows.iter().map(SummaryRecord::from))
}

/// write both tables into `dir`, creating it when missing
pub fn store_tables(
    dir: impl AsRef<Path>,
    transactions: &[Transaction],
    rows: &[MonthlySummaryRow],
) -> crate::Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let ledger_path = dir.join(TRANSACTIONS_FILE);
    let summary_path = dir.join(SUMMARY_FILE);
    write_ledger_csv(&ledger_path, transactions)?;
    write_summary_csv(&summary_path, rows)?;

    Ok((ledger_path, summary_path))
}

/// serializable view of a finished run
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanSummaryView {
    pub schedule_id: ScheduleId,
    pub totals: TotalsView,
    pub payoff_date: Option<String>,
    pub transaction_count: usize,
    pub monthly_summary: Vec<SummaryRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalsView {
    pub total_interest_charged: Money,
    pub total_repayments: Money,
}

impl LoanSummaryView {
    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
