use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::decimal::Money;
use crate::ledger::Transaction;
use crate::types::TransactionType;

/// calendar month a ledger row falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummaryRow {
    pub month: YearMonth,
    /// regular plus extra repayments
    pub total_repayment: Money,
    pub total_interest: Money,
    /// loan balance on the first row of the month
    pub loan_balance_first_day: Money,
    /// offset balance on the last row of the month
    pub offset_balance_last_day: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoanTotals {
    pub total_interest_charged: Money,
    pub total_repayments: Money,
}

/// group ledger rows by calendar month
pub fn summarize(transactions: &[Transaction]) -> (Vec<MonthlySummaryRow>, LoanTotals) {
    let mut months: BTreeMap<YearMonth, MonthlySummaryRow> = BTreeMap::new();

    for t in transactions {
        let row = months
            .entry(YearMonth::of(t.date))
            .or_insert_with(|| MonthlySummaryRow {
                month: YearMonth::of(t.date),
                total_repayment: Money::ZERO,
                total_interest: Money::ZERO,
                loan_balance_first_day: t.loan_balance,
                offset_balance_last_day: t.offset_balance,
            });

        match t.transaction_type {
            TransactionType::Interest => row.total_interest += t.amount,
            tt if tt.is_repayment() => row.total_repayment += t.amount,
            _ => {}
        }
        row.offset_balance_last_day = t.offset_balance;
    }

    let rows: Vec<MonthlySummaryRow> = months.into_values().collect();
    let totals = LoanTotals {
        total_interest_charged: rows.iter().map(|r| r.total_interest).sum(),
        total_repayments: rows.iter().map(|r| r.total_repayment).sum(),
    };

    (rows, totals)
}
