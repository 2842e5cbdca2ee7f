pub mod accrual;

use chrono::NaiveDate;

use crate::decimal::{Money, Rate};

pub use accrual::AccrualEngine;

/// interest capitalization event
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalizationResult {
    pub amount_capitalized: Money,
    pub new_balance: Money,
    pub date: NaiveDate,
}

/// interest for one day on `interest_bearing`, never negative
pub fn daily_interest(interest_bearing: Money, annual_rate: Rate) -> Money {
    interest_bearing.daily_interest(annual_rate).max(Money::ZERO)
}

/// capitalize accrued interest into the loan balance
pub fn capitalize_interest(
    loan_balance: Money,
    accrued_interest: Money,
    date: NaiveDate,
) -> CapitalizationResult {
    CapitalizationResult {
        amount_capitalized: accrued_interest,
        new_balance: loan_balance + accrued_interest,
        date,
    }
}
