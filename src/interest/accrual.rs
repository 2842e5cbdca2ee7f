use chrono::NaiveDate;

use crate::decimal::{Money, Rate};
use crate::interest::{capitalize_interest, daily_interest, CapitalizationResult};

/// interest accrued daily and held until the next charge date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccrualEngine {
    annual_rate: Rate,
    accrued: Money,
}

impl AccrualEngine {
    pub fn new(annual_rate: Rate) -> Self {
        Self {
            annual_rate,
            accrued: Money::ZERO,
        }
    }

    /// interest accrued since the last capitalization
    pub fn accrued(&self) -> Money {
        self.accrued
    }

    /// accrue one day of interest on the loan net of the offset balance
    pub fn accrue_day(&mut self, loan_balance: Money, offset_balance: Money) -> Money {
        let interest_bearing = (loan_balance - offset_balance).max(Money::ZERO);
        let interest = daily_interest(interest_bearing, self.annual_rate);
        self.accrued += interest;
        interest
    }

    /// move the accrued interest onto the loan and start a new period
    pub fn capitalize(&mut self, loan_balance: Money, date: NaiveDate) -> CapitalizationResult {
        let result = capitalize_interest(loan_balance, self.accrued, date);
        self.accrued = Money::ZERO;
        result
    }
}
