use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::LoanError;

/// unique identifier for one schedule run
pub type ScheduleId = Uuid;

/// how often a recurring event happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Fortnightly,
    Monthly,
    Quarterly,
    #[serde(alias = "annual")]
    Annually,
}

impl Frequency {
    /// number of repayments in a year, `None` for frequencies repayments cannot use
    pub fn payments_per_year(&self) -> Option<u32> {
        match self {
            Frequency::Daily => None,
            Frequency::Weekly => Some(52),
            Frequency::Fortnightly => Some(26),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::Annually => Some(1),
        }
    }

    /// parse a repayment frequency, reporting failures as repayment errors
    pub fn parse_repayment(s: &str) -> Result<Self, LoanError> {
        let frequency = s.parse::<Frequency>().map_err(|_| LoanError::InvalidRepaymentFrequency {
            value: s.to_string(),
        })?;

        match frequency.payments_per_year() {
            Some(_) => Ok(frequency),
            None => Err(LoanError::InvalidRepaymentFrequency {
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Frequency {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "fortnightly" => Ok(Frequency::Fortnightly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "annually" | "annual" => Ok(Frequency::Annually),
            other => Err(LoanError::InvalidFrequency {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Fortnightly => "fortnightly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annually => "annually",
        };
        f.write_str(name)
    }
}

/// loan duration in whole years plus additional months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerm {
    pub years: u32,
    pub months: u32,
}

impl LoanTerm {
    pub fn new(years: u32, months: u32) -> Self {
        Self { years, months }
    }

    /// term whose length in months fits in a `u32`
    pub fn try_new(years: u32, months: u32) -> Result<Self, LoanError> {
        let term = Self { years, months };
        term.checked_total_months().ok_or_else(|| LoanError::InvalidConfiguration {
            message: format!("loan term of {} years and {} months is out of range", years, months),
        })?;
        Ok(term)
    }

    pub fn checked_total_months(&self) -> Option<u32> {
        self.years.checked_mul(12)?.checked_add(self.months)
    }

    /// length in months, saturating for terms [`LoanTerm::try_new`] rejects
    pub fn total_months(&self) -> u32 {
        self.checked_total_months().unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.total_months() == 0
    }

    /// number of periods in the term when a year has `per_year` of them
    pub fn periods(&self, per_year: u32) -> Decimal {
        Decimal::from(per_year) * Decimal::from(self.total_months()) / Decimal::from(12)
    }
}

/// kind of ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Settlement,
    Interest,
    OffsetContribution,
    Repayment,
    ExtraRepayment,
}

impl TransactionType {
    /// repayments reduce the loan balance and count towards total repayments
    pub fn is_repayment(&self) -> bool {
        matches!(self, TransactionType::Repayment | TransactionType::ExtraRepayment)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Settlement => "Settlement",
            TransactionType::Interest => "Interest",
            TransactionType::OffsetContribution => "Offset Contribution",
            TransactionType::Repayment => "Repayment",
            TransactionType::ExtraRepayment => "Extra Repayment",
        };
        f.write_str(label)
    }
}
