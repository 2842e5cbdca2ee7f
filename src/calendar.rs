use chrono::{Duration, Months, NaiveDate};
use std::collections::BTreeSet;

use crate::errors::{LoanError, Result};
use crate::types::{Frequency, LoanTerm};

/// the `k`-th date after `start` at the given frequency
///
/// Month based steps count from `start` itself, so a loan settled on the 31st
/// falls on the last day of short months and returns to the 31st afterwards.
fn nth_date(start: NaiveDate, frequency: Frequency, k: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => start.checked_add_signed(Duration::days(i64::from(k))),
        Frequency::Weekly => start.checked_add_signed(Duration::days(7 * i64::from(k))),
        Frequency::Fortnightly => start.checked_add_signed(Duration::days(14 * i64::from(k))),
        Frequency::Monthly => start.checked_add_months(Months::new(k)),
        Frequency::Quarterly => start.checked_add_months(Months::new(k.checked_mul(3)?)),
        Frequency::Annually => start.checked_add_months(Months::new(k.checked_mul(12)?)),
    }
}

/// every date from `start` to `end` inclusive, stepping at `frequency`
pub fn dates_between(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut k = 0;

    while let Some(date) = nth_date(start, frequency, k) {
        if date > end {
            break;
        }
        dates.push(date);
        k += 1;
    }

    dates
}

/// same as [`dates_between`] for a frequency given as text
pub fn dates_between_str(start: NaiveDate, end: NaiveDate, frequency: &str) -> Result<Vec<NaiveDate>> {
    let frequency = frequency.parse::<Frequency>()?;
    Ok(dates_between(start, end, frequency))
}

/// last day of the loan term
pub fn maturity_date(start: NaiveDate, term: LoanTerm) -> Result<NaiveDate> {
    start
        .checked_add_months(Months::new(term.total_months()))
        .ok_or_else(|| LoanError::InvalidDate {
            message: format!("maturity of a {} month loan from {} is out of range", term.total_months(), start),
        })
}

/// dates on which an event fires, excluding the settlement date itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl EventCalendar {
    /// events start strictly after settlement
    pub fn after_settlement(settlement: NaiveDate, end: NaiveDate, frequency: Frequency) -> Self {
        let dates = dates_between(settlement, end, frequency)
            .into_iter()
            .skip(1)
            .collect();
        Self { dates }
    }

    /// calendar with no dates, for disabled features
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}
