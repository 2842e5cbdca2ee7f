use chrono::NaiveDate;

use crate::calendar::{dates_between, EventCalendar};
use crate::config::LoanParameters;
use crate::decimal::Money;
use crate::errors::Result;
use crate::interest::AccrualEngine;
use crate::ledger::{Ledger, Transaction};
use crate::payments::minimum_repayment;
use crate::types::{Frequency, TransactionType};

/// balances at or below this count as repaid
pub const PAYOFF_TOLERANCE: Money = Money::CENT;

/// every date the engine needs for one loan
#[derive(Debug, Clone)]
pub struct ScheduleCalendars {
    pub days: Vec<NaiveDate>,
    pub interest_charges: EventCalendar,
    pub repayments: EventCalendar,
    pub offset_contributions: EventCalendar,
    pub extra_repayments: EventCalendar,
}

impl ScheduleCalendars {
    pub fn for_loan(params: &LoanParameters) -> Result<Self> {
        let settlement = params.settlement_date;
        let maturity = params.maturity_date()?;

        let extra_repayments = if params.has_extra_repayments() {
            EventCalendar::after_settlement(settlement, maturity, params.extra_repayment_frequency)
        } else {
            EventCalendar::empty()
        };

        Ok(Self {
            days: dates_between(settlement, maturity, Frequency::Daily)
                .into_iter()
                .skip(1)
                .collect(),
            // interest is charged on the settlement day of each month
            interest_charges: EventCalendar::after_settlement(settlement, maturity, Frequency::Monthly),
            repayments: EventCalendar::after_settlement(settlement, maturity, params.repayment_frequency),
            offset_contributions: EventCalendar::after_settlement(
                settlement,
                maturity,
                params.offset_contribution_frequency,
            ),
            extra_repayments,
        })
    }
}

/// balances carried from one day to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub loan_balance: Money,
    pub offset_balance: Money,
    pub accrual: AccrualEngine,
}

impl ScheduleState {
    fn is_repaid(&self) -> bool {
        self.loan_balance <= PAYOFF_TOLERANCE
    }
}

/// clamp balances within the payoff tolerance to exactly zero
fn settle_dust(balance: Money) -> Money {
    if balance <= PAYOFF_TOLERANCE {
        Money::ZERO
    } else {
        balance
    }
}

/// simulates one loan from settlement to payoff
///
/// Each day runs in a fixed order: accrue on the balance left by the previous
/// day, capitalize on the monthly charge date, add the offset contribution,
/// take the regular repayment, then the extra repayment. The run stops once
/// the loan balance is at or below [`PAYOFF_TOLERANCE`].
pub struct ScheduleEngine<'a> {
    params: &'a LoanParameters,
    minimum_payment: Money,
    calendars: ScheduleCalendars,
}

impl<'a> ScheduleEngine<'a> {
    pub fn new(params: &'a LoanParameters) -> Result<Self> {
        let minimum_payment = minimum_repayment(
            params.principal,
            params.annual_rate,
            params.term,
            params.repayment_frequency,
        )?;
        let calendars = ScheduleCalendars::for_loan(params)?;

        Ok(Self {
            params,
            minimum_payment,
            calendars,
        })
    }

    /// periodic repayment before capping at the remaining balance
    pub fn minimum_payment(&self) -> Money {
        self.minimum_payment
    }

    pub fn calendars(&self) -> &ScheduleCalendars {
        &self.calendars
    }

    /// run the schedule and return the full ledger
    pub fn run(&self) -> Ledger {
        let params = self.params;
        let mut ledger = Ledger::settle(params.settlement_date, params.principal, params.initial_offset);

        let mut state = ScheduleState {
            loan_balance: params.principal,
            offset_balance: params.initial_offset,
            accrual: AccrualEngine::new(params.annual_rate),
        };

        let mut last_day = None;
        for &date in &self.calendars.days {
            state = self.advance_day(state, date, &mut ledger);
            last_day = Some(date);

            if state.is_repaid() {
                log::info!(
                    "loan of {} repaid on {} after {} transactions",
                    params.principal,
                    date,
                    ledger.len()
                );
                return ledger;
            }
        }

        if let Some(maturity) = last_day {
            self.pay_out_at_maturity(state, maturity, &mut ledger);
        }

        ledger
    }

    /// apply one day's events in their fixed order
    fn advance_day(&self, mut state: ScheduleState, date: NaiveDate, ledger: &mut Ledger) -> ScheduleState {
        state.accrual.accrue_day(state.loan_balance, state.offset_balance);

        if self.calendars.interest_charges.contains(date) {
            let charged = state.accrual.capitalize(state.loan_balance, date);
            state.loan_balance = charged.new_balance;
            ledger.record(Transaction {
                date,
                transaction_type: TransactionType::Interest,
                amount: charged.amount_capitalized,
                loan_balance: state.loan_balance,
                offset_balance: state.offset_balance,
            });
        }

        if self.calendars.offset_contributions.contains(date) {
            state.offset_balance += self.params.offset_contribution;
            ledger.record(Transaction {
                date,
                transaction_type: TransactionType::OffsetContribution,
                amount: self.params.offset_contribution,
                loan_balance: state.loan_balance,
                offset_balance: state.offset_balance,
            });
        }

        if self.calendars.repayments.contains(date) {
            state = self.repay(state, date, self.minimum_payment, TransactionType::Repayment, ledger);
        }

        if self.calendars.extra_repayments.contains(date) && !state.loan_balance.is_zero() {
            state = self.repay(
                state,
                date,
                self.params.extra_repayment,
                TransactionType::ExtraRepayment,
                ledger,
            );
        }

        state
    }

    /// take a repayment capped at the outstanding balance
    fn repay(
        &self,
        mut state: ScheduleState,
        date: NaiveDate,
        scheduled: Money,
        transaction_type: TransactionType,
        ledger: &mut Ledger,
    ) -> ScheduleState {
        let amount = scheduled.min(state.loan_balance);
        state.loan_balance = settle_dust(state.loan_balance - amount);
        ledger.record(Transaction {
            date,
            transaction_type,
            amount,
            loan_balance: state.loan_balance,
            offset_balance: state.offset_balance,
        });
        state
    }

    /// clear whatever the regular repayments left behind on the last day of the term
    fn pay_out_at_maturity(&self, state: ScheduleState, maturity: NaiveDate, ledger: &mut Ledger) {
        if state.loan_balance.is_zero() {
            return;
        }

        log::warn!(
            "loan of {} not repaid by maturity {}; paying out remaining {}",
            self.params.principal,
            maturity,
            state.loan_balance
        );

        ledger.record(Transaction {
            date: maturity,
            transaction_type: TransactionType::Repayment,
            amount: state.loan_balance,
            loan_balance: Money::ZERO,
            offset_balance: state.offset_balance,
        });
    }
}

/// generate the full ledger for one loan
pub fn generate_schedule(params: &LoanParameters) -> Result<Ledger> {
    if params.capture_interest_accrual {
        log::warn!("capture_interest_accrual is set but daily accrual rows are not recorded");
    }

    let engine = ScheduleEngine::new(params)?;
    log::debug!(
        "scheduling {} at {} over {}y{}m, {} repayments of {}",
        params.principal,
        params.annual_rate,
        params.term.years,
        params.term.months,
        params.repayment_frequency,
        engine.minimum_payment()
    );
    Ok(engine.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::LoanTerm;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(principal: i64, rate: rust_decimal::Decimal, years: u32, months: u32, repayments: Frequency) -> LoanParameters {
        LoanParameters {
            settlement_date: date(2025, 10, 5),
            principal: Money::from_major(principal),
            annual_rate: Rate::from_percentage(rate),
            term: LoanTerm::new(years, months),
            repayment_frequency: repayments,
            initial_offset: Money::ZERO,
            offset_contribution_frequency: Frequency::Monthly,
            offset_contribution: Money::ZERO,
            extra_repayment_frequency: Frequency::Annually,
            extra_repayment: Money::ZERO,
            capture_interest_accrual: false,
        }
    }

    fn total_interest(ledger: &Ledger) -> Money {
        ledger.of_type(TransactionType::Interest).map(|t| t.amount).sum()
    }

    fn assert_ledger_invariants(ledger: &Ledger, params: &LoanParameters) {
        let first = ledger.transactions()[0];
        assert_eq!(first.transaction_type, TransactionType::Settlement);
        assert_eq!(first.amount, params.principal);
        assert_eq!(first.loan_balance, params.principal);
        assert_eq!(first.offset_balance, params.initial_offset);
        assert_eq!(ledger.of_type(TransactionType::Settlement).count(), 1);

        assert_eq!(ledger.closing_balance(), Money::ZERO);

        let mut previous = first.loan_balance;
        let mut previous_date = first.date;
        for t in ledger.iter().skip(1) {
            assert!(t.date > first.date);
            assert!(t.date >= previous_date);
            assert!(!t.loan_balance.is_negative());
            match t.transaction_type {
                TransactionType::Interest => assert!(t.loan_balance >= previous),
                TransactionType::Repayment | TransactionType::ExtraRepayment => {
                    assert!(t.loan_balance <= previous)
                }
                _ => assert_eq!(t.loan_balance, previous),
            }
            previous = t.loan_balance;
            previous_date = t.date;
        }
    }

    #[test]
    fn test_calendars_start_after_settlement() {
        let params = loan(100_000, dec!(5), 1, 0, Frequency::Monthly);
        let calendars = ScheduleCalendars::for_loan(&params).unwrap();

        assert_eq!(calendars.days.first(), Some(&date(2025, 10, 6)));
        assert_eq!(calendars.days.last(), Some(&date(2026, 10, 5)));
        assert_eq!(calendars.interest_charges.len(), 12);
        assert_eq!(calendars.repayments.len(), 12);
        assert!(calendars.extra_repayments.is_empty());
    }

    #[test]
    fn test_baseline_fortnightly_loan() {
        let params = loan(650_000, dec!(5.34), 30, 0, Frequency::Fortnightly);
        let ledger = generate_schedule(&params).unwrap();

        assert_ledger_invariants(&ledger, &params);
        let interest = total_interest(&ledger);
        assert!((interest - Money::from_str_exact("647093.34").unwrap()).abs() <= Money::CENT);
        assert_eq!(ledger.last().unwrap().date, date(2055, 7, 4));
    }

    #[test]
    fn test_offset_reduces_interest() {
        let mut params = loan(650_000, dec!(5.34), 30, 0, Frequency::Fortnightly);
        params.initial_offset = Money::from_major(20_000);
        params.offset_contribution = Money::from_major(500);

        let ledger = generate_schedule(&params).unwrap();

        assert_ledger_invariants(&ledger, &params);
        let interest = total_interest(&ledger);
        assert!((interest - Money::from_str_exact("423561.75").unwrap()).abs() <= Money::CENT);
    }

    #[test]
    fn test_extra_repayments_reduce_interest() {
        let mut params = loan(650_000, dec!(5.34), 30, 0, Frequency::Fortnightly);
        params.extra_repayment = Money::from_major(5_000);

        let ledger = generate_schedule(&params).unwrap();

        assert_ledger_invariants(&ledger, &params);
        let interest = total_interest(&ledger);
        assert!((interest - Money::from_str_exact("495545.42").unwrap()).abs() <= Money::CENT);

        let extras: Vec<_> = ledger.of_type(TransactionType::ExtraRepayment).collect();
        assert_eq!(extras[0].date, date(2026, 10, 5));
        assert_eq!(extras[0].amount, Money::from_major(5_000));
    }

    #[test]
    fn test_offset_and_extra_repayments_combined() {
        let mut params = loan(650_000, dec!(5.34), 30, 0, Frequency::Fortnightly);
        params.initial_offset = Money::from_major(20_000);
        params.offset_contribution = Money::from_major(500);
        params.extra_repayment = Money::from_major(5_000);

        let ledger = generate_schedule(&params).unwrap();

        assert_ledger_invariants(&ledger, &params);
        let interest = total_interest(&ledger);
        assert!((interest - Money::from_str_exact("353294.29").unwrap()).abs() <= Money::CENT);
    }

    #[test]
    fn test_same_day_order() {
        // monthly repayments and contributions fall on the interest charge date
        let mut params = loan(100_000, dec!(6), 1, 0, Frequency::Monthly);
        params.offset_contribution = Money::from_major(100);
        params.extra_repayment = Money::from_major(50);
        params.extra_repayment_frequency = Frequency::Monthly;

        let ledger = generate_schedule(&params).unwrap();
        let first_day: Vec<_> = ledger
            .iter()
            .filter(|t| t.date == date(2025, 11, 5))
            .map(|t| t.transaction_type)
            .collect();

        assert_eq!(
            first_day,
            vec![
                TransactionType::Interest,
                TransactionType::OffsetContribution,
                TransactionType::Repayment,
                TransactionType::ExtraRepayment,
            ]
        );
    }

    #[test]
    fn test_contribution_counts_from_next_day() {
        let mut with_offset = loan(100_000, dec!(6), 1, 0, Frequency::Monthly);
        with_offset.offset_contribution = Money::from_major(10_000);
        let without_offset = loan(100_000, dec!(6), 1, 0, Frequency::Monthly);

        let a = generate_schedule(&with_offset).unwrap();
        let b = generate_schedule(&without_offset).unwrap();

        // the first charge covers days before the first contribution
        let first_a = a.of_type(TransactionType::Interest).next().unwrap().amount;
        let first_b = b.of_type(TransactionType::Interest).next().unwrap().amount;
        assert_eq!(first_a, first_b);

        let second_a = a.of_type(TransactionType::Interest).nth(1).unwrap().amount;
        let second_b = b.of_type(TransactionType::Interest).nth(1).unwrap().amount;
        assert!(second_a < second_b);
    }

    #[test]
    fn test_zero_principal_only_settles() {
        let params = loan(0, dec!(5), 30, 0, Frequency::Monthly);
        let ledger = generate_schedule(&params).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.closing_balance(), Money::ZERO);
    }

    #[test]
    fn test_zero_rate_charges_no_interest() {
        let params = loan(12_000, dec!(0), 1, 0, Frequency::Monthly);
        let ledger = generate_schedule(&params).unwrap();

        assert_ledger_invariants(&ledger, &params);
        assert_eq!(total_interest(&ledger), Money::ZERO);
        let repayments: Vec<_> = ledger.of_type(TransactionType::Repayment).collect();
        assert_eq!(repayments.len(), 12);
        assert!(repayments.iter().all(|t| t.amount == Money::from_major(1_000)));
    }

    #[test]
    fn test_repayment_capped_at_balance() {
        let mut params = loan(10_000, dec!(5), 1, 0, Frequency::Monthly);
        params.extra_repayment = Money::from_major(50_000);
        params.extra_repayment_frequency = Frequency::Monthly;

        let ledger = generate_schedule(&params).unwrap();

        assert_ledger_invariants(&ledger, &params);
        let extra = ledger.of_type(TransactionType::ExtraRepayment).next().unwrap();
        assert!(extra.amount < Money::from_major(10_000));
        assert_eq!(extra.loan_balance, Money::ZERO);
        assert_eq!(ledger.last().unwrap(), extra);
    }

    #[test]
    fn test_residual_paid_out_at_maturity() {
        // a monthly schedule priced on rate/12 leaves a residual under daily 365-day accrual
        let mut params = loan(500_000, dec!(5), 30, 0, Frequency::Monthly);
        params.settlement_date = date(2023, 1, 31);

        let ledger = generate_schedule(&params).unwrap();

        assert_ledger_invariants(&ledger, &params);
        let tail: Vec<_> = ledger.iter().rev().take(2).collect();
        let (payout, scheduled) = (tail[0], tail[1]);
        assert_eq!(payout.date, date(2053, 1, 31));
        assert_eq!(scheduled.date, date(2053, 1, 31));
        assert_eq!(payout.transaction_type, TransactionType::Repayment);
        assert_eq!(scheduled.transaction_type, TransactionType::Repayment);
        assert_eq!(payout.amount, scheduled.loan_balance);
        assert!(payout.amount > PAYOFF_TOLERANCE);
        assert!(payout.amount < ScheduleEngine::new(&params).unwrap().minimum_payment());
    }

    #[test]
    fn test_weekly_quarterly_and_annual_repayments() {
        let cases = [
            (Frequency::Weekly, "65616.16", date(2035, 9, 23), None),
            (Frequency::Quarterly, "67969.22", date(2035, 10, 5), Some("552.41")),
            (Frequency::Annually, "74675.52", date(2035, 10, 5), Some("2939.60")),
        ];

        for (frequency, interest, payoff, residual) in cases {
            let params = loan(200_000, dec!(6), 10, 0, frequency);
            let ledger = generate_schedule(&params).unwrap();

            assert_ledger_invariants(&ledger, &params);
            let total = total_interest(&ledger);
            assert!((total - Money::from_str_exact(interest).unwrap()).abs() <= Money::CENT);

            let last = ledger.last().unwrap();
            assert_eq!(last.date, payoff);
            assert_eq!(last.transaction_type, TransactionType::Repayment);
            if let Some(residual) = residual {
                // regular repayment and payout both land on maturity
                let on_maturity = ledger
                    .of_type(TransactionType::Repayment)
                    .filter(|t| t.date == payoff)
                    .count();
                assert_eq!(on_maturity, 2);
                assert!((last.amount - Money::from_str_exact(residual).unwrap()).abs() <= Money::CENT);
            }
        }
    }

    #[test]
    fn test_offset_above_loan_charges_no_interest() {
        let mut params = loan(100_000, dec!(5), 5, 0, Frequency::Monthly);
        params.initial_offset = Money::from_major(150_000);

        let ledger = generate_schedule(&params).unwrap();

        assert_ledger_invariants(&ledger, &params);
        assert!(ledger.of_type(TransactionType::Interest).all(|t| t.amount.is_zero()));
        assert_eq!(ledger.of_type(TransactionType::Repayment).count(), 53);
        assert_eq!(ledger.last().unwrap().date, date(2030, 3, 5));
    }

    #[test]
    fn test_no_extra_repayment_once_repaid() {
        for frequency in [Frequency::Fortnightly, Frequency::Monthly, Frequency::Quarterly] {
            let mut params = loan(10_000, dec!(5), 1, 0, frequency);
            params.extra_repayment_frequency = Frequency::Daily;
            params.extra_repayment = Money::from_major(1);

            let ledger = generate_schedule(&params).unwrap();

            assert_ledger_invariants(&ledger, &params);
            assert!(ledger
                .of_type(TransactionType::ExtraRepayment)
                .all(|t| t.amount == Money::from_major(1)));
            assert_eq!(ledger.last().unwrap().transaction_type, TransactionType::Repayment);
        }
    }
}
