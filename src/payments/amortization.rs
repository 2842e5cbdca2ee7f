use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::{Frequency, LoanTerm};

/// fixed periodic payment that amortizes `principal` over `term`
///
/// `payment = P * r(1+r)^n / ((1+r)^n - 1)` where `r` is the annual rate split
/// across the payments in a year and `n` the number of payments in the term.
/// A zero rate falls back to straight-line `P / n`.
pub fn minimum_repayment(
    principal: Money,
    annual_rate: Rate,
    term: LoanTerm,
    frequency: Frequency,
) -> Result<Money> {
    let payments_per_year = frequency
        .payments_per_year()
        .ok_or_else(|| LoanError::InvalidRepaymentFrequency {
            value: frequency.to_string(),
        })?;

    let periods = term.periods(payments_per_year);
    if periods.is_zero() {
        return Err(LoanError::InvalidConfiguration {
            message: "loan term must be at least one month".to_string(),
        });
    }

    let r = annual_rate.periodic_rate(payments_per_year).as_decimal();
    if r.is_zero() {
        return Ok(principal / periods);
    }

    let compound = compound_factor(Decimal::ONE + r, periods)?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(LoanError::CalculationError {
            message: format!("rate {} too small to amortize over {} periods", annual_rate, periods),
        });
    }

    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|x| x.checked_mul(compound))
        .ok_or_else(|| overflow(annual_rate, periods))?;

    Ok(Money::from_decimal(numerator / denominator))
}

/// (1 + r)^n, multiplied out for whole periods and via `powd` for fractional ones
fn compound_factor(base: Decimal, periods: Decimal) -> Result<Decimal> {
    if periods.fract().is_zero() {
        let n = periods.to_u64().ok_or_else(|| LoanError::CalculationError {
            message: format!("{} periods out of range", periods),
        })?;
        let mut compound = Decimal::ONE;
        for _ in 0..n {
            compound = compound.checked_mul(base).ok_or_else(|| LoanError::CalculationError {
                message: format!("compounding {} over {} periods overflows", base, periods),
            })?;
        }
        Ok(compound)
    } else {
        base.checked_powd(periods).ok_or_else(|| LoanError::CalculationError {
            message: format!("compounding {} over {} periods overflows", base, periods),
        })
    }
}

fn overflow(annual_rate: Rate, periods: Decimal) -> LoanError {
    LoanError::CalculationError {
        message: format!("payment at {} over {} periods overflows", annual_rate, periods),
    }
}
