use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::calendar::maturity_date;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::{Frequency, LoanTerm};

/// loan options as supplied by callers, using the external field names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanConfig {
    /// settlement date, `YYYY-MM-DD`
    pub start_date: String,
    pub loan_amount: Decimal,
    /// percentage points, 5.34 for 5.34%
    pub annual_rate: Decimal,
    pub loan_duration_years: i64,
    pub loan_duration_months: i64,
    pub repayment_frequency: String,
    pub initial_offset_amount: Decimal,
    pub offset_contribution_frequency: String,
    pub offset_contribution_regular_amount: Decimal,
    #[serde(default = "default_extra_frequency")]
    pub extra_repayments_frequency: String,
    #[serde(default)]
    pub extra_repayments_regular_amount: Decimal,
    /// reserved for per-day accrual capture, currently has no effect
    #[serde(default)]
    pub capture_interest_accrual: bool,
}

fn default_extra_frequency() -> String {
    Frequency::Annually.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Number,
    Integer,
    Flag,
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Flag => value.is_boolean(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Number => "a number",
            FieldKind::Integer => "an integer",
            FieldKind::Flag => "a boolean",
        }
    }
}

const REQUIRED_FIELDS: [(&str, FieldKind); 9] = [
    ("start_date", FieldKind::Text),
    ("loan_amount", FieldKind::Number),
    ("annual_rate", FieldKind::Number),
    ("loan_duration_years", FieldKind::Integer),
    ("loan_duration_months", FieldKind::Integer),
    ("repayment_frequency", FieldKind::Text),
    ("initial_offset_amount", FieldKind::Number),
    ("offset_contribution_frequency", FieldKind::Text),
    ("offset_contribution_regular_amount", FieldKind::Number),
];

const OPTIONAL_FIELDS: [(&str, FieldKind); 3] = [
    ("extra_repayments_frequency", FieldKind::Text),
    ("extra_repayments_regular_amount", FieldKind::Number),
    ("capture_interest_accrual", FieldKind::Flag),
];

/// check the shape of a loan record before anything is computed
///
/// Only presence and JSON types are checked. Business rules such as
/// non-negative amounts are left to the caller.
pub fn validate_loan_config(value: &Value) -> Result<LoanConfig> {
    let fields = value.as_object().ok_or_else(|| LoanError::SchemaValidation {
        field: "<root>".to_string(),
        message: "must be an object".to_string(),
    })?;

    for (name, kind) in REQUIRED_FIELDS {
        match fields.get(name) {
            None | Some(Value::Null) => {
                return Err(LoanError::SchemaValidation {
                    field: name.to_string(),
                    message: "is required".to_string(),
                });
            }
            Some(v) if !kind.accepts(v) => {
                return Err(LoanError::SchemaValidation {
                    field: name.to_string(),
                    message: format!("must be {}", kind.describe()),
                });
            }
            Some(_) => {}
        }
    }

    for (name, kind) in OPTIONAL_FIELDS {
        if let Some(v) = fields.get(name) {
            if !kind.accepts(v) {
                return Err(LoanError::SchemaValidation {
                    field: name.to_string(),
                    message: format!("must be {}", kind.describe()),
                });
            }
        }
    }

    Ok(serde_json::from_value(value.clone())?)
}

impl LoanConfig {
    /// parse and validate a json document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        validate_loan_config(&value)
    }

    /// read and validate a json file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn into_parameters(self) -> Result<LoanParameters> {
        LoanParameters::try_from(self)
    }
}

/// validated, typed loan inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub settlement_date: NaiveDate,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term: LoanTerm,
    pub repayment_frequency: Frequency,
    pub initial_offset: Money,
    pub offset_contribution_frequency: Frequency,
    pub offset_contribution: Money,
    pub extra_repayment_frequency: Frequency,
    /// zero disables extra repayments
    pub extra_repayment: Money,
    pub capture_interest_accrual: bool,
}

impl LoanParameters {
    pub fn builder() -> LoanParametersBuilder {
        LoanParametersBuilder::new()
    }

    /// last day of the loan term
    pub fn maturity_date(&self) -> Result<NaiveDate> {
        maturity_date(self.settlement_date, self.term)
    }

    pub fn has_extra_repayments(&self) -> bool {
        !self.extra_repayment.is_zero()
    }
}

fn duration_component(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| LoanError::InvalidConfiguration {
        message: format!("{} must be a non-negative whole number, got {}", field, value),
    })
}

/// a loan is either empty or larger than the payoff tolerance, so every ledger closes at zero
fn check_principal(principal: Money) -> Result<()> {
    if principal.is_negative() || (!principal.is_zero() && principal <= Money::CENT) {
        return Err(LoanError::InvalidConfiguration {
            message: format!("loan amount {} must be zero or more than {}", principal, Money::CENT),
        });
    }
    Ok(())
}

impl TryFrom<LoanConfig> for LoanParameters {
    type Error = LoanError;

    fn try_from(config: LoanConfig) -> Result<Self> {
        let settlement_date = NaiveDate::parse_from_str(&config.start_date, "%Y-%m-%d").map_err(|e| {
            LoanError::InvalidDate {
                message: format!("start_date '{}' is not YYYY-MM-DD: {}", config.start_date, e),
            }
        })?;

        let term = LoanTerm::try_new(
            duration_component(config.loan_duration_years, "loan_duration_years")?,
            duration_component(config.loan_duration_months, "loan_duration_months")?,
        )?;
        if term.is_empty() {
            return Err(LoanError::InvalidConfiguration {
                message: "loan_duration_years and loan_duration_months cannot both be zero".to_string(),
            });
        }

        let principal = Money::from_decimal(config.loan_amount);
        check_principal(principal)?;

        Ok(Self {
            settlement_date,
            principal,
            annual_rate: Rate::from_percentage(config.annual_rate),
            term,
            repayment_frequency: Frequency::parse_repayment(&config.repayment_frequency)?,
            initial_offset: Money::from_decimal(config.initial_offset_amount),
            offset_contribution_frequency: config.offset_contribution_frequency.parse()?,
            offset_contribution: Money::from_decimal(config.offset_contribution_regular_amount),
            extra_repayment_frequency: config.extra_repayments_frequency.parse()?,
            extra_repayment: Money::from_decimal(config.extra_repayments_regular_amount),
            capture_interest_accrual: config.capture_interest_accrual,
        })
    }
}

/// builder for loan parameters
pub struct LoanParametersBuilder {
    settlement_date: Option<NaiveDate>,
    principal: Option<Money>,
    annual_rate: Option<Rate>,
    term: Option<LoanTerm>,
    repayment_frequency: Frequency,
    initial_offset: Money,
    offset_contribution_frequency: Frequency,
    offset_contribution: Money,
    extra_repayment_frequency: Frequency,
    extra_repayment: Money,
    capture_interest_accrual: bool,
}

impl Default for LoanParametersBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanParametersBuilder {
    pub fn new() -> Self {
        Self {
            settlement_date: None,
            principal: None,
            annual_rate: None,
            term: None,
            repayment_frequency: Frequency::Monthly,
            initial_offset: Money::ZERO,
            offset_contribution_frequency: Frequency::Monthly,
            offset_contribution: Money::ZERO,
            extra_repayment_frequency: Frequency::Annually,
            extra_repayment: Money::ZERO,
            capture_interest_accrual: false,
        }
    }

    pub fn settlement_date(mut self, date: NaiveDate) -> Self {
        self.settlement_date = Some(date);
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.principal = Some(amount);
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.annual_rate = Some(rate);
        self
    }

    pub fn term(mut self, years: u32, months: u32) -> Self {
        self.term = Some(LoanTerm::new(years, months));
        self
    }

    pub fn repayment_frequency(mut self, frequency: Frequency) -> Self {
        self.repayment_frequency = frequency;
        self
    }

    pub fn initial_offset(mut self, amount: Money) -> Self {
        self.initial_offset = amount;
        self
    }

    pub fn offset_contributions(mut self, frequency: Frequency, amount: Money) -> Self {
        self.offset_contribution_frequency = frequency;
        self.offset_contribution = amount;
        self
    }

    pub fn extra_repayments(mut self, frequency: Frequency, amount: Money) -> Self {
        self.extra_repayment_frequency = frequency;
        self.extra_repayment = amount;
        self
    }

    pub fn capture_interest_accrual(mut self, capture: bool) -> Self {
        self.capture_interest_accrual = capture;
        self
    }

    /// build, settling tomorrow by the system clock when no date was given
    pub fn build(self) -> Result<LoanParameters> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.build_with_time(&time)
    }

    /// build with explicit time provider
    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<LoanParameters> {
        let principal = self.principal.ok_or(LoanError::InvalidConfiguration {
            message: "Amount required".to_string(),
        })?;
        check_principal(principal)?;

        let annual_rate = self.annual_rate.ok_or(LoanError::InvalidConfiguration {
            message: "Rate required".to_string(),
        })?;

        let term = self.term.ok_or(LoanError::InvalidConfiguration {
            message: "Term required".to_string(),
        })?;
        let term = LoanTerm::try_new(term.years, term.months)?;
        if term.is_empty() {
            return Err(LoanError::InvalidConfiguration {
                message: "Term must be at least one month".to_string(),
            });
        }

        if self.repayment_frequency.payments_per_year().is_none() {
            return Err(LoanError::InvalidRepaymentFrequency {
                value: self.repayment_frequency.to_string(),
            });
        }

        let settlement_date = match self.settlement_date {
            Some(date) => date,
            None => time_provider
                .now()
                .date_naive()
                .succ_opt()
                .ok_or(LoanError::InvalidDate {
                    message: "no day after the current date".to_string(),
                })?,
        };

        Ok(LoanParameters {
            settlement_date,
            principal,
            annual_rate,
            term,
            repayment_frequency: self.repayment_frequency,
            initial_offset: self.initial_offset,
            offset_contribution_frequency: self.offset_contribution_frequency,
            offset_contribution: self.offset_contribution,
            extra_repayment_frequency: self.extra_repayment_frequency,
            extra_repayment: self.extra_repayment,
            capture_interest_accrual: self.capture_interest_accrual,
        })
    }
}
