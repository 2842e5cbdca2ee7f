pub mod analysis;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod ledger;
pub mod payments;
pub mod report;
pub mod schedule;
pub mod summary;
pub mod types;

// re-export key types
pub use analysis::{
    compare_scenarios, prepare_loan_summary, prepare_loan_summary_from_json, LoanSummary,
    ScenarioOutcome, SummaryOptions,
};
pub use calendar::{dates_between, dates_between_str, maturity_date, EventCalendar};
pub use config::{validate_loan_config, LoanConfig, LoanParameters, LoanParametersBuilder};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use interest::{daily_interest, AccrualEngine};
pub use ledger::{Ledger, Transaction};
pub use payments::minimum_repayment;
pub use schedule::{generate_schedule, ScheduleEngine};
pub use summary::{summarize, LoanTotals, MonthlySummaryRow, YearMonth};
pub use types::{Frequency, LoanTerm, ScheduleId, TransactionType};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
