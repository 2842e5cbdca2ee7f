use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Invalid frequency '{value}'. Choose 'daily', 'weekly', 'fortnightly', 'monthly', 'quarterly', or 'annually'.")]
    InvalidFrequency {
        value: String,
    },

    #[error("Invalid repayment frequency '{value}'. Choose 'weekly', 'fortnightly', 'annual', 'monthly', or 'quarterly'.")]
    InvalidRepaymentFrequency {
        value: String,
    },

    #[error("invalid loan parameters: field `{field}` {message}")]
    SchemaValidation {
        field: String,
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoanError>;
