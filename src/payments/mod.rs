pub mod amortization;

pub use amortization::minimum_repayment;
