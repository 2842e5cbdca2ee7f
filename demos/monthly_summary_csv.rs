/// monthly summary - run a loan from a json record and store both tables as csv
use offset_loan_rs::{prepare_loan_summary_from_json, SummaryOptions};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== monthly summary csv ===\n");

    let record = json!({
        "start_date": "2025-10-05",
        "loan_amount": 400000,
        "annual_rate": 6.1,
        "loan_duration_years": 25,
        "loan_duration_months": 6,
        "repayment_frequency": "monthly",
        "initial_offset_amount": 15000,
        "offset_contribution_frequency": "monthly",
        "offset_contribution_regular_amount": 300
    });

    let output_dir = std::env::temp_dir().join("offset-loan-demo");
    let summary = prepare_loan_summary_from_json(&record, &SummaryOptions::store_in(&output_dir))?;

    println!("schedule id: {}", summary.schedule_id);
    println!("transactions: {}", summary.transactions.len());
    println!("total interest: ${}", summary.total_interest_charged.round_dp(2));
    println!("total repayments: ${}", summary.total_repayments.round_dp(2));
    println!("tables written to {}", output_dir.display());

    println!("\nfirst twelve months:");
    for row in summary.monthly_summary.iter().take(12) {
        println!(
            "  {}  repaid ${:>10}  interest ${:>9}  opening ${:>11}  offset ${:>9}",
            row.month,
            row.total_repayment.round_dp(2),
            row.total_interest.round_dp(2),
            row.loan_balance_first_day.round_dp(2),
            row.offset_balance_last_day.round_dp(2)
        );
    }

    Ok(())
}
