/// offset and extra repayments - how much interest each strategy saves
use offset_loan_rs::chrono::NaiveDate;
use offset_loan_rs::{compare_scenarios, Decimal, Frequency, LoanParameters, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== offset and extra repayments ===\n");

    // $650,000 over 30 years at 5.34%, repaid fortnightly
    let baseline = LoanParameters::builder()
        .settlement_date(NaiveDate::from_ymd_opt(2025, 10, 5).ok_or("bad settlement date")?)
        .amount(Money::from_major(650_000))
        .rate(Rate::from_percentage(Decimal::new(534, 2)))
        .term(30, 0)
        .repayment_frequency(Frequency::Fortnightly)
        .build()?;

    // $20,000 in the offset account plus $500 a month
    let mut offset_only = baseline.clone();
    offset_only.initial_offset = Money::from_major(20_000);
    offset_only.offset_contribution = Money::from_major(500);

    // $5,000 extra each year
    let mut extra_only = baseline.clone();
    extra_only.extra_repayment_frequency = Frequency::Annually;
    extra_only.extra_repayment = Money::from_major(5_000);

    let mut both = offset_only.clone();
    both.extra_repayment_frequency = Frequency::Annually;
    both.extra_repayment = Money::from_major(5_000);

    let outcomes = compare_scenarios(
        &baseline,
        &[
            ("offset, no extra repayments", offset_only),
            ("no offset, extra repayments", extra_only),
            ("offset and extra repayments", both),
        ],
    )?;

    println!("total interest payable:");
    for outcome in &outcomes {
        let payoff = outcome
            .payoff_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  - {:<30} ${:>12}  paid off {}  saves ${}",
            outcome.label,
            outcome.total_interest_charged.round_dp(2),
            payoff,
            outcome.interest_saved.round_dp(2)
        );
    }

    Ok(())
}
