/// interest accrual - the same history with interest on and off
use chrono::{Duration, TimeZone, Utc};
use split_ledger_rs::{
    compute_debts_with_config, compute_loan_status_today, AmortizationCalculator, Expense, LedgerConfig, LedgerDate,
    Money, Rate, SafeTimeProvider, TimeSource, User,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== interest accrual ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();
    let origination = LedgerDate::today(&time);

    // 1,000,000 at 12% a year, no payments
    for days in [0, 31, 60] {
        let status = compute_loan_status_today(
            Money::from_units(1_000_000),
            origination,
            Rate::from_percentage(12),
            &[],
            &time,
        );
        println!(
            "day {:>3}: principal {}, interest {}",
            days, status.remaining_principal, status.remaining_interest
        );
        controller.advance(Duration::days(if days == 0 { 31 } else { 29 }));
    }

    let users = vec![User::new("u1", "Tuan"), User::new("u2", "Tam")];
    let expense = Expense::builder()
        .id("c1")
        .description("Loan for windows")
        .amount(Money::from_units(2_000_000))
        .payer("u1")
        .date(origination)
        .rate(Rate::from_percentage(12))
        .split_equally(["u1", "u2"])
        .approved()
        .build_with_time(&time)?;

    let target = LedgerDate::today(&time);
    for (label, config) in [
        ("interest on", LedgerConfig::interest_bearing(Rate::from_percentage(12))),
        ("interest off", LedgerConfig::interest_free()),
    ] {
        let debts = compute_debts_with_config(std::slice::from_ref(&expense), &users, &config, target);
        for debt in &debts {
            println!(
                "{label}: {} owes {} -> principal {}, interest {}, total {}",
                debt.debtor_id, debt.creditor_id, debt.principal, debt.interest, debt.total_debt
            );
        }
    }

    println!("\naccrual segments:");
    if let Some(allocation) = expense.allocation_for("u2") {
        let segments = AmortizationCalculator::default().segments(
            allocation.amount,
            expense.date,
            expense.interest_rate,
            &allocation.payments,
            target,
        );
        for segment in segments {
            println!(
                "  {} .. {}: {} days on {} -> {}",
                segment.start, segment.end, segment.days, segment.principal_base, segment.interest_amount
            );
        }
    }

    Ok(())
}
