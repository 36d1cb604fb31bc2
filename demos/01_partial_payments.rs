/// partial payments - watch a debt shrink and disappear
use split_ledger_rs::{
    compute_debts_at, preview_payment, record_payment, DebtRecord, Expense, LedgerConfig, LedgerDate, Money, Rate,
    User,
};

fn print_debts(label: &str, debts: &[DebtRecord]) {
    println!("{label}");
    for debt in debts {
        println!("  {} -> {}: {}", debt.debtor_id, debt.creditor_id, debt.total_debt);
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== partial payments ===\n");

    let users = vec![User::new("u1", "Tuan"), User::new("u2", "Tam"), User::new("u3", "Phi")];
    let config = LedgerConfig::interest_free();
    let today = LedgerDate::parse("2024-03-01")?;

    let mut expense = Expense::builder()
        .id("c1")
        .description("Roof tiles")
        .amount(Money::from_units(300_000_000))
        .payer("u1")
        .date(LedgerDate::parse("2024-01-01")?)
        .split_equally(["u1", "u2", "u3"])
        .approved()
        .build()?;

    print_debts("after the expense:", &compute_debts_at(std::slice::from_ref(&expense), &users, today));

    // what the confirmation dialog would show
    if let Some(allocation) = expense.allocation_for("u2") {
        let preview = preview_payment(
            allocation,
            expense.date,
            Rate::ZERO,
            Money::from_units(40_000_000),
            LedgerDate::parse("2024-01-15")?,
        );
        println!(
            "preview: {} outstanding, {} after paying {}\n",
            preview.remaining_before, preview.remaining_after, preview.amount
        );
    }

    record_payment(
        &mut expense,
        "u2",
        Money::from_units(40_000_000),
        Money::ZERO,
        LedgerDate::parse("2024-01-15")?,
        &config,
    )?;
    print_debts("after u2 pays 40,000,000:", &compute_debts_at(std::slice::from_ref(&expense), &users, today));

    record_payment(
        &mut expense,
        "u2",
        Money::from_units(60_000_000),
        Money::ZERO,
        LedgerDate::parse("2024-02-01")?,
        &config,
    )?;
    print_debts("after u2 pays the rest:", &compute_debts_at(std::slice::from_ref(&expense), &users, today));

    Ok(())
}
