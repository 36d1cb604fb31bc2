/// quick start - split one expense and read the ledger
use split_ledger_rs::{compute_debts, Expense, Money, SafeTimeProvider, TimeSource, User};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let users = vec![User::new("u1", "Tuan"), User::new("u2", "Tam"), User::new("u3", "Phi")];

    // u1 pays 300,000,000 and splits it three ways
    let expense = Expense::builder()
        .description("Foundation")
        .amount(Money::from_units(300_000_000))
        .payer("u1")
        .split_equally(["u1", "u2", "u3"])
        .approved()
        .build()?;

    let time = SafeTimeProvider::new(TimeSource::System);
    let debts = compute_debts(&[expense], &users, &time);

    println!("{}", serde_json::to_string_pretty(&debts)?);

    Ok(())
}
