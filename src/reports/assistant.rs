use std::fmt::{self, Write};

use crate::expenses::Expense;
use crate::ledger::DebtRecord;
use crate::types::{display_name, ExpenseStatus, User};

/// how many expenses the assistant sees
pub const RECENT_EXPENSE_LIMIT: usize = 20;

/// plain-text ledger summary handed to the chat assistant. member ids are
/// replaced by names; money is printed in whole units.
pub fn assistant_context(users: &[User], expenses: &[Expense], debts: &[DebtRecord]) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_context(&mut out, users, expenses, debts);
    out
}

fn write_context(out: &mut String, users: &[User], expenses: &[Expense], debts: &[DebtRecord]) -> fmt::Result {
    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    writeln!(out, "Members: {}", names.join(", "))?;

    writeln!(out, "\nOutstanding debts:")?;
    if debts.is_empty() {
        writeln!(out, "- none, everyone is settled")?;
    }
    for debt in debts {
        writeln!(
            out,
            "- {} owes {} {} (principal {}, interest {})",
            display_name(users, &debt.debtor_id),
            display_name(users, &debt.creditor_id),
            debt.total_debt,
            debt.principal,
            debt.interest,
        )?;
        for detail in &debt.details {
            writeln!(
                out,
                "  * {} on {}: {} days since last activity, rate {}",
                detail.description,
                detail.date_incurred.display(),
                detail.days_overdue,
                detail.interest_rate,
            )?;
        }
    }

    writeln!(out, "\nRecent expenses:")?;
    for expense in recent_expenses(expenses) {
        let status = match expense.status {
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Pending => "pending",
        };
        writeln!(
            out,
            "- {} on {}: {} paid by {} ({})",
            expense.description,
            expense.date.display(),
            expense.amount,
            display_name(users, &expense.payer_id),
            status,
        )?;
    }

    Ok(())
}

/// newest first by creation stamp, falling back to the expense date
fn recent_expenses(expenses: &[Expense]) -> impl Iterator<Item = &Expense> {
    let mut sorted: Vec<&Expense> = expenses.iter().collect();
    sorted.sort_by_key(|e| std::cmp::Reverse(e.recorded_at()));
    sorted.into_iter().take(RECENT_EXPENSE_LIMIT)
}
