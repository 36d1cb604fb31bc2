/// json snapshot - load stored records, derive the ledger and reports
use split_ledger_rs::{
    assistant_context, compute_debts_at, net_position, personal_summary, ActivityLog, Expense, LedgerDate, User,
};

const USERS: &str = r#"[
    {"id": "u1", "name": "TuanChom", "email": "tuanchom@example.com", "role": "ADMIN", "avatar": "TC"},
    {"id": "u2", "name": "TamTrang", "email": "tamtrang@example.com", "role": "VIEWER", "avatar": "TT"},
    {"id": "u3", "name": "Phi", "email": "phi@example.com", "role": "VIEWER", "avatar": "PH"}
]"#;

const EXPENSES: &str = r#"[
    {
        "id": "c1", "stageId": "s1", "description": "Foundation", "amount": 100,
        "payerId": "u2", "date": "2024-01-01", "interestRate": 0,
        "allocations": [
            {"userId": "u1", "amount": 33, "percentage": 33, "paidAmount": 33,
             "payments": [{"id": "p1", "amount": 33, "interest": 0, "date": "2024-01-20"}], "isPaid": true},
            {"userId": "u2", "amount": 34, "percentage": 34, "paidAmount": 0, "payments": [], "isPaid": false},
            {"userId": "u3", "amount": 33, "percentage": 33, "paidAmount": 0, "payments": [], "isPaid": false}
        ],
        "isCustomAllocation": false, "approvedBy": ["u1", "u2", "u3"], "status": "APPROVED",
        "createdAt": 1704096000000
    },
    {
        "id": "c2", "description": "Paint", "amount": 900, "payerId": "u3", "date": "2024-02-10",
        "allocations": [
            {"userId": "u1", "amount": 300}, {"userId": "u2", "amount": 300}, {"userId": "u3", "amount": 300}
        ],
        "approvedBy": ["u3"], "status": "PENDING"
    }
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json snapshot ===\n");

    let users: Vec<User> = serde_json::from_str(USERS)?;
    let expenses: Vec<Expense> = serde_json::from_str(EXPENSES)?;
    let today = LedgerDate::parse("2024-03-01")?;

    let debts = compute_debts_at(&expenses, &users, today);
    println!("ledger:\n{}\n", serde_json::to_string_pretty(&debts)?);

    for user in &users {
        let position = net_position(&debts, &user.id);
        let summary = personal_summary(&expenses, &debts, &user.id);
        println!(
            "{}: net {}, share {}, paid {}",
            user.name, position.net, summary.total_share, summary.total_paid
        );
    }

    println!("\nactivity:");
    for activity in ActivityLog::from_expenses(&expenses).entries() {
        println!("  {} {} {}", activity.date(), activity.actor_id(), activity.amount());
    }

    println!("\nassistant context:\n{}", assistant_context(&users, &expenses, &debts));

    Ok(())
}
