pub mod assistant;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::dates::LedgerDate;
use crate::decimal::Money;
use crate::expenses::Expense;
use crate::ledger::DebtRecord;
use crate::types::{display_name, ExpenseId, Stage, StageId, User};

pub use assistant::{assistant_context, RECENT_EXPENSE_LIMIT};

/// dashboard wallet card for one member
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetPosition {
    pub total_owed: Money,
    pub total_receivable: Money,
    /// receivable minus owed
    pub net: Money,
}

pub fn net_position(debts: &[DebtRecord], user_id: &str) -> NetPosition {
    let total_owed: Money = debts
        .iter()
        .filter(|d| d.debtor_id == user_id)
        .map(|d| d.total_debt)
        .sum();
    let total_receivable: Money = debts
        .iter()
        .filter(|d| d.creditor_id == user_id)
        .map(|d| d.total_debt)
        .sum();

    NetPosition {
        total_owed,
        total_receivable,
        net: total_receivable - total_owed,
    }
}

/// headline figures of the personal report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalSummary {
    /// sum of this member's allocations
    pub total_share: Money,
    /// net cash out: paid as payer plus repaid to others, less repayments received
    pub total_paid: Money,
    pub receivables: Money,
    pub payables: Money,
}

/// summary over approved expenses only
pub fn personal_summary(expenses: &[Expense], debts: &[DebtRecord], user_id: &str) -> PersonalSummary {
    let mut total_share = Money::ZERO;
    let mut paid_as_payer = Money::ZERO;
    let mut repaid_to_others = Money::ZERO;
    let mut repaid_to_me = Money::ZERO;

    for expense in expenses.iter().filter(|e| e.is_approved()) {
        if let Some(allocation) = expense.allocation_for(user_id) {
            total_share += allocation.amount;
        }

        if expense.payer_id == user_id {
            paid_as_payer += expense.amount;
            repaid_to_me += expense.debtor_allocations().map(|a| a.principal_paid()).sum::<Money>();
        } else if let Some(allocation) = expense.allocation_for(user_id) {
            repaid_to_others += allocation.principal_paid();
        }
    }

    let position = net_position(debts, user_id);

    PersonalSummary {
        total_share,
        total_paid: paid_as_payer + repaid_to_others - repaid_to_me,
        receivables: position.total_receivable,
        payables: position.total_owed,
    }
}

/// kind of personal history line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryKind {
    /// paid the expense up front
    Paid,
    /// own share of an expense
    Share,
    /// repaid someone
    RepayOut,
    /// got repaid
    RepayIn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub kind: HistoryKind,
    pub date: LedgerDate,
    pub expense_id: ExpenseId,
    pub description: String,
    pub amount: Money,
    /// the other member involved, by name
    pub counterparty: Option<String>,
}

/// every approved-expense event touching `user_id`, newest first
pub fn personal_history(expenses: &[Expense], users: &[User], user_id: &str) -> Vec<HistoryItem> {
    let mut items = Vec::new();

    for expense in expenses.iter().filter(|e| e.is_approved()) {
        if expense.payer_id == user_id {
            items.push(HistoryItem {
                id: format!("paid-{}", expense.id),
                kind: HistoryKind::Paid,
                date: expense.date,
                expense_id: expense.id.clone(),
                description: expense.description.clone(),
                amount: expense.amount,
                counterparty: None,
            });
        }

        if let Some(allocation) = expense.allocation_for(user_id) {
            items.push(HistoryItem {
                id: format!("share-{}", expense.id),
                kind: HistoryKind::Share,
                date: expense.date,
                expense_id: expense.id.clone(),
                description: expense.description.clone(),
                amount: allocation.amount,
                counterparty: None,
            });
        }

        for allocation in &expense.allocations {
            let kind = if allocation.user_id == user_id && expense.payer_id != user_id {
                HistoryKind::RepayOut
            } else if expense.payer_id == user_id && allocation.user_id != user_id {
                HistoryKind::RepayIn
            } else {
                continue;
            };
            let other = match kind {
                HistoryKind::RepayOut => &expense.payer_id,
                _ => &allocation.user_id,
            };

            for payment in &allocation.payments {
                let prefix = if kind == HistoryKind::RepayOut { "repay-out" } else { "repay-in" };
                items.push(HistoryItem {
                    id: format!("{prefix}-{}", payment.id),
                    kind,
                    date: payment.date,
                    expense_id: expense.id.clone(),
                    description: expense.description.clone(),
                    amount: payment.amount,
                    counterparty: Some(display_name(users, other).to_string()),
                });
            }
        }
    }

    // stable, so same-day items keep the order above
    items.sort_by(|a, b| b.date.cmp(&a.date));
    items
}

/// total of approved expenses
pub fn total_project_cost(expenses: &[Expense]) -> Money {
    expenses.iter().filter(|e| e.is_approved()).map(|e| e.amount).sum()
}

/// approved spend against one stage's budget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTotal {
    pub stage_id: StageId,
    pub name: String,
    pub total_cost: Money,
    pub budget: Money,
    /// total cost as a percentage of budget, zero without a budget
    pub percent_used: Decimal,
}

impl StageTotal {
    pub fn over_budget(&self) -> bool {
        self.budget.is_positive() && self.total_cost > self.budget
    }
}

/// roll approved expenses up into their stages, in stage order.
/// expenses without a stage, or naming an unknown one, are left out.
pub fn stage_totals(stages: &[Stage], expenses: &[Expense]) -> Vec<StageTotal> {
    stages
        .iter()
        .map(|stage| {
            let total_cost: Money = expenses
                .iter()
                .filter(|e| e.is_approved() && e.stage_id.as_deref() == Some(stage.id.as_str()))
                .map(|e| e.amount)
                .sum();

            StageTotal {
                stage_id: stage.id.clone(),
                name: stage.name.clone(),
                total_cost,
                budget: stage.budget,
                percent_used: total_cost.percentage_of(stage.budget),
            }
        })
        .collect()
}

/// what each member is asked to prepare for a stage: the budget split
/// evenly and rounded to whole units. zero without a budget or members.
pub fn payment_call_amount(stage: &Stage, member_count: usize) -> Money {
    if !stage.budget.is_positive() || member_count == 0 {
        return Money::ZERO;
    }
    Money::from_decimal(stage.budget.as_decimal() / Decimal::from(member_count)).round_units()
}
