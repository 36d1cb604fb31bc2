use serde::{Deserialize, Serialize};

use crate::dates::LedgerDate;
use crate::decimal::Money;
use crate::expenses::Expense;
use crate::types::{ExpenseId, PaymentId, StageId, UserId};

/// one line of the household activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    /// a member paid for an expense
    #[serde(rename_all = "camelCase")]
    Spend {
        expense_id: ExpenseId,
        payer_id: UserId,
        amount: Money,
        description: String,
        stage_id: Option<StageId>,
        date: LedgerDate,
        /// epoch millis the spend was recorded
        occurred_at: i64,
    },
    /// a member repaid their share to the payer
    #[serde(rename_all = "camelCase")]
    Repay {
        expense_id: ExpenseId,
        payment_id: PaymentId,
        debtor_id: UserId,
        creditor_id: UserId,
        amount: Money,
        description: String,
        date: LedgerDate,
        /// end of the payment day, so it follows same-day spending
        occurred_at: i64,
    },
}

impl Activity {
    pub fn date(&self) -> LedgerDate {
        match self {
            Activity::Spend { date, .. } | Activity::Repay { date, .. } => *date,
        }
    }

    pub fn amount(&self) -> Money {
        match self {
            Activity::Spend { amount, .. } | Activity::Repay { amount, .. } => *amount,
        }
    }

    /// member who moved the money
    pub fn actor_id(&self) -> &str {
        match self {
            Activity::Spend { payer_id, .. } => payer_id,
            Activity::Repay { debtor_id, .. } => debtor_id,
        }
    }

    pub fn occurred_at(&self) -> i64 {
        match self {
            Activity::Spend { occurred_at, .. } | Activity::Repay { occurred_at, .. } => *occurred_at,
        }
    }
}

/// activity collected from a snapshot of expenses
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Vec<Activity>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// every spend and every repayment, pending expenses included, newest first
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let mut log = Self::new();
        for expense in expenses {
            log.record_expense(expense);
        }
        log
    }

    pub fn record_expense(&mut self, expense: &Expense) {
        let occurred_at = expense.recorded_at();
        let spent_on = LedgerDate::from_timestamp_millis(occurred_at).unwrap_or(expense.date);

        self.push(Activity::Spend {
            expense_id: expense.id.clone(),
            payer_id: expense.payer_id.clone(),
            amount: expense.amount,
            description: expense.description.clone(),
            stage_id: expense.stage_id.clone(),
            date: spent_on,
            occurred_at,
        });

        for allocation in &expense.allocations {
            for payment in &allocation.payments {
                self.push(Activity::Repay {
                    expense_id: expense.id.clone(),
                    payment_id: payment.id.clone(),
                    debtor_id: allocation.user_id.clone(),
                    creditor_id: expense.payer_id.clone(),
                    amount: payment.amount,
                    description: expense.description.clone(),
                    date: payment.date,
                    occurred_at: payment.date.end_of_day_millis(),
                });
            }
        }
    }

    fn push(&mut self, activity: Activity) {
        let key = activity.occurred_at();
        // newest first; equal stamps keep insertion order
        let at = self.entries.partition_point(|existing| existing.occurred_at() >= key);
        self.entries.insert(at, activity);
    }

    pub fn entries(&self) -> &[Activity] {
        &self.entries
    }

    pub fn take_entries(&mut self) -> Vec<Activity> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
