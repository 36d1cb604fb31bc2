use std::collections::BTreeMap;

use hourglass_rs::SafeTimeProvider;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::LedgerConfig;
use crate::dates::LedgerDate;
use crate::decimal::{Money, Rate};
use crate::expenses::Expense;
use crate::payments::AmortizationCalculator;
use crate::types::{ExpenseId, User, UserId};

/// per-expense line behind a debt record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtDetail {
    pub expense_id: ExpenseId,
    pub description: String,
    pub date_incurred: LedgerDate,
    /// days since the last payment, or since the expense if none
    pub days_overdue: u32,
    /// remaining principal on this expense, unrounded
    pub principal: Money,
    /// remaining interest on this expense, unrounded
    pub interest: Money,
    pub interest_rate: Rate,
}

/// what one member currently owes another
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRecord {
    pub debtor_id: UserId,
    pub creditor_id: UserId,
    pub principal: Money,
    pub interest: Money,
    pub total_debt: Money,
    pub details: Vec<DebtDetail>,
}

impl DebtRecord {
    fn open(debtor_id: &str, creditor_id: &str) -> Self {
        Self {
            debtor_id: debtor_id.to_string(),
            creditor_id: creditor_id.to_string(),
            principal: Money::ZERO,
            interest: Money::ZERO,
            total_debt: Money::ZERO,
            details: Vec::new(),
        }
    }

    fn round(mut self) -> Self {
        self.principal = self.principal.round_units();
        self.interest = self.interest.round_units();
        self.total_debt = self.total_debt.round_units();
        self
    }
}

/// derive the debtor -> creditor ledger as of `target_date`, using each
/// expense's stored interest rate.
///
/// Only approved expenses count and the payer's own share is never a debt.
/// Amounts are summed unrounded and rounded once per record; records with
/// nothing outstanding are left out. Output is sorted by debtor then creditor.
pub fn compute_debts_at(expenses: &[Expense], users: &[User], target_date: LedgerDate) -> Vec<DebtRecord> {
    aggregate(expenses, users, target_date, |rate| rate)
}

/// as `compute_debts_at`, with today's date from the supplied clock
pub fn compute_debts(expenses: &[Expense], users: &[User], time_provider: &SafeTimeProvider) -> Vec<DebtRecord> {
    compute_debts_at(expenses, users, LedgerDate::today(time_provider))
}

/// as `compute_debts_at`, with interest switched on or off by `config`
pub fn compute_debts_with_config(
    expenses: &[Expense],
    users: &[User],
    config: &LedgerConfig,
    target_date: LedgerDate,
) -> Vec<DebtRecord> {
    aggregate(expenses, users, target_date, |rate| config.effective_rate(rate))
}

fn aggregate<F>(expenses: &[Expense], users: &[User], target_date: LedgerDate, rate_for: F) -> Vec<DebtRecord>
where
    F: Fn(Rate) -> Rate,
{
    let calculator = AmortizationCalculator::default();
    let mut ledger: BTreeMap<(UserId, UserId), DebtRecord> = BTreeMap::new();

    for expense in expenses.iter().filter(|e| e.is_approved()) {
        if !expense.is_balanced() {
            warn!(
                expense_id = %expense.id,
                amount = %expense.amount,
                allocated = %expense.allocated_total(),
                "allocations do not add up to the expense total"
            );
        }
        warn_unknown(users, &expense.payer_id, &expense.id);

        let rate = rate_for(expense.interest_rate);

        for allocation in expense.debtor_allocations() {
            let status = calculator.loan_status(
                allocation.amount,
                expense.date,
                rate,
                &allocation.payments,
                target_date,
            );

            if status.is_settled(rate.accrues()) {
                debug!(expense_id = %expense.id, debtor_id = %allocation.user_id, "allocation settled");
                continue;
            }
            warn_unknown(users, &allocation.user_id, &expense.id);

            let record = ledger
                .entry((allocation.user_id.clone(), expense.payer_id.clone()))
                .or_insert_with(|| DebtRecord::open(&allocation.user_id, &expense.payer_id));

            record.principal += status.remaining_principal;
            record.interest += status.remaining_interest;
            record.total_debt += status.total_remaining();
            record.details.push(DebtDetail {
                expense_id: expense.id.clone(),
                description: expense.description.clone(),
                date_incurred: expense.date,
                days_overdue: status.days_since_last_event,
                principal: status.remaining_principal,
                interest: status.remaining_interest,
                interest_rate: rate,
            });
        }
    }

    let debts: Vec<DebtRecord> = ledger
        .into_values()
        .map(DebtRecord::round)
        .filter(|record| record.total_debt.is_positive())
        .collect();

    debug!(records = debts.len(), target_date = %target_date, "ledger computed");
    debts
}

fn warn_unknown(users: &[User], user_id: &str, expense_id: &str) {
    if !users.is_empty() && !users.iter().any(|u| u.id == user_id) {
        warn!(user_id, expense_id, "expense references an unknown member");
    }
}

/// read-only view over a computed ledger
#[derive(Debug, Clone, Default)]
pub struct DebtLedger {
    records: Vec<DebtRecord>,
}

impl DebtLedger {
    pub fn new(records: Vec<DebtRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DebtRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DebtRecord> {
        self.records
    }

    /// debts where `user_id` is the debtor
    pub fn owed_by<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a DebtRecord> + 'a {
        self.records.iter().filter(move |r| r.debtor_id == user_id)
    }

    /// debts where `user_id` is the creditor
    pub fn owed_to<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a DebtRecord> + 'a {
        self.records.iter().filter(move |r| r.creditor_id == user_id)
    }

    pub fn between(&self, debtor_id: &str, creditor_id: &str) -> Option<&DebtRecord> {
        self.records
            .iter()
            .find(|r| r.debtor_id == debtor_id && r.creditor_id == creditor_id)
    }

    pub fn total_outstanding(&self) -> Money {
        self.records.iter().map(|r| r.total_debt).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<DebtRecord>> for DebtLedger {
    fn from(records: Vec<DebtRecord>) -> Self {
        Self::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::payments::{record_payment, Payment};
    use crate::types::ExpenseStatus;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(s: &str) -> LedgerDate {
        LedgerDate::parse(s).unwrap()
    }

    fn members() -> Vec<User> {
        vec![User::new("u1", "Tuan"), User::new("u2", "Tam"), User::new("u3", "Phi")]
    }

    fn split_expense(id: &str, total: i64, payer: &str, on: &str, rate: u32) -> Expense {
        let participants: Vec<UserId> = vec!["u1".into(), "u2".into(), "u3".into()];
        Expense {
            id: id.to_string(),
            stage_id: None,
            description: format!("expense {id}"),
            amount: Money::from_units(total),
            payer_id: payer.to_string(),
            date: date(on),
            interest_rate: Rate::from_percentage(rate),
            allocations: Expense::equal_split(Money::from_units(total), &participants, payer).unwrap(),
            is_custom_allocation: false,
            approved_by: participants.clone(),
            status: ExpenseStatus::Approved,
            created_at: None,
        }
    }

    fn pay(expense: &mut Expense, debtor: &str, amount: i64, on: &str) {
        record_payment(
            expense,
            debtor,
            Money::from_units(amount),
            Money::ZERO,
            date(on),
            &LedgerConfig::interest_free(),
        )
        .unwrap();
    }

    fn summary(debts: &[DebtRecord]) -> Vec<(&str, &str, Money)> {
        debts
            .iter()
            .map(|d| (d.debtor_id.as_str(), d.creditor_id.as_str(), d.total_debt))
            .collect()
    }

    #[test]
    fn test_simple_split_without_interest() {
        let expenses = vec![split_expense("c1", 300_000_000, "u1", "2024-01-01", 0)];
        let debts = compute_debts_at(&expenses, &members(), date("2024-03-01"));

        assert_eq!(
            summary(&debts),
            vec![
                ("u2", "u1", Money::from_units(100_000_000)),
                ("u3", "u1", Money::from_units(100_000_000)),
            ]
        );
        assert_eq!(debts[0].details.len(), 1);
        assert_eq!(debts[0].details[0].expense_id, "c1");
        assert_eq!(debts[0].details[0].days_overdue, 60);
        assert_eq!(debts[0].interest, Money::ZERO);
    }

    #[test]
    fn test_partial_then_full_payment() {
        let mut expense = split_expense("c1", 300_000_000, "u1", "2024-01-01", 0);

        pay(&mut expense, "u2", 40_000_000, "2024-01-15");
        let debts = compute_debts_at(std::slice::from_ref(&expense), &members(), date("2024-03-01"));
        assert_eq!(
            summary(&debts),
            vec![
                ("u2", "u1", Money::from_units(60_000_000)),
                ("u3", "u1", Money::from_units(100_000_000)),
            ]
        );
        assert_eq!(debts[0].details[0].days_overdue, 46);

        pay(&mut expense, "u2", 60_000_000, "2024-02-01");
        let debts = compute_debts_at(std::slice::from_ref(&expense), &members(), date("2024-03-01"));
        assert_eq!(summary(&debts), vec![("u3", "u1", Money::from_units(100_000_000))]);
    }

    #[test]
    fn test_payer_never_owes_themselves() {
        let expenses = vec![
            split_expense("c1", 100, "u1", "2024-01-01", 0),
            split_expense("c2", 100, "u2", "2024-01-01", 12),
            split_expense("c3", 100, "u3", "2024-01-01", 0),
        ];
        let debts = compute_debts_at(&expenses, &members(), date("2024-06-01"));

        assert_eq!(debts.len(), 6);
        assert!(debts.iter().all(|d| d.debtor_id != d.creditor_id));
    }

    #[test]
    fn test_pending_expenses_are_ignored() {
        let mut pending = split_expense("c1", 300, "u1", "2024-01-01", 0);
        pending.status = ExpenseStatus::Pending;

        let debts = compute_debts_at(&[pending], &members(), date("2024-03-01"));
        assert!(debts.is_empty());
    }

    #[test]
    fn test_overpayment_removes_record() {
        let mut expense = split_expense("c1", 300, "u1", "2024-01-01", 0);
        pay(&mut expense, "u2", 150, "2024-01-02");

        let debts = compute_debts_at(std::slice::from_ref(&expense), &members(), date("2024-03-01"));
        assert_eq!(summary(&debts), vec![("u3", "u1", Money::from_units(100))]);
    }

    #[test]
    fn test_multiple_expenses_fold_into_one_record() {
        let expenses = vec![
            split_expense("c1", 100, "u1", "2024-01-01", 0),
            split_expense("c2", 200, "u1", "2024-02-01", 0),
        ];
        let debts = compute_debts_at(&expenses, &members(), date("2024-03-01"));

        let u2 = debts.iter().find(|d| d.debtor_id == "u2").unwrap();
        // 33 + 66 for u2; the payer took the remainders
        assert_eq!(u2.principal, Money::from_units(99));
        assert_eq!(u2.details.len(), 2);
    }

    #[test]
    fn test_rounding_happens_once_per_record() {
        // three allocations each owing 0.4 round to 1 together, never 0
        let mut expenses = Vec::new();
        for i in 0..3 {
            let mut expense = split_expense(&format!("c{i}"), 3, "u1", "2024-01-01", 0);
            for allocation in expense.allocations.iter_mut() {
                if allocation.user_id == "u2" {
                    allocation.payments.push(Payment {
                        id: format!("p{i}"),
                        amount: Money::from_str_exact("0.6").unwrap(),
                        interest: Money::ZERO,
                        date: date("2024-01-02"),
                    });
                }
            }
            expenses.push(expense);
        }

        let debts = compute_debts_at(&expenses, &members(), date("2024-01-03"));
        let u2 = debts.iter().find(|d| d.debtor_id == "u2").unwrap();
        assert_eq!(u2.principal, Money::from_units(1));
        assert_eq!(u2.details[0].principal, Money::from_str_exact("0.4").unwrap());
    }

    #[test]
    fn test_interest_bearing_ledger() {
        let expenses = vec![split_expense("c1", 3_000_000, "u1", "2024-01-01", 12)];
        let debts = compute_debts_at(&expenses, &members(), date("2024-02-01"));

        let u2 = debts.iter().find(|d| d.debtor_id == "u2").unwrap();
        assert_eq!(u2.principal, Money::from_units(1_000_000));
        assert_eq!(u2.interest, Money::from_units(10_192));
        assert_eq!(u2.total_debt, Money::from_units(1_010_192));
        assert_eq!(u2.details[0].interest_rate, Rate::from_percentage(12));
    }

    #[test]
    fn test_outstanding_interest_keeps_record_alive() {
        let mut expense = split_expense("c1", 3_000_000, "u1", "2024-01-01", 12);
        pay(&mut expense, "u2", 1_000_000, "2024-02-01");

        let debts = compute_debts_at(std::slice::from_ref(&expense), &members(), date("2024-03-01"));
        let u2 = debts.iter().find(|d| d.debtor_id == "u2").unwrap();
        assert_eq!(u2.principal, Money::ZERO);
        assert_eq!(u2.interest, Money::from_units(10_192));

        // with interest switched off the same history is settled
        let config = LedgerConfig::interest_free();
        let debts = compute_debts_with_config(std::slice::from_ref(&expense), &members(), &config, date("2024-03-01"));
        assert!(debts.iter().all(|d| d.debtor_id != "u2"));
        assert!(debts.iter().all(|d| d.interest == Money::ZERO));
    }

    #[test]
    fn test_compute_debts_reads_clock() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
        ));
        let expenses = vec![split_expense("c1", 3_000_000, "u1", "2024-01-01", 12)];

        let debts = compute_debts(&expenses, &members(), &time);
        assert_eq!(debts[0].interest, Money::from_units(10_192));
    }

    #[test]
    fn test_recompute_is_stateless() {
        let expenses = vec![split_expense("c1", 300, "u1", "2024-01-01", 12)];
        let first = compute_debts_at(&expenses, &members(), date("2024-05-01"));
        let second = compute_debts_at(&expenses, &members(), date("2024-05-01"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_ledger_queries() {
        let expenses = vec![
            split_expense("c1", 300, "u1", "2024-01-01", 0),
            split_expense("c2", 600, "u2", "2024-01-01", 0),
        ];
        let ledger = DebtLedger::from(compute_debts_at(&expenses, &members(), date("2024-02-01")));

        assert_eq!(ledger.owed_by("u3").count(), 2);
        assert_eq!(ledger.owed_to("u1").count(), 2);
        assert_eq!(ledger.between("u1", "u2").unwrap().total_debt, Money::from_units(200));
        assert!(ledger.between("u2", "u2").is_none());
        assert_eq!(ledger.total_outstanding(), Money::from_units(600));
    }
}
