pub mod amortization;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::dates::LedgerDate;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::expenses::Expense;
use crate::types::{PaymentId, UserId};

pub use amortization::{compute_loan_status, compute_loan_status_today, AmortizationCalculator, LoanStatus};

/// one repayment against an allocation. never edited once recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    /// principal repaid
    pub amount: Money,
    /// interest repaid
    #[serde(default)]
    pub interest: Money,
    pub date: LedgerDate,
}

/// one participant's share of an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub user_id: UserId,
    /// principal owed, fixed at creation
    pub amount: Money,
    /// display only
    #[serde(default)]
    pub percentage: Decimal,
    /// cached cumulative principal paid
    #[serde(default)]
    pub paid_amount: Money,
    /// append-only payment history
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// cached `paid_amount >= amount` within tolerance
    #[serde(default)]
    pub is_paid: bool,
}

impl Allocation {
    pub fn new(user_id: UserId, amount: Money, expense_total: Money) -> Self {
        Self {
            user_id,
            amount,
            percentage: amount.percentage_of(expense_total),
            paid_amount: Money::ZERO,
            payments: Vec::new(),
            is_paid: false,
        }
    }

    /// principal repaid according to the payment history
    pub fn principal_paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn interest_paid(&self) -> Money {
        self.payments.iter().map(|p| p.interest).sum()
    }

    /// recompute the cached fields from the history
    pub fn refresh(&mut self, paid_tolerance: Money) {
        self.paid_amount = self.principal_paid();
        self.is_paid = self.paid_amount >= self.amount - paid_tolerance;
    }
}

/// record a repayment from `debtor_id` on `expense`.
///
/// The payment is appended to the debtor's history and the allocation's
/// cached totals are refreshed. Interest paid is dropped when interest is
/// disabled in `config`.
pub fn record_payment(
    expense: &mut Expense,
    debtor_id: &str,
    principal: Money,
    interest: Money,
    date: LedgerDate,
    config: &LedgerConfig,
) -> Result<Payment> {
    if !principal.is_positive() {
        return Err(LedgerError::InvalidPaymentAmount { amount: principal });
    }
    if interest.is_negative() {
        return Err(LedgerError::InvalidInterestAmount { amount: interest });
    }
    if expense.payer_id == debtor_id {
        return Err(LedgerError::SelfPayment {
            expense_id: expense.id.clone(),
            user_id: debtor_id.to_string(),
        });
    }

    let expense_id = expense.id.clone();
    let allocation = expense
        .allocation_for_mut(debtor_id)
        .ok_or_else(|| LedgerError::AllocationNotFound {
            expense_id: expense_id.clone(),
            user_id: debtor_id.to_string(),
        })?;

    let payment = Payment {
        id: Uuid::new_v4().to_string(),
        amount: principal,
        interest: if config.interest_enabled() { interest } else { Money::ZERO },
        date,
    };

    allocation.payments.push(payment.clone());
    allocation.refresh(config.settlement.paid_tolerance);

    info!(
        expense_id = %expense_id,
        debtor_id,
        amount = %payment.amount,
        paid_amount = %allocation.paid_amount,
        is_paid = allocation.is_paid,
        "payment recorded"
    );

    Ok(payment)
}

/// what a repayment would leave outstanding, for confirmation dialogs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPreview {
    pub remaining_before: Money,
    pub amount: Money,
    pub remaining_after: Money,
    pub days_since_last_event: u32,
}

/// preview paying `amount` on `payment_date` without touching the record
pub fn preview_payment(
    allocation: &Allocation,
    origination_date: LedgerDate,
    yearly_rate: Rate,
    amount: Money,
    payment_date: LedgerDate,
) -> PaymentPreview {
    let status = compute_loan_status(
        allocation.amount,
        origination_date,
        yearly_rate,
        &allocation.payments,
        payment_date,
    );
    let remaining_before = status.remaining_principal.round_units();

    PaymentPreview {
        remaining_before,
        amount,
        remaining_after: (remaining_before - amount).max(Money::ZERO),
        days_since_last_event: status.days_since_last_event,
    }
}
