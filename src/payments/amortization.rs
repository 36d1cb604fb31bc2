use hourglass_rs::SafeTimeProvider;
use serde::Serialize;

use crate::dates::{elapsed_days, LedgerDate};
use crate::decimal::{Money, Rate};
use crate::interest::{AccrualEngine, InterestCalculation, InterestCalculator};
use crate::payments::Payment;

/// balance of one allocation as of a target date
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanStatus {
    /// negative when overpaid
    pub remaining_principal: Money,
    /// accrued minus paid; negative means an interest credit
    pub remaining_interest: Money,
    pub total_accrued_interest: Money,
    pub total_paid_interest: Money,
    /// days from the last payment (or origination) to the target date
    pub days_since_last_event: u32,
}

impl LoanStatus {
    /// principal repaid in full, irrespective of interest
    pub fn principal_settled(&self) -> bool {
        !self.remaining_principal.is_positive()
    }

    /// settled for ledger purposes. interest only counts while it is active
    pub fn is_settled(&self, interest_active: bool) -> bool {
        self.principal_settled() && (!interest_active || !self.remaining_interest.is_positive())
    }

    pub fn total_remaining(&self) -> Money {
        self.remaining_principal + self.remaining_interest
    }
}

/// segmented simple-interest calculator over a payment history
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationCalculator {
    engine: AccrualEngine,
}

impl AmortizationCalculator {
    pub fn new(engine: AccrualEngine) -> Self {
        Self { engine }
    }

    /// walk the payment history in date order, accruing interest on the
    /// outstanding principal between consecutive events, then up to `target_date`.
    pub fn loan_status(
        &self,
        initial_principal: Money,
        origination_date: LedgerDate,
        yearly_rate: Rate,
        payments: &[Payment],
        target_date: LedgerDate,
    ) -> LoanStatus {
        let (status, _) = self.walk(initial_principal, origination_date, yearly_rate, payments, target_date);
        status
    }

    /// like `loan_status`, also returning every accrual segment
    pub fn segments(
        &self,
        initial_principal: Money,
        origination_date: LedgerDate,
        yearly_rate: Rate,
        payments: &[Payment],
        target_date: LedgerDate,
    ) -> Vec<InterestCalculation> {
        let (_, segments) = self.walk(initial_principal, origination_date, yearly_rate, payments, target_date);
        segments
    }

    fn walk(
        &self,
        initial_principal: Money,
        origination_date: LedgerDate,
        yearly_rate: Rate,
        payments: &[Payment],
        target_date: LedgerDate,
    ) -> (LoanStatus, Vec<InterestCalculation>) {
        // stored order is not trusted; stable sort keeps same-day entries as given
        let mut ordered: Vec<&Payment> = payments.iter().collect();
        ordered.sort_by_key(|p| p.date);

        let mut current_principal = initial_principal;
        let mut total_accrued_interest = Money::ZERO;
        let mut total_paid_interest = Money::ZERO;
        let mut cursor = origination_date;
        let mut segments = Vec::with_capacity(ordered.len() + 1);

        for payment in ordered {
            let segment = self.engine.calculate_interest(current_principal, yearly_rate, cursor, payment.date);
            total_accrued_interest += segment.interest_amount;
            segments.push(segment);

            current_principal -= payment.amount;
            total_paid_interest += payment.interest;
            cursor = payment.date;
        }

        let tail = self.engine.calculate_interest(current_principal, yearly_rate, cursor, target_date);
        total_accrued_interest += tail.interest_amount;
        segments.push(tail);

        let status = LoanStatus {
            remaining_principal: current_principal,
            remaining_interest: total_accrued_interest - total_paid_interest,
            total_accrued_interest,
            total_paid_interest,
            days_since_last_event: elapsed_days(cursor, target_date),
        };
        (status, segments)
    }
}

/// balance of a single allocation as of `target_date`
pub fn compute_loan_status(
    initial_principal: Money,
    origination_date: LedgerDate,
    yearly_rate: Rate,
    payments: &[Payment],
    target_date: LedgerDate,
) -> LoanStatus {
    AmortizationCalculator::default().loan_status(
        initial_principal,
        origination_date,
        yearly_rate,
        payments,
        target_date,
    )
}

/// balance as of today on the supplied clock
pub fn compute_loan_status_today(
    initial_principal: Money,
    origination_date: LedgerDate,
    yearly_rate: Rate,
    payments: &[Payment],
    time_provider: &SafeTimeProvider,
) -> LoanStatus {
    compute_loan_status(
        initial_principal,
        origination_date,
        yearly_rate,
        payments,
        LedgerDate::today(time_provider),
    )
}
