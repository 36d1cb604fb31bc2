use rust_decimal::Decimal;

use crate::dates::{elapsed_days, LedgerDate};
use crate::decimal::{Money, Rate};
use crate::interest::{InterestCalculation, InterestCalculator};

/// actual days / 365, leap years included
pub const YEAR_BASIS_DAYS: u32 = 365;

/// engine for accruing simple interest over dated segments
#[derive(Debug, Clone, Copy, Default)]
pub struct AccrualEngine;

impl AccrualEngine {
    pub fn new() -> Self {
        Self
    }

    /// interest for `days` on `principal`, rounded to whole units.
    ///
    /// Nothing accrues on a zero or negative principal, for zero days, or at
    /// a zero or negative rate.
    pub fn segment_interest(&self, principal: Money, yearly_rate: Rate, days: u32) -> Money {
        if days == 0 || !principal.is_positive() || !yearly_rate.accrues() {
            return Money::ZERO;
        }

        // multiply before dividing so whole-unit inputs stay exact as long as possible
        let numerator = principal.as_decimal() * yearly_rate.as_percentage() * Decimal::from(days);
        let denominator = Decimal::ONE_HUNDRED * Decimal::from(YEAR_BASIS_DAYS);
        Money::from_decimal(numerator / denominator).round_units()
    }
}

impl InterestCalculator for AccrualEngine {
    fn calculate_interest(
        &self,
        principal: Money,
        rate: Rate,
        start: LedgerDate,
        end: LedgerDate,
    ) -> InterestCalculation {
        let days = elapsed_days(start, end);

        InterestCalculation {
            interest_amount: self.segment_interest(principal, rate, days),
            days,
            principal_base: principal,
            yearly_rate: rate,
            start,
            end,
        }
    }
}
