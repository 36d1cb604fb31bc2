pub mod accrual;

use crate::dates::LedgerDate;
use crate::decimal::{Money, Rate};

pub use accrual::{AccrualEngine, YEAR_BASIS_DAYS};

/// interest accrued over one segment between two ledger events
#[derive(Debug, Clone, PartialEq)]
pub struct InterestCalculation {
    pub interest_amount: Money,
    pub days: u32,
    pub principal_base: Money,
    pub yearly_rate: Rate,
    pub start: LedgerDate,
    pub end: LedgerDate,
}

impl InterestCalculation {
    pub fn is_zero(&self) -> bool {
        self.interest_amount.is_zero()
    }
}

/// trait for interest calculations
pub trait InterestCalculator {
    fn calculate_interest(
        &self,
        principal: Money,
        rate: Rate,
        start: LedgerDate,
        end: LedgerDate,
    ) -> InterestCalculation;
}
