use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerConfig {
    pub interest: InterestConfig,
    pub settlement: SettlementConfig,
}

/// interest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterestConfig {
    /// when false every expense is treated as carrying a zero rate
    pub enabled: bool,
    /// rate suggested for new expenses
    pub default_yearly_rate: Rate,
}

/// settlement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettlementConfig {
    /// how close `paid_amount` must come to `amount` for the paid badge
    pub paid_tolerance: Money,
}

impl Default for InterestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_yearly_rate: Rate::ZERO,
        }
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            paid_tolerance: Money::from_units(100),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::interest_free()
    }
}

impl LedgerConfig {
    /// principal-only tracking, the shipped household setup
    pub fn interest_free() -> Self {
        Self {
            interest: InterestConfig::default(),
            settlement: SettlementConfig::default(),
        }
    }

    /// interest accrues at each expense's own rate
    pub fn interest_bearing(default_yearly_rate: Rate) -> Self {
        Self {
            interest: InterestConfig {
                enabled: true,
                default_yearly_rate,
            },
            settlement: SettlementConfig::default(),
        }
    }

    pub fn with_paid_tolerance(mut self, tolerance: Money) -> Self {
        self.settlement.paid_tolerance = tolerance;
        self
    }

    /// load from JSON and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.settlement.paid_tolerance.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("paid tolerance must not be negative, got {}", self.settlement.paid_tolerance),
            });
        }
        if self.interest.default_yearly_rate.as_percentage() < Decimal::ZERO {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("default rate must not be negative, got {}", self.interest.default_yearly_rate),
            });
        }
        Ok(())
    }

    /// rate actually fed to the calculator for an expense
    pub fn effective_rate(&self, expense_rate: Rate) -> Rate {
        if self.interest.enabled {
            expense_rate
        } else {
            Rate::ZERO
        }
    }

    /// rate new expenses start with
    pub fn default_rate(&self) -> Rate {
        self.effective_rate(self.interest.default_yearly_rate)
    }

    pub fn interest_enabled(&self) -> bool {
        self.interest.enabled
    }
}
