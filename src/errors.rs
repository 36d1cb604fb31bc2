use thiserror::Error;

use crate::decimal::Money;
use crate::types::{ExpenseId, UserId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid interest amount: {amount}")]
    InvalidInterestAmount {
        amount: Money,
    },

    #[error("no allocation for user {user_id} on expense {expense_id}")]
    AllocationNotFound {
        expense_id: ExpenseId,
        user_id: UserId,
    },

    #[error("payer {user_id} cannot repay their own share of expense {expense_id}")]
    SelfPayment {
        expense_id: ExpenseId,
        user_id: UserId,
    },

    #[error("invalid split: {message}")]
    InvalidSplit {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("malformed record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
