use serde::{Deserialize, Serialize};

use crate::dates::LedgerDate;
use crate::decimal::Money;

/// identifier of a household member
pub type UserId = String;

/// identifier of an expense record
pub type ExpenseId = String;

/// identifier of a recorded payment
pub type PaymentId = String;

/// identifier of a construction stage
pub type StageId = String;

/// member role; only used by callers for authorization, never by the math
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    #[default]
    Viewer,
}

/// household member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar: String,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            role: Role::Viewer,
            avatar: String::new(),
        }
    }
}

/// approval state of an expense. only approved expenses create debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    /// waiting on the other members to confirm
    #[default]
    Pending,
    /// cleared by everyone, participates in the ledger
    Approved,
}

/// progress of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// a phase of the project with its own budget. expenses point at it via `stage_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub start_date: LedgerDate,
    pub end_date: LedgerDate,
    #[serde(default)]
    pub status: StageStatus,
    /// planned spend, zero when not set
    #[serde(default)]
    pub budget: Money,
    /// per-member amount members were asked to prepare, if a call is open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_call_amount: Option<Money>,
}

/// how an expense was divided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationMode {
    /// floor share per member, remainder to the payer
    Equal,
    /// explicit per-member amounts
    Custom,
}

/// look up a display name, falling back to the id
pub fn display_name<'a>(users: &'a [User], id: &'a str) -> &'a str {
    users
        .iter()
        .find(|u| u.id == id)
        .map(|u| u.name.as_str())
        .unwrap_or(id)
}
