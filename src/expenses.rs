use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::dates::LedgerDate;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::payments::Allocation;
use crate::types::{AllocationMode, ExpenseId, ExpenseStatus, StageId, UserId};

/// a shared cost paid by one member and allocated across participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<StageId>,
    pub description: String,
    /// total cost, expected to equal the sum of allocation amounts
    pub amount: Money,
    pub payer_id: UserId,
    /// day the cost was incurred; interest accrues from here
    pub date: LedgerDate,
    /// percent per year, specific to this expense
    #[serde(default)]
    pub interest_rate: Rate,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
    #[serde(default)]
    pub is_custom_allocation: bool,
    #[serde(default)]
    pub approved_by: Vec<UserId>,
    #[serde(default)]
    pub status: ExpenseStatus,
    /// creation time in epoch millis, audit only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl Expense {
    pub fn builder() -> ExpenseBuilder {
        ExpenseBuilder::new()
    }

    pub fn is_approved(&self) -> bool {
        self.status == ExpenseStatus::Approved
    }

    /// creation stamp in epoch millis, or the start of `date` when unknown
    pub fn recorded_at(&self) -> i64 {
        self.created_at.unwrap_or_else(|| self.date.start_of_day_millis())
    }

    pub fn allocation_for(&self, user_id: &str) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.user_id == user_id)
    }

    pub fn allocation_for_mut(&mut self, user_id: &str) -> Option<&mut Allocation> {
        self.allocations.iter_mut().find(|a| a.user_id == user_id)
    }

    /// allocations that represent debt to the payer
    pub fn debtor_allocations(&self) -> impl Iterator<Item = &Allocation> {
        self.allocations.iter().filter(move |a| a.user_id != self.payer_id)
    }

    pub fn allocated_total(&self) -> Money {
        self.allocations.iter().map(|a| a.amount).sum()
    }

    /// whether the stored allocations add up to the total
    pub fn is_balanced(&self) -> bool {
        self.allocated_total() == self.amount
    }

    /// split `total` evenly: everyone gets the floor share and the payer
    /// absorbs the remainder, so the shares always add up to `total`.
    pub fn equal_split(total: Money, participants: &[UserId], payer_id: &str) -> Result<Vec<Allocation>> {
        if participants.is_empty() {
            return Err(LedgerError::InvalidSplit {
                message: "no participants".to_string(),
            });
        }
        if total.is_negative() {
            return Err(LedgerError::InvalidSplit {
                message: format!("negative total {total}"),
            });
        }
        if !participants.iter().any(|p| p == payer_id) {
            return Err(LedgerError::InvalidSplit {
                message: format!("payer {payer_id} is not a participant"),
            });
        }

        let count = u32::try_from(participants.len()).map_err(|_| LedgerError::InvalidSplit {
            message: "too many participants".to_string(),
        })?;
        let base_share = total.floor_div(count);
        let remainder = total - base_share * rust_decimal::Decimal::from(count);

        Ok(participants
            .iter()
            .map(|user_id| {
                let share = if user_id == payer_id {
                    base_share + remainder
                } else {
                    base_share
                };
                Allocation::new(user_id.clone(), share, total)
            })
            .collect())
    }

    /// allocations from explicit amounts. the sum is not checked against
    /// `total`; that is the submitter's responsibility.
    pub fn custom_split(total: Money, amounts: &[(UserId, Money)]) -> Result<Vec<Allocation>> {
        if let Some((user_id, amount)) = amounts.iter().find(|(_, amount)| amount.is_negative()) {
            return Err(LedgerError::InvalidSplit {
                message: format!("negative share {amount} for {user_id}"),
            });
        }

        Ok(amounts
            .iter()
            .map(|(user_id, amount)| Allocation::new(user_id.clone(), *amount, total))
            .collect())
    }
}

/// builder for new expenses
pub struct ExpenseBuilder {
    id: Option<ExpenseId>,
    stage_id: Option<StageId>,
    description: Option<String>,
    amount: Option<Money>,
    payer_id: Option<UserId>,
    date: Option<LedgerDate>,
    interest_rate: Rate,
    mode: AllocationMode,
    participants: Vec<UserId>,
    custom_amounts: Vec<(UserId, Money)>,
    status: ExpenseStatus,
}

impl ExpenseBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            stage_id: None,
            description: None,
            amount: None,
            payer_id: None,
            date: None,
            interest_rate: Rate::ZERO,
            mode: AllocationMode::Equal,
            participants: Vec::new(),
            custom_amounts: Vec::new(),
            status: ExpenseStatus::Pending,
        }
    }

    pub fn id(mut self, id: impl Into<ExpenseId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn stage(mut self, stage_id: impl Into<StageId>) -> Self {
        self.stage_id = Some(stage_id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn payer(mut self, payer_id: impl Into<UserId>) -> Self {
        self.payer_id = Some(payer_id.into());
        self
    }

    pub fn date(mut self, date: LedgerDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.interest_rate = rate;
        self
    }

    /// take the household's default rate, zero when interest is off
    pub fn config(mut self, config: &LedgerConfig) -> Self {
        self.interest_rate = config.default_rate();
        self
    }

    /// split evenly among these members
    pub fn split_equally<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UserId>,
    {
        self.mode = AllocationMode::Equal;
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }

    /// explicit per-member shares
    pub fn split_custom(mut self, amounts: Vec<(UserId, Money)>) -> Self {
        self.mode = AllocationMode::Custom;
        self.custom_amounts = amounts;
        self
    }

    /// mark as already through the approval gate
    pub fn approved(mut self) -> Self {
        self.status = ExpenseStatus::Approved;
        self
    }

    /// build, defaulting the date to today on the system clock
    pub fn build(self) -> Result<Expense> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.build_with_time(&time)
    }

    /// build with explicit time provider for the default date and audit stamp
    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<Expense> {
        let description = self.description.ok_or_else(|| LedgerError::InvalidConfiguration {
            message: "expense description is required".to_string(),
        })?;
        let amount = self.amount.ok_or_else(|| LedgerError::InvalidConfiguration {
            message: "expense amount is required".to_string(),
        })?;
        let payer_id = self.payer_id.ok_or_else(|| LedgerError::InvalidConfiguration {
            message: "expense payer is required".to_string(),
        })?;

        let allocations = match self.mode {
            AllocationMode::Equal => Expense::equal_split(amount, &self.participants, &payer_id)?,
            AllocationMode::Custom => Expense::custom_split(amount, &self.custom_amounts)?,
        };

        let now = time_provider.now();
        // the payer implicitly approves their own submission
        let approved_by = vec![payer_id.clone()];

        Ok(Expense {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            stage_id: self.stage_id,
            description,
            amount,
            payer_id,
            date: self.date.unwrap_or_else(|| LedgerDate::from_datetime(now)),
            interest_rate: self.interest_rate,
            allocations,
            is_custom_allocation: self.mode == AllocationMode::Custom,
            approved_by,
            status: self.status,
            created_at: Some(now.timestamp_millis()),
        })
    }
}

impl Default for ExpenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn users(ids: &[&str]) -> Vec<UserId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_even_split_has_no_remainder() {
        let allocations = Expense::equal_split(
            Money::from_units(300_000_000),
            &users(&["u1", "u2", "u3"]),
            "u1",
        )
        .unwrap();

        assert_eq!(allocations.len(), 3);
        for allocation in &allocations {
            assert_eq!(allocation.amount, Money::from_units(100_000_000));
        }
    }

    #[test]
    fn test_remainder_goes_to_payer() {
        let allocations = Expense::equal_split(Money::from_units(100), &users(&["u1", "u2", "u3"]), "u2").unwrap();

        assert_eq!(allocations[0].amount, Money::from_units(33));
        assert_eq!(allocations[1].amount, Money::from_units(34));
        assert_eq!(allocations[2].amount, Money::from_units(33));
    }

    #[test]
    fn test_split_always_sums_to_total() {
        for total in [0_i64, 1, 2, 7, 99, 100, 101, 1_000_003, 299_999_999] {
            for n in 1..=7 {
                let participants: Vec<UserId> = (0..n).map(|i| format!("u{i}")).collect();
                let allocations = Expense::equal_split(Money::from_units(total), &participants, "u0").unwrap();
                let sum: Money = allocations.iter().map(|a| a.amount).sum();
                assert_eq!(sum, Money::from_units(total), "total {total} across {n}");

                let base = total / n;
                for allocation in &allocations[1..] {
                    assert_eq!(allocation.amount, Money::from_units(base));
                }
                assert_eq!(allocations[0].amount, Money::from_units(total - base * (n - 1)));
            }
        }
    }

    #[test]
    fn test_split_rejects_bad_input() {
        assert!(Expense::equal_split(Money::from_units(10), &[], "u1").is_err());
        assert!(Expense::equal_split(Money::from_units(10), &users(&["u2"]), "u1").is_err());
        assert!(Expense::equal_split(Money::from_units(-10), &users(&["u1"]), "u1").is_err());
    }

    #[test]
    fn test_custom_split_percentages() {
        let allocations = Expense::custom_split(
            Money::from_units(200),
            &[("u1".to_string(), Money::from_units(150)), ("u2".to_string(), Money::from_units(50))],
        )
        .unwrap();

        assert_eq!(allocations[0].percentage, dec!(75));
        assert_eq!(allocations[1].percentage, dec!(25));
        assert!(Expense::custom_split(Money::from_units(10), &[("u1".to_string(), Money::from_units(-1))]).is_err());
    }

    #[test]
    fn test_builder() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
        ));

        let expense = Expense::builder()
            .id("c1")
            .description("Cement")
            .amount(Money::from_units(100))
            .payer("u1")
            .split_equally(["u1", "u2", "u3"])
            .approved()
            .build_with_time(&time)
            .unwrap();

        assert_eq!(expense.date, LedgerDate::from_ymd(2024, 3, 5).unwrap());
        assert!(expense.is_approved());
        assert!(expense.is_balanced());
        assert!(!expense.is_custom_allocation);
        assert_eq!(expense.approved_by, vec!["u1".to_string()]);
        assert_eq!(expense.allocation_for("u1").unwrap().amount, Money::from_units(34));
        assert_eq!(expense.debtor_allocations().count(), 2);

        let missing = Expense::builder().description("x").payer("u1").build_with_time(&time);
        assert!(missing.is_err());
    }

    #[test]
    fn test_builder_takes_rate_from_config() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
        ));
        let build = |config: &LedgerConfig| {
            Expense::builder()
                .description("Steel")
                .amount(Money::from_units(90))
                .payer("u1")
                .split_equally(["u1", "u2"])
                .config(config)
                .build_with_time(&time)
                .unwrap()
        };

        let bearing = build(&LedgerConfig::interest_bearing(Rate::from_percentage(12)));
        assert_eq!(bearing.interest_rate, Rate::from_percentage(12));
        assert_eq!(bearing.recorded_at(), time.now().timestamp_millis());

        let free = build(&LedgerConfig::interest_free());
        assert_eq!(free.interest_rate, Rate::ZERO);
    }

    #[test]
    fn test_recorded_at_falls_back_to_date() {
        let mut expense: Expense = serde_json::from_str(
            r#"{"id": "c9", "description": "Sand", "amount": 10, "payerId": "u1", "date": "2024-01-02"}"#,
        )
        .unwrap();
        // 2024-01-02T00:00:00Z
        assert_eq!(expense.recorded_at(), 1_704_153_600_000);

        expense.created_at = Some(1_704_200_000_000);
        assert_eq!(expense.recorded_at(), 1_704_200_000_000);
    }

    #[test]
    fn test_deserialize_stored_record() {
        let json = r#"{
            "id": "c1700000000000",
            "stageId": "s1",
            "description": "Roof tiles",
            "amount": 300000000,
            "payerId": "u1",
            "date": "2024-01-10",
            "interestRate": 0,
            "allocations": [
                {"userId": "u1", "amount": 100000000, "percentage": 33.33, "paidAmount": 0, "payments": [], "isPaid": false},
                {"userId": "u2", "amount": 100000000, "percentage": 33.33, "paidAmount": 0, "payments": [], "isPaid": false},
                {"userId": "u3", "amount": 100000000, "percentage": 33.33, "paidAmount": 0, "isPaid": false}
            ],
            "isCustomAllocation": false,
            "approvedBy": ["u1", "u2", "u3"],
            "status": "APPROVED",
            "createdAt": 1704844800000
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();
        assert!(expense.is_approved());
        assert!(expense.is_balanced());
        assert_eq!(expense.date, LedgerDate::from_ymd(2024, 1, 10).unwrap());
        assert!(expense.allocation_for("u3").unwrap().payments.is_empty());
    }
}
