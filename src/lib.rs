pub mod config;
pub mod dates;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod expenses;
pub mod interest;
pub mod ledger;
pub mod payments;
pub mod reports;
pub mod types;

// re-export key types
pub use config::LedgerConfig;
pub use dates::{days_between, elapsed_days, LedgerDate};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Activity, ActivityLog};
pub use expenses::{Expense, ExpenseBuilder};
pub use interest::{AccrualEngine, InterestCalculation, InterestCalculator};
pub use ledger::{compute_debts, compute_debts_at, compute_debts_with_config, DebtDetail, DebtLedger, DebtRecord};
pub use payments::{
    compute_loan_status, compute_loan_status_today, preview_payment, record_payment, Allocation,
    AmortizationCalculator, LoanStatus, Payment, PaymentPreview,
};
pub use reports::{
    assistant_context, net_position, payment_call_amount, personal_history, personal_summary, stage_totals,
    total_project_cost, HistoryItem, HistoryKind, NetPosition, PersonalSummary, StageTotal,
};
pub use types::{AllocationMode, ExpenseId, ExpenseStatus, PaymentId, Role, Stage, StageId, StageStatus, User, UserId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
