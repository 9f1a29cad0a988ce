//! Aggregation engine: every operation that moves an account's running totals.
//!
//! Each operation validates its input before touching the snapshot, so a
//! returned error always leaves the snapshot exactly as it was.

pub mod budget_service;
pub mod stats_service;
pub mod summary_service;
pub mod transaction_service;

pub use budget_service::BudgetService;
pub use stats_service::{StatsAudit, StatsService};
pub use summary_service::{AccountOverview, SummaryService};
pub use transaction_service::TransactionService;

use uuid::Uuid;

use crate::errors::LedgerError;
use crate::ledger::ValidationError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Transaction not found: {0}")]
    EntryNotFound(Uuid),
    #[error("Budget not found: {0}")]
    BudgetNotFound(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::EntryNotFound(_)
                | ServiceError::BudgetNotFound(_)
                | ServiceError::Ledger(LedgerError::AccountNotFound(_))
        )
    }
}
