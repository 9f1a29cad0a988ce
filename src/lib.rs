#![doc(test(attr(deny(warnings))))]

//! Budgetly Core keeps an account's running totals and budget utilization
//! consistent with its ledger as entries, budgets, and manual figures change.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

pub use crate::core::services::{
    AccountOverview, BudgetService, ServiceError, ServiceResult, StatsAudit, StatsService,
    SummaryService, TransactionService,
};
pub use crate::core::AccountManager;
pub use errors::LedgerError;
pub use ledger::{
    AccountSnapshot, AccountStats, BudgetPolicy, BudgetRecord, BudgetStatus, EntryInput,
    EntryKind, LedgerEntry, ManualStats, RawAmount, ValidationError,
};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budgetly Core tracing initialized.");
    });
}
