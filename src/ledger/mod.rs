//! Account domain models: ledger entries, budgets, stats, and the snapshot that owns them.

pub mod amount;
pub mod budget;
pub mod entry;
pub mod snapshot;
pub mod stats;

pub use amount::{RawAmount, ValidationError};
pub use budget::{BudgetPolicy, BudgetRecord, BudgetStatus};
pub use entry::{EntryInput, EntryKind, LedgerEntry, ValidEntryFields};
pub use snapshot::AccountSnapshot;
pub use stats::{AccountStats, ManualStats};
