pub mod json_backend;

use crate::{errors::LedgerError, ledger::AccountSnapshot};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends capable of storing account snapshots.
///
/// `save` must be atomic: after an error the previously stored snapshot is
/// still the one returned by `load`.
pub trait StorageBackend: Send + Sync {
    fn load(&self, account: &str) -> Result<AccountSnapshot>;
    fn save(&self, snapshot: &AccountSnapshot) -> Result<()>;
    fn exists(&self, account: &str) -> bool;
    fn list_backups(&self, account: &str) -> Result<Vec<String>>;
    fn restore(&self, account: &str, backup_name: &str) -> Result<AccountSnapshot>;
}

pub use json_backend::JsonStorage;
