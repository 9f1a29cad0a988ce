use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::core::services::{BudgetService, ServiceResult, StatsService, TransactionService};
use crate::errors::LedgerError;
use crate::ledger::{AccountSnapshot, BudgetPolicy, EntryInput, LedgerEntry, ManualStats, RawAmount};
use crate::storage::{JsonStorage, StorageBackend};

/// Facade that serializes mutations per account and persists every result.
///
/// Each mutation runs under the account's lock: load the current snapshot,
/// apply the engine operation to a copy, save the copy, then publish it. A
/// failing operation or save leaves both the stored and the cached snapshot
/// untouched.
///
/// Lock entries live only while some caller holds or waits on them.
pub struct AccountManager {
    storage: Box<dyn StorageBackend>,
    policy: BudgetPolicy,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    current: Mutex<HashMap<String, AccountSnapshot>>,
}

impl AccountManager {
    pub fn new(storage: Box<dyn StorageBackend>, policy: BudgetPolicy) -> Self {
        Self {
            storage,
            policy,
            locks: Mutex::new(HashMap::new()),
            current: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a manager backed by [`JsonStorage`] using the configured directory and policy.
    pub fn from_config(config: &Config) -> Result<Self, LedgerError> {
        config.validate()?;
        let storage = JsonStorage::new(config.data_dir.clone(), Some(config.backup_retention))?;
        Ok(Self::new(Box::new(storage), config.budget_policy))
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn policy(&self) -> &BudgetPolicy {
        &self.policy
    }

    /// Returns the account's snapshot, creating and persisting an empty one if needed.
    pub fn open_or_create(&self, account: &str) -> ServiceResult<AccountSnapshot> {
        self.with_account_lock(account, || {
            if let Some(snapshot) = self.cached(account) {
                return Ok(snapshot);
            }
            let snapshot = if self.storage.exists(account) {
                self.storage.load(account)?
            } else {
                let snapshot = AccountSnapshot::new(account);
                self.storage.save(&snapshot)?;
                info!(account, "created account snapshot");
                snapshot
            };
            self.publish(snapshot.clone());
            Ok(snapshot)
        })
    }

    /// Returns the latest published snapshot for `account`.
    pub fn snapshot(&self, account: &str) -> ServiceResult<AccountSnapshot> {
        self.with_account_lock(account, || self.load_current(account))
    }

    /// Runs `op` against a copy of the account and persists the result.
    pub fn mutate<T, F>(&self, account: &str, op: F) -> ServiceResult<(T, AccountSnapshot)>
    where
        F: FnOnce(&mut AccountSnapshot, &BudgetPolicy) -> ServiceResult<T>,
    {
        self.commit(account, |snapshot, policy| {
            op(snapshot, policy).map(|value| (value, true))
        })
    }

    pub fn add_entry(&self, account: &str, input: EntryInput) -> ServiceResult<(Uuid, AccountSnapshot)> {
        self.mutate(account, |snapshot, _| TransactionService::add(snapshot, input))
    }

    pub fn edit_entry(&self, account: &str, id: Uuid, input: EntryInput) -> ServiceResult<AccountSnapshot> {
        self.mutate(account, |snapshot, _| TransactionService::edit(snapshot, id, input))
            .map(|(_, snapshot)| snapshot)
    }

    pub fn delete_entry(&self, account: &str, id: Uuid) -> ServiceResult<(LedgerEntry, AccountSnapshot)> {
        self.mutate(account, |snapshot, _| TransactionService::remove(snapshot, id))
    }

    pub fn set_budget(
        &self,
        account: &str,
        category: &str,
        limit: impl Into<RawAmount>,
    ) -> ServiceResult<AccountSnapshot> {
        let limit = limit.into();
        self.mutate(account, |snapshot, policy| {
            BudgetService::set(snapshot, category, limit, policy).map(|_| ())
        })
        .map(|(_, snapshot)| snapshot)
    }

    /// Removing an absent category succeeds and leaves storage untouched.
    pub fn delete_budget(&self, account: &str, category: &str) -> ServiceResult<AccountSnapshot> {
        self.commit(account, |snapshot, _| {
            let removed = BudgetService::remove(snapshot, category);
            Ok(((), removed.is_some()))
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn record_spending(
        &self,
        account: &str,
        category: &str,
        spent: impl Into<RawAmount>,
    ) -> ServiceResult<AccountSnapshot> {
        let spent = spent.into();
        self.mutate(account, |snapshot, policy| {
            BudgetService::record_spending(snapshot, category, spent, policy).map(|_| ())
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn set_manual_stats(&self, account: &str, patch: ManualStats) -> ServiceResult<AccountSnapshot> {
        self.mutate(account, |snapshot, _| {
            StatsService::set_manual(snapshot, patch);
            Ok(())
        })
        .map(|(_, snapshot)| snapshot)
    }

    /// Like [`Self::mutate`], but `op` also reports whether it changed anything.
    /// Unchanged drafts are neither saved nor published.
    fn commit<T, F>(&self, account: &str, op: F) -> ServiceResult<(T, AccountSnapshot)>
    where
        F: FnOnce(&mut AccountSnapshot, &BudgetPolicy) -> ServiceResult<(T, bool)>,
    {
        self.with_account_lock(account, || {
            let mut draft = self.load_current(account)?;
            let (value, changed) = op(&mut draft, &self.policy)?;
            if changed {
                self.storage.save(&draft)?;
                self.publish(draft.clone());
                debug!(
                    account,
                    balance = %draft.stats().current_balance,
                    spending = %draft.stats().monthly_spending,
                    "account mutation committed"
                );
            }
            Ok((value, draft))
        })
    }

    fn with_account_lock<R>(&self, account: &str, f: impl FnOnce() -> R) -> R {
        let lock = self.account_lock(account);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release_lock(account, lock);
        result
    }

    fn account_lock(&self, account: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(account.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the registry entry once only the registry and `lock` reference it.
    /// Clones are handed out under the registry lock, so the count is stable here.
    fn release_lock(&self, account: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = locks
            .get(account)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(account);
        }
    }

    fn cached(&self, account: &str) -> Option<AccountSnapshot> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account)
            .cloned()
    }

    fn load_current(&self, account: &str) -> ServiceResult<AccountSnapshot> {
        if let Some(snapshot) = self.cached(account) {
            return Ok(snapshot);
        }
        let snapshot = self.storage.load(account)?;
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    fn publish(&self, snapshot: AccountSnapshot) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(snapshot.id().to_string(), snapshot);
    }
}
