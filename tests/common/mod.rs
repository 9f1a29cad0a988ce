#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use budgetly_core::{config::ConfigManager, storage::JsonStorage, AccountManager, BudgetPolicy};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn manager_at(base: &PathBuf, policy: BudgetPolicy) -> AccountManager {
    let storage =
        JsonStorage::new(Some(base.join("data")), Some(3)).expect("create json storage backend");
    AccountManager::new(Box::new(storage), policy)
}

/// Creates isolated managers backed by unique directories for each test.
pub fn setup_test_env() -> (AccountManager, ConfigManager, PathBuf) {
    let base = temp_base();
    let manager = manager_at(&base, BudgetPolicy::default());
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (manager, config_manager, base)
}
