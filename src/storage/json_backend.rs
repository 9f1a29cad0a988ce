use chrono::Utc;
use sha2::{Digest, Sha256};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    errors::LedgerError,
    ledger::{snapshot::CURRENT_SCHEMA_VERSION, AccountSnapshot},
};

use super::{Result, StorageBackend};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const DEFAULT_RETENTION: usize = 5;

/// Stores one pretty-printed JSON file per account, with rotating backups.
///
/// Files are named by a SHA-256 digest of the account id; the id itself is
/// kept inside the file and checked on every load.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    accounts_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let accounts_dir = PathResolver::accounts_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&accounts_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            accounts_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn account_path(&self, account: &str) -> PathBuf {
        self.accounts_dir.join(format!("{}.json", file_stem(account)))
    }

    pub fn backup_path(&self, account: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(account).join(backup_name)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    fn backup_dir(&self, account: &str) -> PathBuf {
        self.backups_dir.join(file_stem(account))
    }

    fn backup_existing_file(&self, account: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(account);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_name = format!("{timestamp}.{BACKUP_EXTENSION}");
        fs::copy(path, dir.join(backup_name))?;
        self.prune_backups(account)
    }

    fn prune_backups(&self, account: &str) -> Result<()> {
        let backups = self.list_backups(account)?;
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(account, entry);
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self, account: &str) -> Result<AccountSnapshot> {
        let path = self.account_path(account);
        if !path.exists() {
            return Err(LedgerError::AccountNotFound(account.to_string()));
        }
        let snapshot = load_snapshot_from_path(&path)?;
        ensure_owner(&snapshot, account, &path)?;
        Ok(snapshot)
    }

    fn save(&self, snapshot: &AccountSnapshot) -> Result<()> {
        let path = self.account_path(snapshot.id());
        self.backup_existing_file(snapshot.id(), &path)?;
        save_snapshot_to_path(snapshot, &path)?;
        debug!(account = snapshot.id(), path = %path.display(), "snapshot saved");
        Ok(())
    }

    fn exists(&self, account: &str) -> bool {
        self.account_path(account).exists()
    }

    /// Backup file names, newest first.
    fn list_backups(&self, account: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(account);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| b.cmp(a));
        Ok(entries)
    }

    fn restore(&self, account: &str, backup_name: &str) -> Result<AccountSnapshot> {
        let backup_path = self.backup_path(account, backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::Persistence(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let snapshot = load_snapshot_from_path(&backup_path)?;
        ensure_owner(&snapshot, account, &backup_path)?;
        save_snapshot_to_path(&snapshot, &self.account_path(account))?;
        Ok(snapshot)
    }
}

pub fn save_snapshot_to_path(snapshot: &AccountSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    write_atomic(path, &json)
}

pub fn load_snapshot_from_path(path: &Path) -> Result<AccountSnapshot> {
    let data = fs::read_to_string(path)?;
    let snapshot: AccountSnapshot = serde_json::from_str(&data)?;
    if snapshot.schema_version() > CURRENT_SCHEMA_VERSION {
        warn!(
            path = %path.display(),
            found = snapshot.schema_version(),
            supported = CURRENT_SCHEMA_VERSION,
            "refusing to load newer account schema"
        );
        return Err(LedgerError::Persistence(format!(
            "account schema v{} is newer than supported v{}",
            snapshot.schema_version(),
            CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(snapshot)
}

/// Case-sensitive, collision-resistant file name for an account id.
fn file_stem(account: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn ensure_owner(snapshot: &AccountSnapshot, account: &str, path: &Path) -> Result<()> {
    if snapshot.id() == account {
        return Ok(());
    }
    warn!(
        path = %path.display(),
        requested = account,
        stored = snapshot.id(),
        "account file belongs to another id"
    );
    Err(LedgerError::Persistence(format!(
        "file `{}` holds account `{}`, not `{}`",
        path.display(),
        snapshot.id(),
        account
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::TransactionService;
    use crate::ledger::EntryInput;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn storage_with_temp_dir(retention: usize) -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(retention))
            .expect("json storage");
        (storage, temp)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let mut snapshot = AccountSnapshot::new("alice@example.com");
        TransactionService::add(&mut snapshot, EntryInput::income("Salary", 1000.0)).unwrap();
        storage.save(&snapshot).expect("save snapshot");

        let loaded = storage.load("alice@example.com").expect("load snapshot");
        assert_eq!(loaded, snapshot);
        assert!(storage.exists("alice@example.com"));
    }

    #[test]
    fn missing_account_is_reported() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let err = storage.load("nobody").unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(ref id) if id == "nobody"));
    }

    #[test]
    fn overwrites_are_backed_up_and_pruned() {
        let (storage, _guard) = storage_with_temp_dir(2);
        let mut snapshot = AccountSnapshot::new("family");
        for idx in 0..4 {
            TransactionService::add(&mut snapshot, EntryInput::income(format!("pay {idx}"), 1.0))
                .unwrap();
            storage.save(&snapshot).expect("save snapshot");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let backups = storage.list_backups("family").expect("list backups");
        assert_eq!(backups.len(), 2);
        assert!(backups[0] > backups[1], "expected newest first: {backups:?}");
    }

    #[test]
    fn restore_replaces_current_snapshot() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let mut snapshot = AccountSnapshot::new("restore-me");
        storage.save(&snapshot).unwrap();
        TransactionService::add(&mut snapshot, EntryInput::expense("Oops", 99.0)).unwrap();
        storage.save(&snapshot).unwrap();

        let backups = storage.list_backups("restore-me").unwrap();
        let restored = storage.restore("restore-me", &backups[0]).unwrap();
        assert_eq!(restored.transaction_count(), 0);
        assert_eq!(storage.load("restore-me").unwrap().transaction_count(), 0);
    }

    #[test]
    fn rejects_future_schema_versions() {
        let (_storage, guard) = storage_with_temp_dir(3);
        let path = guard.path().join("future.json");
        let mut value = serde_json::to_value(AccountSnapshot::new("future")).unwrap();
        value["schema_version"] = serde_json::json!(CURRENT_SCHEMA_VERSION + 5);
        fs::write(&path, value.to_string()).unwrap();

        let err = load_snapshot_from_path(&path).expect_err("future schema should fail");
        match err {
            LedgerError::Persistence(message) => {
                assert!(message.contains("newer"), "unexpected error: {message}");
            }
            other => panic!("expected persistence error, got {other:?}"),
        }
    }

    #[test]
    fn ids_differing_in_case_or_punctuation_get_separate_files() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let ids = ["a.b@example.com", "a_b@example.com", "A.B@Example.com", "@@@", "!!!"];
        let paths: HashSet<PathBuf> = ids.iter().map(|id| storage.account_path(id)).collect();
        assert_eq!(paths.len(), ids.len());

        for (idx, id) in ids.iter().enumerate() {
            let mut snapshot = AccountSnapshot::new(*id);
            TransactionService::add(&mut snapshot, EntryInput::income("Pay", idx as u32 + 1)).unwrap();
            storage.save(&snapshot).unwrap();
        }
        for (idx, id) in ids.iter().enumerate() {
            let loaded = storage.load(id).unwrap();
            assert_eq!(loaded.id(), *id);
            assert_eq!(loaded.stats().current_balance, Decimal::from(idx as u32 + 1));
        }
    }

    #[test]
    fn load_rejects_file_owned_by_another_account() {
        let (storage, _guard) = storage_with_temp_dir(3);
        storage.save(&AccountSnapshot::new("owner")).unwrap();
        fs::copy(storage.account_path("owner"), storage.account_path("intruder")).unwrap();

        let err = storage.load("intruder").unwrap_err();
        match err {
            LedgerError::Persistence(message) => {
                assert!(message.contains("owner"), "unexpected error: {message}");
            }
            other => panic!("expected persistence error, got {other:?}"),
        }
    }
}
