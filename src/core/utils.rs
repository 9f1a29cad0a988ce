use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::LedgerError;

const DEFAULT_DIR_NAME: &str = ".budgetly";
const HOME_ENV: &str = "BUDGETLY_HOME";
const ACCOUNTS_DIR: &str = "accounts";
const BACKUP_DIR: &str = "backups";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

/// Resolves the on-disk layout under the application data directory.
pub struct PathResolver;

impl PathResolver {
    /// Returns the application data directory, defaulting to `~/.budgetly`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn accounts_dir_in(base: &Path) -> PathBuf {
        base.join(ACCOUNTS_DIR)
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join(BACKUP_DIR)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<(), LedgerError> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Sibling path used for write-then-rename saves.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` to a temporary sibling and renames it over `path`.
pub fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, data.as_bytes())?;
    fs::rename(&tmp, path)?;
    Ok(())
}
