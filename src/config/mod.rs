use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    errors::LedgerError,
    ledger::BudgetPolicy,
};

const DEFAULT_BACKUP_RETENTION: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub budget_policy: BudgetPolicy,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            budget_policy: BudgetPolicy::default(),
            backup_retention: DEFAULT_BACKUP_RETENTION,
            data_dir: None,
        }
    }
}

impl Config {
    fn default_backup_retention() -> usize {
        DEFAULT_BACKUP_RETENTION
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        self.budget_policy
            .validate()
            .map_err(|err| LedgerError::Config(err.to_string()))?;
        if self.backup_retention == 0 {
            return Err(LedgerError::Config(
                "backup_retention must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] under the application data directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Returns the stored config, or defaults when nothing has been saved yet.
    pub fn load(&self) -> Result<Config, LedgerError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
