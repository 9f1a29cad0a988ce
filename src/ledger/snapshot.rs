use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{budget::BudgetRecord, entry::LedgerEntry, stats::AccountStats};

pub(crate) const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Full consistent state of one account: stats, entries, and budgets.
///
/// Fields are private so the only way to move the running totals is through
/// the services in [`crate::core::services`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSnapshot {
    id: String,
    #[serde(default)]
    stats: AccountStats,
    #[serde(default)]
    transactions: Vec<LedgerEntry>,
    #[serde(default)]
    budgets: BTreeMap<String, BudgetRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default = "AccountSnapshot::schema_version_default")]
    schema_version: u8,
}

impl AccountSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            stats: AccountStats::default(),
            transactions: Vec::new(),
            budgets: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stats(&self) -> &AccountStats {
        &self.stats
    }

    /// Entries in insertion order.
    pub fn transactions(&self) -> &[LedgerEntry] {
        &self.transactions
    }

    /// Up to `limit` entries, most recently inserted first.
    pub fn recent_transactions(&self, limit: usize) -> Vec<&LedgerEntry> {
        self.transactions.iter().rev().take(limit).collect()
    }

    pub fn transaction(&self, id: Uuid) -> Option<&LedgerEntry> {
        self.transactions.iter().find(|entry| entry.id == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Budget records ordered by category.
    pub fn budgets(&self) -> impl Iterator<Item = &BudgetRecord> {
        self.budgets.values()
    }

    pub fn budget(&self, category: &str) -> Option<&BudgetRecord> {
        self.budgets.get(category)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn schema_version(&self) -> u8 {
        self.schema_version
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub(crate) fn stats_mut(&mut self) -> &mut AccountStats {
        &mut self.stats
    }

    pub(crate) fn push_transaction(&mut self, entry: LedgerEntry) {
        self.stats.apply(&entry);
        self.transactions.push(entry);
    }

    pub(crate) fn transaction_index(&self, id: Uuid) -> Option<usize> {
        self.transactions.iter().position(|entry| entry.id == id)
    }

    pub(crate) fn transaction_at_mut(&mut self, index: usize) -> (&mut LedgerEntry, &mut AccountStats) {
        (&mut self.transactions[index], &mut self.stats)
    }

    pub(crate) fn remove_transaction_at(&mut self, index: usize) -> LedgerEntry {
        let entry = self.transactions.remove(index);
        self.stats.revert(&entry);
        entry
    }

    pub(crate) fn budgets_mut(&mut self) -> &mut BTreeMap<String, BudgetRecord> {
        &mut self.budgets
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::EntryInput;

    #[test]
    fn recent_transactions_are_newest_first() {
        let mut snapshot = AccountSnapshot::new("alice@example.com");
        for label in ["first", "second", "third"] {
            let entry = EntryInput::income(label, 1.0).into_entry().unwrap();
            snapshot.push_transaction(entry);
        }
        let recent: Vec<_> = snapshot
            .recent_transactions(2)
            .into_iter()
            .map(|entry| entry.description.as_str())
            .collect();
        assert_eq!(recent, vec!["third", "second"]);
        assert_eq!(snapshot.transaction_count(), 3);
    }

    #[test]
    fn deserializes_with_missing_collections() {
        let json = r#"{
            "id": "bob",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let snapshot: AccountSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.id(), "bob");
        assert_eq!(snapshot.schema_version(), CURRENT_SCHEMA_VERSION);
        assert!(snapshot.transactions().is_empty());
        assert_eq!(snapshot.budgets().count(), 0);
    }
}
