//! Business logic for adding, editing, and deleting ledger entries.

use tracing::debug;
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::{AccountSnapshot, EntryInput, LedgerEntry};

/// Applies ledger mutations and keeps balance and spending in step with them.
pub struct TransactionService;

impl TransactionService {
    /// Validates `input`, appends the entry, and applies its effect.
    pub fn add(snapshot: &mut AccountSnapshot, input: EntryInput) -> ServiceResult<Uuid> {
        let entry = input.into_entry()?;
        let id = entry.id;
        debug!(
            account = snapshot.id(),
            %id,
            kind = %entry.kind,
            amount = %entry.amount,
            "adding ledger entry"
        );
        snapshot.push_transaction(entry);
        snapshot.touch();
        Ok(id)
    }

    /// Replaces kind, description, and amount of an existing entry.
    ///
    /// The old effect is reversed with the values captured before the
    /// overwrite, then the new effect is applied. Id and timestamp are kept.
    pub fn edit(snapshot: &mut AccountSnapshot, id: Uuid, input: EntryInput) -> ServiceResult<()> {
        let index = snapshot
            .transaction_index(id)
            .ok_or(ServiceError::EntryNotFound(id))?;
        let fields = input.validate()?;

        let account = snapshot.id().to_string();
        let (entry, stats) = snapshot.transaction_at_mut(index);
        let previous = entry.clone();
        stats.revert(&previous);
        entry.kind = fields.kind;
        entry.description = fields.description;
        entry.amount = fields.amount;
        stats.apply(entry);
        debug!(
            account = %account,
            %id,
            old_kind = %previous.kind,
            old_amount = %previous.amount,
            new_kind = %entry.kind,
            new_amount = %entry.amount,
            "edited ledger entry"
        );
        snapshot.touch();
        Ok(())
    }

    /// Removes the entry identified by `id`, reversing its effect.
    pub fn remove(snapshot: &mut AccountSnapshot, id: Uuid) -> ServiceResult<LedgerEntry> {
        let index = snapshot
            .transaction_index(id)
            .ok_or(ServiceError::EntryNotFound(id))?;
        let removed = snapshot.remove_transaction_at(index);
        debug!(
            account = snapshot.id(),
            %id,
            kind = %removed.kind,
            amount = %removed.amount,
            "removed ledger entry"
        );
        snapshot.touch();
        Ok(removed)
    }

    /// Returns the account's entries in insertion order.
    pub fn list(snapshot: &AccountSnapshot) -> Vec<&LedgerEntry> {
        snapshot.transactions().iter().collect()
    }
}
