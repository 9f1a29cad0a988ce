//! Per-category budget records and their derived utilization.

use tracing::debug;

use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::amount::non_negative;
use crate::ledger::{AccountSnapshot, BudgetPolicy, BudgetRecord, RawAmount, ValidationError};

/// Creates, updates, and removes budget records on a snapshot.
pub struct BudgetService;

impl BudgetService {
    /// Sets the limit for `category`, creating the record on first use.
    ///
    /// A new record starts with nothing spent. For an existing record only the
    /// limit is replaced; percentage and status are recomputed from the stored
    /// `spent` unless `policy.recompute_on_limit_change` is off.
    pub fn set<'a>(
        snapshot: &'a mut AccountSnapshot,
        category: &str,
        limit: impl Into<RawAmount>,
        policy: &BudgetPolicy,
    ) -> ServiceResult<&'a BudgetRecord> {
        let category = normalize_category(category)?;
        let limit = non_negative(Some(&limit.into()), "limit")?;

        let budgets = snapshot.budgets_mut();
        let created = !budgets.contains_key(&category);
        let record = budgets
            .entry(category.clone())
            .or_insert_with(|| BudgetRecord::new(category.clone()));
        record.limit = limit;
        if created || policy.recompute_on_limit_change {
            record.refresh(policy);
        }
        debug!(
            category = %category,
            %limit,
            created,
            status = %record.status,
            "budget limit set"
        );
        snapshot.touch();
        snapshot
            .budget(&category)
            .ok_or(ServiceError::BudgetNotFound(category))
    }

    /// Removes the record for `category`. Absent categories are a no-op.
    pub fn remove(snapshot: &mut AccountSnapshot, category: &str) -> Option<BudgetRecord> {
        let removed = snapshot.budgets_mut().remove(category.trim());
        if removed.is_some() {
            debug!(category = category.trim(), "budget removed");
            snapshot.touch();
        }
        removed
    }

    /// Overwrites the spent total for an existing category and recomputes status.
    pub fn record_spending<'a>(
        snapshot: &'a mut AccountSnapshot,
        category: &str,
        spent: impl Into<RawAmount>,
        policy: &BudgetPolicy,
    ) -> ServiceResult<&'a BudgetRecord> {
        let category = normalize_category(category)?;
        let spent = non_negative(Some(&spent.into()), "spent")?;
        let record = snapshot
            .budgets_mut()
            .get_mut(&category)
            .ok_or_else(|| ServiceError::BudgetNotFound(category.clone()))?;
        record.spent = spent;
        record.refresh(policy);
        debug!(
            category = %category,
            %spent,
            percentage = %record.percentage,
            status = %record.status,
            "budget spending recorded"
        );
        snapshot.touch();
        snapshot
            .budget(&category)
            .ok_or(ServiceError::BudgetNotFound(category))
    }

    /// Recomputes percentage and status of every record under `policy`.
    pub fn refresh_all(snapshot: &mut AccountSnapshot, policy: &BudgetPolicy) {
        for record in snapshot.budgets_mut().values_mut() {
            record.refresh(policy);
        }
        snapshot.touch();
    }

    /// Lists every budget record ordered by category.
    pub fn list(snapshot: &AccountSnapshot) -> Vec<&BudgetRecord> {
        snapshot.budgets().collect()
    }
}

fn normalize_category(category: &str) -> Result<String, ValidationError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("category must not be empty"));
    }
    Ok(trimmed.to_string())
}
