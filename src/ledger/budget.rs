use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::ValidationError;

/// Qualitative budget health derived from the spent/limit ratio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    #[default]
    Good,
    Warning,
    Danger,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetStatus::Good => "good",
            BudgetStatus::Warning => "warning",
            BudgetStatus::Danger => "danger",
        };
        f.write_str(label)
    }
}

/// Thresholds and recompute behavior applied to budget records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BudgetPolicy {
    pub warning_percent: Decimal,
    pub danger_percent: Decimal,
    /// When false, a bare limit change leaves spent/percentage/status as stored.
    pub recompute_on_limit_change: bool,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            warning_percent: Decimal::from(80),
            danger_percent: Decimal::ONE_HUNDRED,
            recompute_on_limit_change: true,
        }
    }
}

impl BudgetPolicy {
    /// Policy that mirrors the legacy behavior of never recomputing on a limit change.
    pub fn legacy() -> Self {
        Self {
            recompute_on_limit_change: false,
            ..Self::default()
        }
    }

    pub fn status_for(&self, percentage: Decimal) -> BudgetStatus {
        if percentage >= self.danger_percent {
            BudgetStatus::Danger
        } else if percentage >= self.warning_percent {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Good
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.warning_percent <= Decimal::ZERO || self.danger_percent <= Decimal::ZERO {
            return Err(ValidationError::new(
                "budget thresholds must be positive percentages",
            ));
        }
        if self.warning_percent > self.danger_percent {
            return Err(ValidationError::new(format!(
                "warning threshold {} exceeds danger threshold {}",
                self.warning_percent, self.danger_percent
            )));
        }
        Ok(())
    }
}

/// Spending ceiling and utilization for a single category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetRecord {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub percentage: Decimal,
    pub status: BudgetStatus,
}

impl BudgetRecord {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            limit: Decimal::ZERO,
            spent: Decimal::ZERO,
            percentage: Decimal::ZERO,
            status: BudgetStatus::Good,
        }
    }

    /// Recomputes `percentage` and `status` from `spent` and `limit`.
    ///
    /// A percentage too large to represent saturates at `Decimal::MAX`.
    pub fn refresh(&mut self, policy: &BudgetPolicy) {
        self.percentage = if self.limit > Decimal::ZERO {
            self.spent
                .checked_mul(Decimal::ONE_HUNDRED)
                .and_then(|scaled| scaled.checked_div(self.limit))
                .unwrap_or(Decimal::MAX)
        } else {
            Decimal::ZERO
        };
        self.status = policy.status_for(self.percentage);
    }

    pub fn remaining(&self) -> Decimal {
        self.limit - self.spent
    }
}
