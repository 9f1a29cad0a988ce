use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::LedgerEntry;

/// Running aggregates for an account.
///
/// `monthly_income` and `savings_goal` are only ever set manually.
/// `monthly_spending` is cumulative, not scoped to a calendar month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AccountStats {
    pub current_balance: Decimal,
    pub monthly_income: Decimal,
    pub monthly_spending: Decimal,
    pub savings_goal: Decimal,
}

impl AccountStats {
    pub(crate) fn apply(&mut self, entry: &LedgerEntry) {
        self.current_balance += entry.balance_effect();
        self.monthly_spending += entry.spending_effect();
    }

    pub(crate) fn revert(&mut self, entry: &LedgerEntry) {
        self.current_balance -= entry.balance_effect();
        self.monthly_spending -= entry.spending_effect();
    }

    /// Percentage of the savings goal covered by the current balance.
    pub fn savings_progress(&self) -> Option<Decimal> {
        if self.savings_goal > Decimal::ZERO {
            self.current_balance
                .checked_mul(Decimal::ONE_HUNDRED)?
                .checked_div(self.savings_goal)
        } else {
            None
        }
    }
}

/// Manually supplied stats. Provided fields overwrite, absent ones are kept.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ManualStats {
    #[serde(default)]
    pub current_balance: Option<Decimal>,
    #[serde(default)]
    pub monthly_income: Option<Decimal>,
    #[serde(default)]
    pub monthly_spending: Option<Decimal>,
    #[serde(default)]
    pub savings_goal: Option<Decimal>,
}

impl ManualStats {
    pub fn is_empty(&self) -> bool {
        self.current_balance.is_none()
            && self.monthly_income.is_none()
            && self.monthly_spending.is_none()
            && self.savings_goal.is_none()
    }

    /// Returns `stats` with every provided field overwritten.
    pub fn merged_into(&self, stats: AccountStats) -> AccountStats {
        AccountStats {
            current_balance: self.current_balance.unwrap_or(stats.current_balance),
            monthly_income: self.monthly_income.unwrap_or(stats.monthly_income),
            monthly_spending: self.monthly_spending.unwrap_or(stats.monthly_spending),
            savings_goal: self.savings_goal.unwrap_or(stats.savings_goal),
        }
    }
}
