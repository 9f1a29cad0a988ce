use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{AccountSnapshot, AccountStats, BudgetRecord, BudgetStatus, EntryKind};

/// Dashboard-level view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountOverview {
    pub stats: AccountStats,
    pub transaction_count: usize,
    pub ledger_income: Decimal,
    pub ledger_expenses: Decimal,
    pub savings_progress: Option<Decimal>,
    pub budget_count: usize,
    pub total_limit: Decimal,
    pub total_spent: Decimal,
    pub good_budgets: usize,
    pub warning_budgets: usize,
    pub danger_budgets: usize,
}

pub struct SummaryService;

impl SummaryService {
    pub fn overview(snapshot: &AccountSnapshot) -> AccountOverview {
        let mut ledger_income = Decimal::ZERO;
        let mut ledger_expenses = Decimal::ZERO;
        for entry in snapshot.transactions() {
            match entry.kind {
                EntryKind::Income => ledger_income += entry.amount,
                EntryKind::Expense => ledger_expenses += entry.amount,
            }
        }

        let mut overview = AccountOverview {
            stats: *snapshot.stats(),
            transaction_count: snapshot.transaction_count(),
            ledger_income,
            ledger_expenses,
            savings_progress: snapshot.stats().savings_progress(),
            budget_count: 0,
            total_limit: Decimal::ZERO,
            total_spent: Decimal::ZERO,
            good_budgets: 0,
            warning_budgets: 0,
            danger_budgets: 0,
        };
        for record in snapshot.budgets() {
            overview.budget_count += 1;
            overview.total_limit += record.limit;
            overview.total_spent += record.spent;
            match record.status {
                BudgetStatus::Good => overview.good_budgets += 1,
                BudgetStatus::Warning => overview.warning_budgets += 1,
                BudgetStatus::Danger => overview.danger_budgets += 1,
            }
        }
        overview
    }

    /// Budgets in warning or danger, highest utilization first.
    pub fn budgets_needing_attention(snapshot: &AccountSnapshot) -> Vec<&BudgetRecord> {
        let mut flagged: Vec<&BudgetRecord> = snapshot
            .budgets()
            .filter(|record| record.status != BudgetStatus::Good)
            .collect();
        flagged.sort_by(|a, b| b.percentage.cmp(&a.percentage));
        flagged
    }
}
