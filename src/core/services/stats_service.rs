use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::ledger::{AccountSnapshot, AccountStats, ManualStats};

/// Differences between the running stats and a full recomputation from entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsAudit {
    /// Sum of all expense amounts currently in the ledger.
    pub expected_spending: Decimal,
    /// `monthly_spending - expected_spending`.
    pub spending_drift: Decimal,
    /// Net signed effect of every entry on the balance.
    pub ledger_net: Decimal,
    /// Part of the balance not explained by ledger entries.
    pub base_offset: Decimal,
}

impl StatsAudit {
    pub fn is_consistent(&self) -> bool {
        self.spending_drift.is_zero()
    }
}

pub struct StatsService;

impl StatsService {
    /// Overwrites every provided field of the account stats.
    ///
    /// A manually written balance becomes the base that later entry deltas
    /// are applied on top of.
    pub fn set_manual(snapshot: &mut AccountSnapshot, patch: ManualStats) {
        let merged = patch.merged_into(*snapshot.stats());
        debug!(account = snapshot.id(), ?patch, "manual stats applied");
        *snapshot.stats_mut() = merged;
        snapshot.touch();
    }

    /// Recomputes ledger-derived totals and compares them to the running stats.
    pub fn audit(snapshot: &AccountSnapshot) -> StatsAudit {
        let (ledger_net, expected_spending) = snapshot.transactions().iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(net, spending), entry| (net + entry.balance_effect(), spending + entry.spending_effect()),
        );
        let stats = snapshot.stats();
        let audit = StatsAudit {
            expected_spending,
            spending_drift: stats.monthly_spending - expected_spending,
            ledger_net,
            base_offset: stats.current_balance - ledger_net,
        };
        if !audit.is_consistent() {
            warn!(
                account = snapshot.id(),
                drift = %audit.spending_drift,
                "monthly spending drifted from ledger"
            );
        }
        audit
    }

    /// Resets `monthly_spending` to the ledger's expense total, returning the old value.
    pub fn rebuild_spending(snapshot: &mut AccountSnapshot) -> Decimal {
        let expected = Self::audit(snapshot).expected_spending;
        let previous = snapshot.stats().monthly_spending;
        snapshot.stats_mut().monthly_spending = expected;
        snapshot.touch();
        debug!(
            account = snapshot.id(),
            %previous,
            %expected,
            "monthly spending rebuilt"
        );
        previous
    }

    pub fn current(snapshot: &AccountSnapshot) -> AccountStats {
        *snapshot.stats()
    }
}
