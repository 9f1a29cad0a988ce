use budgetly_core::{
    AccountSnapshot, EntryInput, EntryKind, ManualStats, RawAmount, StatsService,
    TransactionService,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Add(EntryKind, i64, bool),
    Edit(usize, EntryKind, i64, bool),
    Remove(usize),
}

fn kind_strategy() -> impl Strategy<Value = EntryKind> {
    prop_oneof![Just(EntryKind::Income), Just(EntryKind::Expense)]
}

/// Amounts in cents, so most generated values are fractional.
fn cents_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000_000
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (kind_strategy(), cents_strategy(), any::<bool>())
            .prop_map(|(kind, cents, as_text)| Op::Add(kind, cents, as_text)),
        2 => (any::<usize>(), kind_strategy(), cents_strategy(), any::<bool>())
            .prop_map(|(pick, kind, cents, as_text)| Op::Edit(pick, kind, cents, as_text)),
        2 => any::<usize>().prop_map(Op::Remove),
    ]
}

fn input(kind: EntryKind, cents: i64, as_text: bool) -> EntryInput {
    let amount = Decimal::new(cents, 2);
    let raw = if as_text {
        RawAmount::from(amount.to_string())
    } else {
        RawAmount::from(amount)
    };
    EntryInput::new(kind, "generated", raw)
}

fn ledger_spending(snapshot: &AccountSnapshot) -> Decimal {
    snapshot
        .transactions()
        .iter()
        .filter(|entry| entry.kind == EntryKind::Expense)
        .map(|entry| entry.amount)
        .sum()
}

proptest! {
    #[test]
    fn totals_match_ledger_after_every_operation(
        base_cents in -1_000_000i64..1_000_000,
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let base = Decimal::new(base_cents, 2);
        let mut snapshot = AccountSnapshot::new("prop");
        StatsService::set_manual(
            &mut snapshot,
            ManualStats { current_balance: Some(base), ..ManualStats::default() },
        );
        let mut model: Vec<(Uuid, EntryKind, Decimal)> = Vec::new();

        for op in ops {
            match op {
                Op::Add(kind, cents, as_text) => {
                    let id = TransactionService::add(&mut snapshot, input(kind, cents, as_text)).unwrap();
                    model.push((id, kind, Decimal::new(cents, 2)));
                }
                Op::Edit(pick, kind, cents, as_text) => {
                    if model.is_empty() {
                        let err = TransactionService::edit(
                            &mut snapshot,
                            Uuid::new_v4(),
                            input(kind, cents, as_text),
                        )
                        .unwrap_err();
                        prop_assert!(err.is_not_found());
                        continue;
                    }
                    let slot = pick % model.len();
                    let id = model[slot].0;
                    TransactionService::edit(&mut snapshot, id, input(kind, cents, as_text)).unwrap();
                    model[slot] = (id, kind, Decimal::new(cents, 2));
                }
                Op::Remove(pick) => {
                    if model.is_empty() {
                        prop_assert!(TransactionService::remove(&mut snapshot, Uuid::new_v4()).is_err());
                        continue;
                    }
                    let (id, _, amount) = model.remove(pick % model.len());
                    let removed = TransactionService::remove(&mut snapshot, id).unwrap();
                    prop_assert_eq!(removed.amount, amount);
                }
            }

            let expected_spending: Decimal = model
                .iter()
                .filter(|(_, kind, _)| *kind == EntryKind::Expense)
                .map(|(_, _, amount)| *amount)
                .sum();
            let net: Decimal = model.iter().map(|(_, kind, amount)| kind.signed(*amount)).sum();

            prop_assert_eq!(snapshot.stats().monthly_spending, expected_spending);
            prop_assert_eq!(snapshot.stats().monthly_spending, ledger_spending(&snapshot));
            prop_assert_eq!(snapshot.stats().current_balance, base + net);
            prop_assert_eq!(snapshot.transaction_count(), model.len());
            prop_assert!(StatsService::audit(&snapshot).is_consistent());
        }
    }

    #[test]
    fn add_edit_delete_is_net_zero(
        seed in prop::collection::vec((kind_strategy(), cents_strategy()), 0..40),
        first in (kind_strategy(), cents_strategy()),
        second in (kind_strategy(), cents_strategy()),
    ) {
        let mut snapshot = AccountSnapshot::new("prop");
        for (kind, cents) in &seed {
            TransactionService::add(&mut snapshot, input(*kind, *cents, false)).unwrap();
        }
        let before = *snapshot.stats();

        let id = TransactionService::add(&mut snapshot, input(first.0, first.1, true)).unwrap();
        TransactionService::edit(&mut snapshot, id, input(second.0, second.1, false)).unwrap();
        TransactionService::remove(&mut snapshot, id).unwrap();

        prop_assert_eq!(*snapshot.stats(), before);
        prop_assert_eq!(snapshot.transaction_count(), seed.len());
    }

    #[test]
    fn rejected_edits_leave_snapshot_untouched(cents in 1i64..1_000_000) {
        let mut snapshot = AccountSnapshot::new("prop");
        let id = TransactionService::add(&mut snapshot, input(EntryKind::Expense, cents, false)).unwrap();
        let before = snapshot.clone();

        let blank = EntryInput::expense("   ", Decimal::new(cents, 2));
        prop_assert!(TransactionService::edit(&mut snapshot, id, blank).is_err());
        let negative = EntryInput::expense("Refund", Decimal::new(-cents, 2));
        prop_assert!(TransactionService::edit(&mut snapshot, id, negative).is_err());
        prop_assert_eq!(snapshot, before);
    }
}
