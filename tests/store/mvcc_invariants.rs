//! MVCC Invariant Tests
//!
//! Conservation and snapshot stability under concurrent writers, plus a
//! model-based property over sequential histories.

use crate::common::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::thread;

const ACCOUNTS: usize = 8;
const BALANCE: i64 = 100;

fn accounts() -> Vec<Key> {
    (0..ACCOUNTS as i64)
        .map(|id| Key::id(&ns("bank"), "account", id))
        .collect()
}

fn seeded(level: IsolationLevel, sessions: usize) -> (TestStore, Vec<Key>) {
    let t = TestStore::new(level, sessions);
    let keys = accounts();
    let entries: Vec<(&Key, i64)> = keys.iter().map(|k| (k, BALANCE)).collect();
    t.seed(&entries);
    (t, keys)
}

/// Move `amount` from `from` to `to`, retrying on contention
fn transfer(session: &MemorySession, from: &Key, to: &Key, amount: i64) -> u32 {
    let mut aborts = 0;
    loop {
        let result = run_in_transaction(session, |txn| {
            let a = txn.get(from)?.count;
            let b = txn.get(to)?.count;
            txn.put(from.clone(), Record::with_count(a - amount))?;
            txn.put(to.clone(), Record::with_count(b + amount))?;
            Ok::<_, StoreError>(())
        });
        match result {
            Ok(()) => return aborts,
            Err(e) if e.is_contention() => aborts += 1,
            Err(e) => panic!("transfer failed: {}", e),
        }
    }
}

fn total(t: &TestStore, keys: &[Key]) -> i64 {
    keys.iter().map(|k| t.count(k)).sum()
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn concurrent_transfers_preserve_total() {
    for level in [IsolationLevel::SnapshotIsolation, IsolationLevel::Serializable] {
        let (t, keys) = seeded(level, 4);

        thread::scope(|s| {
            for (i, session) in t.sessions.iter().enumerate() {
                let keys = &keys;
                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(i as u64);
                    for _ in 0..200 {
                        let from = rng.gen_range(0..ACCOUNTS);
                        let to = (from + rng.gen_range(1..ACCOUNTS)) % ACCOUNTS;
                        transfer(session, &keys[from], &keys[to], rng.gen_range(1..10));
                    }
                });
            }
        });

        assert_eq!(total(&t, &keys), BALANCE * ACCOUNTS as i64, "{}", level);
        assert_eq!(t.store.active_transactions(), 0);
    }
}

#[test]
fn snapshot_sum_is_stable_while_writers_commit() {
    let (t, keys) = seeded(IsolationLevel::SnapshotIsolation, 3);
    let expected = BALANCE * ACCOUNTS as i64;

    thread::scope(|s| {
        for (i, session) in t.sessions[1..].iter().enumerate() {
            let keys = &keys;
            s.spawn(move || {
                let mut rng = StdRng::seed_from_u64(100 + i as u64);
                for _ in 0..200 {
                    let from = rng.gen_range(0..ACCOUNTS);
                    let to = (from + 1) % ACCOUNTS;
                    transfer(session, &keys[from], &keys[to], 5);
                }
            });
        }

        for _ in 0..50 {
            let mut reader = t.sessions[0].begin().unwrap();
            let first: i64 = keys.iter().map(|k| reader.get(k).unwrap().count).sum();
            thread::yield_now();
            let second: i64 = keys.iter().map(|k| reader.get(k).unwrap().count).sum();
            assert_eq!(first, expected);
            assert_eq!(second, expected);
            reader.commit().unwrap();
        }
    });
}

// ============================================================================
// Model-based
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Transfer { from: usize, to: usize, amount: i64 },
    Deposit { account: usize, amount: i64 },
    Abandon { account: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, 0..ACCOUNTS, 1i64..50)
            .prop_filter("distinct accounts", |(f, t, _)| f != t)
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        (0..ACCOUNTS, -20i64..20).prop_map(|(account, amount)| Op::Deposit { account, amount }),
        (0..ACCOUNTS).prop_map(|account| Op::Abandon { account }),
    ]
}

fn level() -> impl Strategy<Value = IsolationLevel> {
    prop_oneof![
        Just(IsolationLevel::ReadCommitted),
        Just(IsolationLevel::SnapshotIsolation),
        Just(IsolationLevel::Serializable),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn sequential_history_matches_model(level in level(), ops in prop::collection::vec(op(), 1..40)) {
        let (t, keys) = seeded(level, 1);
        let mut model: BTreeMap<usize, i64> = (0..ACCOUNTS).map(|i| (i, BALANCE)).collect();

        for op in &ops {
            match *op {
                Op::Transfer { from, to, amount } => {
                    prop_assert_eq!(transfer(t.session(), &keys[from], &keys[to], amount), 0);
                    *model.get_mut(&from).unwrap() -= amount;
                    *model.get_mut(&to).unwrap() += amount;
                }
                Op::Deposit { account, amount } => {
                    run_in_transaction(t.session(), |txn| {
                        let current = txn.get(&keys[account])?.count;
                        txn.put(keys[account].clone(), Record::with_count(current + amount))
                    })
                    .unwrap();
                    *model.get_mut(&account).unwrap() += amount;
                }
                Op::Abandon { account } => {
                    let mut txn = t.session().begin().unwrap();
                    txn.put(keys[account].clone(), Record::with_count(-1)).unwrap();
                    txn.rollback();
                }
            }
        }

        for (i, key) in keys.iter().enumerate() {
            prop_assert_eq!(t.count(key), model[&i]);
        }
        prop_assert_eq!(t.store.active_transactions(), 0);
    }
}
