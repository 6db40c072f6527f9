//! Property-based invariant tests for ItemPool.
//!
//! 1. Instances are conserved: created − discarded = spares + outstanding
//! 2. Renting never creates while a spare is available
//! 3. Spares are handed out oldest first
//! 4. shrink/prewarm leave exactly the requested spare count

use panelstack_core::ItemPool;
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Rent,
    Return,
    Prewarm(usize),
    Shrink(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Rent),
        4 => Just(Op::Return),
        1 => (0usize..16).prop_map(Op::Prewarm),
        1 => (0usize..16).prop_map(Op::Shrink),
        1 => Just(Op::Clear),
    ]
}

fn serial_pool() -> ItemPool<u32> {
    let next = Rc::new(Cell::new(0u32));
    ItemPool::new(move || {
        let id = next.get();
        next.set(id + 1);
        id
    })
}

// ═══════════════════════════════════════════════════════════════════════
// 1–4. Accounting holds after every operation
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pool_accounting_is_conserved(ops in prop::collection::vec(op_strategy(), 0..120)) {
        let mut pool = serial_pool();
        let mut held: Vec<u32> = Vec::new();

        for op in &ops {
            match *op {
                Op::Rent => {
                    let spares = pool.spare_count();
                    let created = pool.stats().created;
                    held.push(pool.rent());
                    if spares > 0 {
                        prop_assert_eq!(pool.stats().created, created);
                        prop_assert_eq!(pool.spare_count(), spares - 1);
                    } else {
                        prop_assert_eq!(pool.stats().created, created + 1);
                    }
                }
                Op::Return => {
                    if let Some(item) = held.pop() {
                        pool.return_item(item);
                    }
                }
                Op::Prewarm(n) => {
                    let before = pool.spare_count();
                    pool.prewarm(n);
                    prop_assert_eq!(pool.spare_count(), before.max(n));
                }
                Op::Shrink(n) => {
                    let before = pool.spare_count();
                    pool.shrink(n);
                    prop_assert_eq!(pool.spare_count(), before.min(n));
                }
                Op::Clear => {
                    pool.clear();
                    prop_assert_eq!(pool.spare_count(), 0);
                }
            }

            let stats = pool.stats();
            prop_assert_eq!(pool.outstanding(), held.len() as u64);
            prop_assert_eq!(
                stats.created - stats.discarded,
                pool.spare_count() as u64 + pool.outstanding()
            );
        }
    }

    #[test]
    fn spares_are_reused_oldest_first(count in 1usize..20) {
        let mut pool = serial_pool();
        let rented: Vec<u32> = (0..count).map(|_| pool.rent()).collect();
        for item in rented.iter().copied() {
            pool.return_item(item);
        }
        let again: Vec<u32> = (0..count).map(|_| pool.rent()).collect();
        prop_assert_eq!(again, rented);
        prop_assert_eq!(pool.stats().created, count as u64);
    }
}
