#![forbid(unsafe_code)]

//! Generic object pool for recyclable view instances.
//!
//! The pool hands out spare instances in FIFO order and creates new ones on
//! demand when no spare is available. Optional rent/return hooks let the
//! owner re-attach or detach an instance as it crosses the pool boundary
//! (for a list: move it into the scrolling content, or park it outside).
//!
//! # Invariants
//!
//! - `created == spare_count() + outstanding() + discarded` at all times,
//!   where `outstanding = rented - returned`.
//! - Hooks run exactly once per crossing: `on_rent` before an instance leaves
//!   the pool, `on_return` before it enters.
//!
//! # Example
//!
//! ```
//! use panelstack_core::pool::ItemPool;
//!
//! let mut pool = ItemPool::new(|| String::from("row"));
//! let a = pool.rent();
//! pool.return_item(a);
//! assert_eq!(pool.spare_count(), 1);
//! let _b = pool.rent();
//! assert_eq!(pool.stats().created, 1);
//! ```

use std::collections::VecDeque;
use std::fmt;

type Hook<T> = Box<dyn FnMut(&mut T)>;

/// Counters describing pool traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances created by the factory closure.
    pub created: u64,
    /// Successful `rent` calls.
    pub rented: u64,
    /// Successful `return_item` calls.
    pub returned: u64,
    /// Spare instances dropped by `shrink` or `clear`.
    pub discarded: u64,
}

/// Rent/return pool with create-on-demand.
pub struct ItemPool<T> {
    spares: VecDeque<T>,
    create: Box<dyn FnMut() -> T>,
    on_rent: Option<Hook<T>>,
    on_return: Option<Hook<T>>,
    stats: PoolStats,
}

impl<T> fmt::Debug for ItemPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemPool")
            .field("spares", &self.spares.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<T> ItemPool<T> {
    /// Create an empty pool that builds new instances with `create`.
    pub fn new(create: impl FnMut() -> T + 'static) -> Self {
        Self {
            spares: VecDeque::new(),
            create: Box::new(create),
            on_rent: None,
            on_return: None,
            stats: PoolStats::default(),
        }
    }

    /// Hook invoked on every instance right before it is rented out.
    #[must_use]
    pub fn on_rent(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.on_rent = Some(Box::new(hook));
        self
    }

    /// Hook invoked on every instance right before it is parked in the pool.
    #[must_use]
    pub fn on_return(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.on_return = Some(Box::new(hook));
        self
    }

    /// Take a spare instance, creating one if the pool is empty.
    pub fn rent(&mut self) -> T {
        let mut item = match self.spares.pop_front() {
            Some(item) => item,
            None => {
                self.stats.created += 1;
                tracing::trace!(
                    target: "panelstack.pool",
                    created = self.stats.created,
                    "pool miss, creating instance"
                );
                (self.create)()
            }
        };
        if let Some(hook) = self.on_rent.as_mut() {
            hook(&mut item);
        }
        self.stats.rented += 1;
        item
    }

    /// Park an instance for later reuse.
    pub fn return_item(&mut self, mut item: T) {
        if let Some(hook) = self.on_return.as_mut() {
            hook(&mut item);
        }
        self.stats.returned += 1;
        self.spares.push_back(item);
    }

    /// Create instances until at least `count` spares are available.
    pub fn prewarm(&mut self, count: usize) {
        while self.spares.len() < count {
            let mut item = (self.create)();
            self.stats.created += 1;
            if let Some(hook) = self.on_return.as_mut() {
                hook(&mut item);
            }
            self.spares.push_back(item);
        }
    }

    /// Drop spares until at most `keep` remain. Oldest spares go first.
    pub fn shrink(&mut self, keep: usize) {
        while self.spares.len() > keep {
            self.spares.pop_front();
            self.stats.discarded += 1;
        }
    }

    /// Drop every spare instance.
    pub fn clear(&mut self) {
        self.shrink(0);
    }

    /// Number of instances waiting in the pool.
    #[inline]
    pub fn spare_count(&self) -> usize {
        self.spares.len()
    }

    /// Number of instances rented and not yet returned.
    #[inline]
    pub fn outstanding(&self) -> u64 {
        self.stats.rented.saturating_sub(self.stats.returned)
    }

    /// Traffic counters.
    #[inline]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}
