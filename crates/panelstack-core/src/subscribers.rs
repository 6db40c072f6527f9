#![forbid(unsafe_code)]

//! Fire-and-forget observer lists.
//!
//! `Subscribers<E>` is a cheap-clone handle to a list of callbacks. Emitting
//! an event calls every callback registered at the moment of emission, in
//! registration order. Nothing emitted through this channel feeds back into
//! control flow: callbacks cannot veto or delay the emitter.
//!
//! # Failure Modes
//!
//! - A callback that emits on the same list while it is running does not
//!   receive its own nested event (it is skipped rather than re-entered).
//! - Callbacks added or removed during an emission take effect for the next
//!   emission.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

struct SubscriberList<E> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Callback<E>)>>,
}

/// Shared list of event callbacks.
pub struct Subscribers<E> {
    list: Rc<SubscriberList<E>>,
}

impl<E> Clone for Subscribers<E> {
    fn clone(&self) -> Self {
        Self {
            list: Rc::clone(&self.list),
        }
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .finish()
    }
}

impl<E> Subscribers<E> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            list: Rc::new(SubscriberList {
                next_id: Cell::new(1),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a callback.
    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.list.next_id.get());
        self.list.next_id.set(id.0 + 1);
        let callback: Callback<E> = Rc::new(RefCell::new(callback));
        self.list.entries.borrow_mut().push((id, callback));
        id
    }

    /// Remove a callback. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.list.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Call every registered callback with `event`.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .list
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            match callback.try_borrow_mut() {
                Ok(mut cb) => {
                    let cb = &mut *cb;
                    cb(event);
                }
                Err(_) => tracing::trace!("skipping re-entrant subscriber"),
            }
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.list.entries.borrow().len()
    }

    /// Check if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
