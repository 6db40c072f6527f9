#![forbid(unsafe_code)]

//! Typed capability slots.
//!
//! A panel declares at build time which value type it accepts as input and
//! which it produces as a result. Each declaration becomes a [`Capability`]
//! slot keyed by `TypeId`; reads and writes through the wrong type are
//! reported instead of silently ignored.

use std::any::{Any, TypeId};
use std::fmt;

fn clone_as<T: Clone + 'static>(value: &dyn Any) -> Option<Box<dyn Any>> {
    value
        .downcast_ref::<T>()
        .map(|v| Box::new(v.clone()) as Box<dyn Any>)
}

pub(crate) struct Capability {
    type_id: TypeId,
    type_name: &'static str,
    value: Option<Box<dyn Any>>,
    clone_value: fn(&dyn Any) -> Option<Box<dyn Any>>,
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("type", &self.type_name)
            .field("set", &self.value.is_some())
            .finish()
    }
}

impl Capability {
    pub(crate) fn of<T: Clone + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: None,
            clone_value: clone_as::<T>,
        }
    }

    pub(crate) fn holds<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Store a value. Callers check [`Capability::holds`] first.
    pub(crate) fn set<T: 'static>(&mut self, value: T) {
        debug_assert!(self.holds::<T>());
        self.value = Some(Box::new(value));
    }

    pub(crate) fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.value
            .as_deref()
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    pub(crate) fn clone_boxed(&self) -> Option<Box<dyn Any>> {
        self.value.as_deref().and_then(|v| (self.clone_value)(v))
    }
}
