#![forbid(unsafe_code)]

//! Declarative transition descriptors.
//!
//! A [`Transition`] names a destination panel, the stack operation that
//! brings it in, and whether the panel beneath should be disabled once the
//! destination is on top. Descriptors are plain data: they are authored in
//! configuration, bound to triggers on a panel via [`BindingTransition`], or
//! built in code and handed to [`UiStack::do_transition`](crate::UiStack::do_transition).
//!
//! Serialized form (with the `serde` feature):
//!
//! ```json
//! { "destination": "Shop", "operation": "replace", "disableUnderPanel": true }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a transition brings its destination onto the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operation {
    /// Place the destination on top of the current top panel.
    #[default]
    Push,
    /// Swap the current top panel for the destination.
    Replace,
}

/// Immutable (destination, operation, disable-under-panel) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Transition {
    /// Name the panel factory resolves.
    pub destination: String,
    /// Stack operation to perform.
    #[cfg_attr(feature = "serde", serde(default))]
    pub operation: Operation,
    /// Disable the panel beneath once the destination is on top.
    #[cfg_attr(feature = "serde", serde(default))]
    pub disable_under_panel: bool,
}

impl Transition {
    /// Push transition to `destination`.
    pub fn push(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            operation: Operation::Push,
            disable_under_panel: false,
        }
    }

    /// Replace transition to `destination`.
    pub fn replace(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            operation: Operation::Replace,
            disable_under_panel: false,
        }
    }

    /// Set the disable-under-panel flag.
    #[must_use]
    pub fn disable_under_panel(mut self, disable: bool) -> Self {
        self.disable_under_panel = disable;
        self
    }
}

/// A transition fired by a named trigger on a panel (a button id, a key).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BindingTransition {
    /// Trigger id passed to [`Panel::activate_binding`](crate::Panel::activate_binding).
    pub trigger: String,
    /// Transition to run.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub transition: Transition,
}

impl BindingTransition {
    /// Bind `transition` to `trigger`.
    pub fn new(trigger: impl Into<String>, transition: Transition) -> Self {
        Self {
            trigger: trigger.into(),
            transition,
        }
    }
}
