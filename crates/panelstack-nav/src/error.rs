#![forbid(unsafe_code)]

//! Navigation errors.

use thiserror::Error;

/// Errors surfaced by [`UiStack`](crate::UiStack) and [`Panel`](crate::Panel).
///
/// Range and capability errors are precondition faults: they are returned
/// before the stack is mutated and are never retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// `pop` asked for more panels than the stack holds.
    #[error("cannot pop {requested} panel(s) from a stack of depth {depth}")]
    PopOutOfRange { requested: usize, depth: usize },

    /// `remove` window does not fit inside the stack.
    #[error("remove window offset={offset} count={count} exceeds stack depth {depth}")]
    RemoveOutOfRange {
        offset: usize,
        count: usize,
        depth: usize,
    },

    /// A pop or remove request for zero panels.
    #[error("navigation request covers zero panels")]
    EmptyRequest,

    /// The factory produced no panel for the requested name.
    #[error("panel factory has no panel named {name:?}")]
    PanelNotFound { name: String },

    /// The panel does not declare the capability the caller relies on.
    #[error("panel {panel:?} does not provide capability {capability}")]
    MissingCapability {
        panel: String,
        capability: &'static str,
    },

    /// The panel declares the capability for a different value type.
    #[error("panel {panel:?} {capability} capability holds {expected}, not the requested type")]
    CapabilityTypeMismatch {
        panel: String,
        capability: &'static str,
        expected: &'static str,
    },

    /// The panel is not owned by a live stack.
    #[error("panel {panel:?} is not attached to a stack")]
    Detached { panel: String },

    /// No transition is bound to the trigger.
    #[error("panel {panel:?} has no transition bound to trigger {trigger:?}")]
    UnknownBinding { panel: String, trigger: String },

    /// The operation was dropped before it could report a result.
    #[error("{operation} was cancelled before completion")]
    Cancelled { operation: &'static str },
}

impl NavError {
    /// Check if this error is a caller-side precondition violation.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::PopOutOfRange { .. } | Self::RemoveOutOfRange { .. } | Self::EmptyRequest
        )
    }

    /// Check if this error reports a missing or mistyped panel capability.
    pub fn is_capability(&self) -> bool {
        matches!(
            self,
            Self::MissingCapability { .. } | Self::CapabilityTypeMismatch { .. }
        )
    }
}
