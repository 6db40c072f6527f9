#![forbid(unsafe_code)]

//! Observable lifecycle events.
//!
//! Events are fire-and-forget notifications for external subscribers. The
//! stack never waits on a subscriber and never reads anything back from one.

use crate::panel::PanelId;

/// Panel-scoped lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    BeginEnter,
    EndEnter,
    BeginExit,
    EndExit,
    /// `covering` is the panel being pushed above.
    BeginEnterBackground { covering: PanelId },
    EndEnterBackground { covering: PanelId },
    /// `uncovering` is the panel that was popped off.
    BeginEnterForeground { uncovering: PanelId },
    EndEnterForeground { uncovering: PanelId },
}

/// Stack-scoped event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEvent {
    BeginPush { panel: PanelId },
    EndPush { panel: PanelId },
    BeginPop { panel: PanelId },
    EndPop { panel: PanelId },
}

impl StackEvent {
    /// Panel the event refers to.
    pub fn panel(&self) -> PanelId {
        match *self {
            Self::BeginPush { panel }
            | Self::EndPush { panel }
            | Self::BeginPop { panel }
            | Self::EndPop { panel } => panel,
        }
    }

    /// Check if this event opens a push or pop.
    pub fn is_begin(&self) -> bool {
        matches!(self, Self::BeginPush { .. } | Self::BeginPop { .. })
    }
}
