#![forbid(unsafe_code)]

//! Panel navigation for panelstack.
//!
//! # Role in panelstack
//! `panelstack-nav` sequences panel lifecycles. A [`UiStack`] serializes
//! push/pop/replace/remove requests through one queue, drives each
//! [`Panel`] through enter/exit/background/foreground hooks, keeps dialog
//! masks in place, and toggles global interactivity around transitions.
//!
//! Rendering, hit-testing, and asset loading stay with the host. The host
//! supplies a [`PanelFactory`], optionally an [`AnimationDriver`], and polls
//! the futures the stack returns on its own single-threaded executor.

pub mod animation;
mod capability;
pub mod completion;
pub mod config;
pub mod dialog;
pub mod error;
pub mod event;
pub mod factory;
pub mod panel;
pub mod stack;
pub mod transition;

pub use animation::{AnimationDriver, Animator};
pub use completion::{Completer, CompletionSignal, Settled, completion_pair};
pub use config::StackConfig;
pub use dialog::{Mask, MaskId};
pub use error::NavError;
pub use event::{PanelEvent, StackEvent};
pub use factory::{PanelFactory, RegistryPanelFactory};
pub use panel::{
    DefaultHooks, HookFuture, Panel, PanelBuilder, PanelHooks, PanelId, PanelRole, PanelState,
};
pub use stack::{Layer, NavFuture, UiStack, UiStackBuilder};
pub use transition::{BindingTransition, Operation, Transition};
