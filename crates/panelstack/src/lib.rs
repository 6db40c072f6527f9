#![forbid(unsafe_code)]

//! panelstack public facade crate.
//!
//! This crate provides the stable surface area for hosts. It re-exports the
//! common types from the internal crates and offers a prelude for day-to-day
//! use:
//!
//! - [`nav`]: the panel stack, panels, dialog masks, and transitions.
//! - [`recycler`]: the virtualized list.
//! - [`core`]: pooling, observer channels, geometry, config errors.
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use panelstack::prelude::*;
//! use std::rc::Rc;
//!
//! let factory = RegistryPanelFactory::new()
//!     .with_panel("Inventory", || Panel::screen("Inventory"))
//!     .with_panel("Confirm", || Panel::dialog("Confirm"));
//! let stack = UiStack::new(Rc::new(factory));
//!
//! block_on(stack.do_transition(&Transition::push("Inventory")))?;
//! block_on(stack.do_transition(&Transition::push("Confirm")))?;
//! assert_eq!(stack.depth(), 2);
//! assert_eq!(stack.masks().len(), 1);
//!
//! block_on(stack.pop(1, false))?;
//! assert!(stack.masks().is_empty());
//! # Ok::<(), panelstack::Error>(())
//! ```

pub mod error;

pub use error::{Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use panelstack_core::{
    ConfigError, ItemPool, Orientation, PoolStats, Rgba, Span, SubscriptionId, Subscribers,
};

// --- Navigation re-exports -------------------------------------------------

pub use panelstack_nav::{
    AnimationDriver, Animator, BindingTransition, Completer, CompletionSignal, DefaultHooks,
    HookFuture, Layer, Mask, MaskId, NavError, NavFuture, Operation, Panel, PanelBuilder,
    PanelEvent, PanelFactory, PanelHooks, PanelId, PanelRole, PanelState, RegistryPanelFactory,
    Settled, StackConfig, StackEvent, Transition, UiStack, UiStackBuilder, completion_pair,
};

// --- Recycler re-exports ---------------------------------------------------

pub use panelstack_recycler::{
    DEFAULT_DECELERATION_RATE, RecyclerAdapter, RecyclerConfig, RecyclerError, RecyclerList,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Mask, NavError, Operation, Panel, PanelEvent, PanelFactory, PanelHooks,
        PanelState, RecyclerAdapter, RecyclerConfig, RecyclerList, RegistryPanelFactory, Result,
        StackConfig, StackEvent, Transition, UiStack,
    };

    pub use crate::{core, nav, recycler};
}

pub use panelstack_core as core;
pub use panelstack_nav as nav;
pub use panelstack_recycler as recycler;
