#![forbid(unsafe_code)]

//! Virtualized list for panelstack.
//!
//! # Role in panelstack
//! `panelstack-recycler` renders long lists with a constant number of item
//! views. A [`RecyclerList`] owns the sliding window of views, an
//! [`ItemPool`](panelstack_core::ItemPool) of spares, and the scroll state;
//! the host supplies a [`RecyclerAdapter`] that binds item data to a view and
//! draws the views at [`RecyclerList::anchored_position`].

pub mod config;
pub mod error;
pub mod recycler;

pub use config::{DEFAULT_DECELERATION_RATE, RecyclerConfig};
pub use error::RecyclerError;
pub use recycler::{RecyclerAdapter, RecyclerList};
