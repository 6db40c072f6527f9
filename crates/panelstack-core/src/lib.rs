#![forbid(unsafe_code)]

//! Core: object pooling, observer channels, and geometry primitives.
//!
//! # Role in panelstack
//! `panelstack-core` is the leaf layer. It owns the pieces that both the
//! navigation stack (`panelstack-nav`) and the virtualized list
//! (`panelstack-recycler`) build on, without knowing about either of them.
//!
//! # Primary responsibilities
//! - **ItemPool**: rent/return pool for recyclable view instances.
//! - **Subscribers**: fire-and-forget notification channel used for
//!   lifecycle events.
//! - **Geometry**: colours, orientation, and one-dimensional spans.
//! - **Config loading**: shared error type for JSON/TOML configuration files.

pub mod config;
pub mod geometry;
pub mod pool;
pub mod subscribers;

pub use config::ConfigError;
pub use geometry::{Orientation, Rgba, Span};
pub use pool::{ItemPool, PoolStats};
pub use subscribers::{SubscriptionId, Subscribers};
