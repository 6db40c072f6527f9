#![forbid(unsafe_code)]

//! Recycler configuration errors.

use thiserror::Error;

/// Errors raised when a [`RecyclerList`](crate::RecyclerList) is built.
///
/// Both are fatal setup faults: the list refuses to construct rather than
/// guessing an axis or a size.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecyclerError {
    /// The config must enable exactly one of vertical and horizontal.
    #[error(
        "recycler must scroll along exactly one axis (vertical={vertical}, horizontal={horizontal})"
    )]
    AmbiguousOrientation { vertical: bool, horizontal: bool },

    /// A length is negative, not finite, or zero where a size is required.
    #[error("recycler {field} is invalid: {value}")]
    InvalidExtent { field: &'static str, value: f32 },
}
