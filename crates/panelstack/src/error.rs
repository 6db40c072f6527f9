#![forbid(unsafe_code)]

//! panelstack error model.
//!
//! Each subsystem keeps its own typed error so callers can match on what
//! matters. [`Error`] folds them together for hosts that drive navigation,
//! lists, and configuration from one place and want a single `?` target.
//!
//! # Classification
//!
//! - [`Error::is_precondition`] marks requests that were rejected before any
//!   state changed. Retrying the same request fails the same way.
//! - [`Error::is_capability`] marks panels used through a capability they
//!   do not declare (or declare with another value type).
//! - [`Error::error_type`] gives a stable label for tracing fields.

use std::fmt;

use panelstack_core::ConfigError;
use panelstack_nav::NavError;
use panelstack_recycler::RecyclerError;

/// Top-level error for panelstack hosts.
#[derive(Debug)]
pub enum Error {
    /// Navigation stack or panel error.
    Nav(NavError),
    /// Virtualized list setup error.
    Recycler(RecyclerError),
    /// Configuration file could not be loaded or validated.
    Config(ConfigError),
}

/// Standard result type for panelstack APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the request was rejected before the stack or list changed.
    pub fn is_precondition(&self) -> bool {
        match self {
            Self::Nav(err) => err.is_precondition(),
            // Setup errors are returned before a list exists.
            Self::Recycler(_) => true,
            Self::Config(_) => false,
        }
    }

    /// Whether a panel lacks the capability the caller relied on.
    pub fn is_capability(&self) -> bool {
        matches!(self, Self::Nav(err) if err.is_capability())
    }

    /// Error type label for tracing.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Nav(_) => "nav",
            Self::Recycler(_) => "recycler",
            Self::Config(_) => "config",
        }
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nav(err) => write!(f, "navigation: {err}"),
            Self::Recycler(err) => write!(f, "recycler: {err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Nav(err) => Some(err),
            Self::Recycler(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<NavError> for Error {
    fn from(err: NavError) -> Self {
        Self::Nav(err)
    }
}

impl From<RecyclerError> for Error {
    fn from(err: RecyclerError) -> Self {
        Self::Recycler(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
