#![forbid(unsafe_code)]

//! Recycler configuration.
//!
//! All lengths are measured along the scroll axis, in the host's layout
//! units. The config is read when the list is built and on every
//! [`RecyclerList::load`](crate::RecyclerList::load).

use crate::error::RecyclerError;
#[cfg(feature = "config-files")]
use panelstack_core::{ConfigError, config};
use panelstack_core::Orientation;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "config-files")]
use std::path::Path;

/// Velocity retained after one second of inertial scrolling.
pub const DEFAULT_DECELERATION_RATE: f32 = 0.135;

/// Layout and scrolling parameters for a [`RecyclerList`](crate::RecyclerList).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecyclerConfig {
    /// Scroll vertically. Exactly one of `vertical`/`horizontal` must be set.
    pub vertical: bool,
    /// Scroll horizontally.
    pub horizontal: bool,
    /// Visible length of the viewport.
    pub viewport_extent: f32,
    /// Length of every item view.
    pub item_extent: f32,
    /// Gap between adjacent elements, header and footer included.
    pub spacing: f32,
    /// Blank space before the first element.
    pub head_padding: f32,
    /// Blank space after the last element.
    pub foot_padding: f32,
    /// Length of the header view, if the list has one.
    pub header_extent: Option<f32>,
    /// Length of the footer view, if the list has one.
    pub footer_extent: Option<f32>,
    /// Fill the window as soon as the list is built. Default: true.
    pub load_on_start: bool,
    /// Keep scrolling after a drag is released. Default: true.
    pub inertia: bool,
    /// Fraction of velocity kept per second of inertia. Default: 0.135.
    pub deceleration_rate: f32,
}

impl Default for RecyclerConfig {
    fn default() -> Self {
        Self {
            vertical: true,
            horizontal: false,
            viewport_extent: 600.0,
            item_extent: 100.0,
            spacing: 0.0,
            head_padding: 0.0,
            foot_padding: 0.0,
            header_extent: None,
            footer_extent: None,
            load_on_start: true,
            inertia: true,
            deceleration_rate: DEFAULT_DECELERATION_RATE,
        }
    }
}

impl RecyclerConfig {
    /// Scroll along the vertical axis only.
    #[must_use]
    pub fn vertical(mut self) -> Self {
        self.vertical = true;
        self.horizontal = false;
        self
    }

    /// Scroll along the horizontal axis only.
    #[must_use]
    pub fn horizontal(mut self) -> Self {
        self.vertical = false;
        self.horizontal = true;
        self
    }

    #[must_use]
    pub fn viewport_extent(mut self, extent: f32) -> Self {
        self.viewport_extent = extent;
        self
    }

    #[must_use]
    pub fn item_extent(mut self, extent: f32) -> Self {
        self.item_extent = extent;
        self
    }

    #[must_use]
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set head and foot padding.
    #[must_use]
    pub fn padding(mut self, head: f32, foot: f32) -> Self {
        self.head_padding = head;
        self.foot_padding = foot;
        self
    }

    /// Add a header view of the given length.
    #[must_use]
    pub fn header(mut self, extent: f32) -> Self {
        self.header_extent = Some(extent);
        self
    }

    /// Add a footer view of the given length.
    #[must_use]
    pub fn footer(mut self, extent: f32) -> Self {
        self.footer_extent = Some(extent);
        self
    }

    #[must_use]
    pub fn load_on_start(mut self, enabled: bool) -> Self {
        self.load_on_start = enabled;
        self
    }

    #[must_use]
    pub fn inertia(mut self, enabled: bool) -> Self {
        self.inertia = enabled;
        self
    }

    #[must_use]
    pub fn deceleration_rate(mut self, rate: f32) -> Self {
        self.deceleration_rate = rate;
        self
    }

    /// Distance from one item's start to the next.
    #[inline]
    pub fn stride(&self) -> f32 {
        self.item_extent + self.spacing
    }

    /// The single scroll axis.
    pub fn orientation(&self) -> Result<Orientation, RecyclerError> {
        match (self.vertical, self.horizontal) {
            (true, false) => Ok(Orientation::Vertical),
            (false, true) => Ok(Orientation::Horizontal),
            (vertical, horizontal) => Err(RecyclerError::AmbiguousOrientation {
                vertical,
                horizontal,
            }),
        }
    }

    /// Every length with its field name.
    fn extents(&self) -> [(&'static str, Option<f32>); 7] {
        [
            ("viewport_extent", Some(self.viewport_extent)),
            ("item_extent", Some(self.item_extent)),
            ("spacing", Some(self.spacing)),
            ("head_padding", Some(self.head_padding)),
            ("foot_padding", Some(self.foot_padding)),
            ("header_extent", self.header_extent),
            ("footer_extent", self.footer_extent),
        ]
    }

    /// Resolve the axis and check every length, stopping at the first fault.
    pub fn check(&self) -> Result<Orientation, RecyclerError> {
        let orientation = self.orientation()?;
        for (field, value) in self.extents() {
            let Some(value) = value else { continue };
            let positive_required = field == "item_extent";
            if !value.is_finite() || value < 0.0 || (positive_required && value == 0.0) {
                return Err(RecyclerError::InvalidExtent { field, value });
            }
        }
        Ok(orientation)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(err) = self.orientation() {
            errors.push(err.to_string());
        }
        for (field, value) in self.extents() {
            let Some(value) = value else { continue };
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{field} must be a finite length >= 0, got {value}"));
            }
        }
        if self.item_extent == 0.0 {
            errors.push("item_extent must be > 0".into());
        }
        if !(0.0..=1.0).contains(&self.deceleration_rate) {
            errors.push(format!(
                "deceleration_rate must be in [0, 1], got {}",
                self.deceleration_rate
            ));
        }

        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-files")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        config::from_toml_str::<Self>(s)?.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-files")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        config::from_toml_file::<Self>(path)?.checked()
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-files")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        config::from_json_str::<Self>(s)?.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-files")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        config::from_json_file::<Self>(path)?.checked()
    }

    #[cfg(feature = "config-files")]
    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}
