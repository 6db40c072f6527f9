#![forbid(unsafe_code)]

//! Geometric primitives.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linear RGBA colour with components in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Create a new colour. Components are clamped to `[0.0, 1.0]`.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Create an opaque colour.
    #[inline]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Return the same colour with a different alpha.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Check if the colour is fully transparent.
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK.with_alpha(0.5)
    }
}

/// Scroll axis of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Items stack top to bottom; scroll offset grows downwards.
    #[default]
    Vertical,
    /// Items stack left to right; scroll offset grows rightwards.
    Horizontal,
}

impl Orientation {
    /// Whether this is the vertical axis.
    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical)
    }

    /// Sign applied to anchored positions along this axis.
    ///
    /// Vertical content grows towards negative anchored y, horizontal content
    /// towards positive anchored x.
    #[inline]
    pub const fn anchor_sign(self) -> f32 {
        match self {
            Self::Vertical => 1.0,
            Self::Horizontal => -1.0,
        }
    }
}

/// A half-open interval `[start, end)` along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    /// Create a new span. `end` is raised to `start` if smaller.
    #[inline]
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Create a span from a start and a length.
    #[inline]
    pub fn with_len(start: f32, len: f32) -> Self {
        Self::new(start, start + len.max(0.0))
    }

    /// Length of the span.
    #[inline]
    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    /// Check if the span has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Strict overlap test: touching edges do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if a point lies inside the span.
    #[inline]
    pub fn contains(&self, point: f32) -> bool {
        point >= self.start && point < self.end
    }
}
