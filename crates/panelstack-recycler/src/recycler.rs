#![forbid(unsafe_code)]

//! Virtualized list.
//!
//! A [`RecyclerList`] keeps only enough item views alive to cover its
//! viewport plus one overscan item. As the scroll offset changes, views that
//! leave one edge of the window are moved to the other edge and rebound to
//! the next logical index instead of being created per item.
//!
//! # Layout
//!
//! Along the scroll axis the content is laid out as
//! `head_padding, [header, spacing], item 0, spacing, item 1, ..., item n-1,
//! [spacing, footer], foot_padding`. Offsets are measured from the start of
//! the content; the viewport covers `[scroll_offset, scroll_offset + viewport)`.
//!
//! # Invariants
//!
//! - `capacity == min(ceil(viewport / stride) + 1, item_count)`, where
//!   `stride = item_extent + spacing`.
//! - After every update the bound indices are exactly
//!   `top_index..top_index + capacity`, in window order, without duplicates.
//! - Every item overlapping the viewport is bound.
//! - `0 <= scroll_offset <= max_scroll_offset()`.
//!
//! # Example
//!
//! ```
//! use panelstack_recycler::{RecyclerAdapter, RecyclerConfig, RecyclerList};
//!
//! struct Rows(usize);
//!
//! impl RecyclerAdapter<String> for Rows {
//!     fn item_count(&self) -> usize {
//!         self.0
//!     }
//!
//!     fn bind_view(&mut self, index: usize, view: &mut String) {
//!         *view = format!("item_{index}");
//!     }
//! }
//!
//! let config = RecyclerConfig::default()
//!     .viewport_extent(300.0)
//!     .item_extent(100.0);
//! let mut list = RecyclerList::new(config, Rows(1000), String::new).unwrap();
//! assert_eq!(list.capacity(), 4);
//!
//! list.scroll_to(250.0);
//! assert_eq!(list.bound_indices(), vec![2, 3, 4, 5]);
//! assert_eq!(list.view(3).map(String::as_str), Some("item_3"));
//! ```

use crate::config::RecyclerConfig;
use crate::error::RecyclerError;
use panelstack_core::{ItemPool, Orientation, Span};
use std::collections::VecDeque;
use std::fmt;

/// Below this speed inertial scrolling stops.
const MIN_VELOCITY: f32 = 1.0;

/// Data source for a [`RecyclerList`].
pub trait RecyclerAdapter<V> {
    /// Number of logical items. Read on every load.
    fn item_count(&self) -> usize;

    /// Fill `view` with the content of item `index`.
    fn bind_view(&mut self, index: usize, view: &mut V);
}

struct Slot<V> {
    index: usize,
    view: V,
}

/// Scrolling list that recycles a fixed window of views.
pub struct RecyclerList<V, A> {
    config: RecyclerConfig,
    orientation: Orientation,
    adapter: A,
    pool: ItemPool<V>,
    window: VecDeque<Slot<V>>,
    top_index: usize,
    capacity: usize,
    item_count: usize,
    content_extent: f32,
    scroll_offset: f32,
    velocity: f32,
    dragging: bool,
    header_visible: bool,
    footer_visible: bool,
    loaded: bool,
}

impl<V, A> fmt::Debug for RecyclerList<V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecyclerList")
            .field("orientation", &self.orientation)
            .field("top_index", &self.top_index)
            .field("capacity", &self.capacity)
            .field("item_count", &self.item_count)
            .field("scroll_offset", &self.scroll_offset)
            .field("velocity", &self.velocity)
            .finish_non_exhaustive()
    }
}

impl<V, A: RecyclerAdapter<V>> RecyclerList<V, A> {
    /// Build a list whose views are created by `create_view`.
    ///
    /// Fails if the config does not name exactly one axis or holds an
    /// invalid length. Loads immediately when `load_on_start` is set.
    pub fn new(
        config: RecyclerConfig,
        adapter: A,
        create_view: impl FnMut() -> V + 'static,
    ) -> Result<Self, RecyclerError> {
        Self::with_pool(config, adapter, ItemPool::new(create_view))
    }

    /// Build a list around an existing pool (e.g. one with rent/return
    /// hooks that attach views to the host's content container).
    pub fn with_pool(
        config: RecyclerConfig,
        adapter: A,
        pool: ItemPool<V>,
    ) -> Result<Self, RecyclerError> {
        let orientation = config.check()?;
        let mut list = Self {
            config,
            orientation,
            adapter,
            pool,
            window: VecDeque::new(),
            top_index: 0,
            capacity: 0,
            item_count: 0,
            content_extent: 0.0,
            scroll_offset: 0.0,
            velocity: 0.0,
            dragging: false,
            header_visible: false,
            footer_visible: false,
            loaded: false,
        };
        if list.config.load_on_start {
            list.load();
        }
        Ok(list)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Size the content and fill the window at the current scroll offset.
    ///
    /// Views held from a previous load go back to the pool first.
    pub fn load(&mut self) {
        self.return_views();
        self.item_count = self.adapter.item_count();
        self.content_extent = self.compute_content_extent();
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll_offset());

        self.capacity = if self.item_count == 0 {
            0
        } else {
            // Float-to-int casts saturate, so a huge viewport yields usize::MAX.
            let visible = (self.config.viewport_extent / self.config.stride()).ceil() as usize;
            visible.min(self.item_count).saturating_add(1).min(self.item_count)
        };

        let top = self.required_top();
        for index in top..top + self.capacity {
            let mut view = self.pool.rent();
            self.adapter.bind_view(index, &mut view);
            self.window.push_back(Slot { index, view });
        }
        self.top_index = top;
        self.loaded = true;
        self.refresh_decorations();

        tracing::debug!(
            target: "panelstack.recycler",
            item_count = self.item_count,
            capacity = self.capacity,
            content_extent = self.content_extent,
            "recycler loaded"
        );
    }

    /// Return every view, scroll back to the start, and load again.
    ///
    /// Call this whenever the adapter's item count changes.
    pub fn reload(&mut self) {
        self.scroll_offset = 0.0;
        self.velocity = 0.0;
        self.load();
    }

    /// Rebind every held view in place, e.g. after item contents change.
    pub fn refresh(&mut self) {
        for slot in &mut self.window {
            self.adapter.bind_view(slot.index, &mut slot.view);
        }
    }

    fn return_views(&mut self) {
        while let Some(slot) = self.window.pop_back() {
            self.pool.return_item(slot.view);
        }
        self.top_index = 0;
        self.capacity = 0;
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn compute_content_extent(&self) -> f32 {
        let c = &self.config;
        let header = c.header_extent.unwrap_or(0.0);
        let footer = c.footer_extent.unwrap_or(0.0);
        let elements = self.item_count
            + usize::from(c.header_extent.is_some())
            + usize::from(c.footer_extent.is_some());
        let gaps = elements.saturating_sub(1) as f32 * c.spacing;
        c.head_padding
            + c.foot_padding
            + header
            + footer
            + self.item_count as f32 * c.item_extent
            + gaps
    }

    /// Offset of item 0 from the start of the content.
    fn leading_extent(&self) -> f32 {
        let c = &self.config;
        c.head_padding + c.header_extent.map_or(0.0, |h| h + c.spacing)
    }

    /// Offset of the start of item `index` from the start of the content.
    pub fn item_start(&self, index: usize) -> f32 {
        self.leading_extent() + index as f32 * self.config.stride()
    }

    /// The span item `index` occupies along the scroll axis.
    pub fn item_span(&self, index: usize) -> Span {
        Span::with_len(self.item_start(index), self.config.item_extent)
    }

    /// Centre-pivot position of item `index` relative to the content centre.
    ///
    /// Vertical lists grow towards negative positions from the top edge;
    /// horizontal lists mirror the sign.
    pub fn anchored_position(&self, index: usize) -> f32 {
        let centre = self.item_start(index) + self.config.item_extent * 0.5;
        self.orientation.anchor_sign() * (self.content_extent * 0.5 - centre)
    }

    /// The part of the content currently visible.
    pub fn viewport_span(&self) -> Span {
        Span::with_len(self.scroll_offset, self.config.viewport_extent)
    }

    /// First item that is not entirely before the viewport, clamped so the
    /// window stays within the item count.
    fn required_top(&self) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        let passed = self.scroll_offset - self.leading_extent() - self.config.item_extent;
        let mut first = if passed < 0.0 {
            0
        } else {
            (passed / self.config.stride()).floor() as usize + 1
        };
        // Settle rounding at item edges with the same test the viewport uses.
        while first > 0 && self.item_span(first - 1).end > self.scroll_offset {
            first -= 1;
        }
        while first < self.item_count && self.item_span(first).end <= self.scroll_offset {
            first += 1;
        }
        first.min(self.item_count - self.capacity)
    }

    // ========================================================================
    // Recycling
    // ========================================================================

    /// Bring the window in line with the scroll offset.
    fn update_window(&mut self) {
        self.refresh_decorations();
        if self.capacity == 0 {
            return;
        }
        let target = self.required_top();
        if target == self.top_index {
            return;
        }

        let distance = target.abs_diff(self.top_index);
        if distance >= self.capacity {
            self.rebind_window(target);
            return;
        }

        let forward = target > self.top_index;
        if forward {
            for _ in 0..distance {
                let Some(mut slot) = self.window.pop_front() else {
                    break;
                };
                slot.index = self.top_index + self.capacity;
                self.adapter.bind_view(slot.index, &mut slot.view);
                self.window.push_back(slot);
                self.top_index += 1;
            }
        } else {
            for _ in 0..distance {
                let Some(mut slot) = self.window.pop_back() else {
                    break;
                };
                self.top_index -= 1;
                slot.index = self.top_index;
                self.adapter.bind_view(slot.index, &mut slot.view);
                self.window.push_front(slot);
            }
        }
        tracing::trace!(
            target: "panelstack.recycler",
            moved = distance,
            top_index = self.top_index,
            forward,
            "recycled edge views"
        );
    }

    /// Rebind the whole window to `top..top + capacity`.
    fn rebind_window(&mut self, top: usize) {
        for (offset, slot) in self.window.iter_mut().enumerate() {
            slot.index = top + offset;
            self.adapter.bind_view(slot.index, &mut slot.view);
        }
        tracing::debug!(
            target: "panelstack.recycler",
            from = self.top_index,
            to = top,
            capacity = self.capacity,
            "window jumped, rebinding every view"
        );
        self.top_index = top;
    }

    fn refresh_decorations(&mut self) {
        let c = &self.config;
        let viewport = self.viewport_span();
        self.header_visible = c
            .header_extent
            .is_some_and(|h| Span::with_len(c.head_padding, h).overlaps(&viewport));
        let content_extent = self.content_extent;
        self.footer_visible = c.footer_extent.is_some_and(|f| {
            Span::with_len(content_extent - c.foot_padding - f, f).overlaps(&viewport)
        });
    }

    // ========================================================================
    // Scrolling
    // ========================================================================

    /// Scroll so the viewport starts at `offset`, clamped to the content.
    pub fn scroll_to(&mut self, offset: f32) {
        if !offset.is_finite() {
            return;
        }
        self.scroll_offset = offset.clamp(0.0, self.max_scroll_offset());
        self.update_window();
    }

    /// Scroll by `delta` along the axis.
    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.scroll_offset + delta);
    }

    /// Scroll so item `index` starts at the top of the viewport, as far as
    /// the content allows.
    pub fn scroll_to_index(&mut self, index: usize) {
        if self.item_count == 0 {
            return;
        }
        self.scroll_to(self.item_start(index.min(self.item_count - 1)));
    }

    /// Scroll position in `[0, 1]`, 0 at the start of the content.
    pub fn normalized_position(&self) -> f32 {
        let max = self.max_scroll_offset();
        if max > 0.0 {
            self.scroll_offset / max
        } else {
            0.0
        }
    }

    /// Scroll to a position in `[0, 1]`.
    pub fn set_normalized_position(&mut self, position: f32) {
        self.scroll_to(position.clamp(0.0, 1.0) * self.max_scroll_offset());
    }

    // ------------------------------------------------------------------------
    // Drag and inertia
    // ------------------------------------------------------------------------

    /// A pointer drag started. Any inertial motion stops.
    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.velocity = 0.0;
    }

    /// The pointer moved by `delta` over `dt` seconds.
    pub fn drag_by(&mut self, delta: f32, dt: f32) {
        self.scroll_by(delta);
        if dt > 0.0 {
            self.velocity = delta / dt;
        }
    }

    /// The pointer was released. The list keeps the last drag velocity when
    /// inertia is enabled.
    pub fn end_drag(&mut self) {
        self.dragging = false;
        if !self.config.inertia {
            self.velocity = 0.0;
        }
    }

    /// Start an inertial scroll at `velocity` units per second.
    pub fn fling(&mut self, velocity: f32) {
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }

    /// Advance inertial scrolling by `dt` seconds.
    ///
    /// Returns whether the list moved.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.dragging || self.velocity == 0.0 || dt <= 0.0 {
            return false;
        }
        self.velocity *= self.config.deceleration_rate.powf(dt);
        if self.velocity.abs() < MIN_VELOCITY {
            self.velocity = 0.0;
            return false;
        }
        let before = self.scroll_offset;
        self.scroll_by(self.velocity * dt);
        let max = self.max_scroll_offset();
        if self.scroll_offset <= 0.0 || self.scroll_offset >= max {
            self.velocity = 0.0;
        }
        self.scroll_offset != before
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &RecyclerConfig {
        &self.config
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Mutable access to the adapter. Call [`RecyclerList::reload`] after
    /// changing its item count.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn pool(&self) -> &ItemPool<V> {
        &self.pool
    }

    /// Number of views kept alive.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Logical index bound to the first view of the window.
    #[inline]
    pub fn top_index(&self) -> usize {
        self.top_index
    }

    /// Logical index bound to the last view of the window.
    pub fn bottom_index(&self) -> Option<usize> {
        self.window.back().map(|slot| slot.index)
    }

    /// Item count read at the last load.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Total length of the scrollable content.
    #[inline]
    pub fn content_extent(&self) -> f32 {
        self.content_extent
    }

    #[inline]
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn max_scroll_offset(&self) -> f32 {
        (self.content_extent - self.config.viewport_extent).max(0.0)
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Dragging or coasting.
    pub fn is_moving(&self) -> bool {
        self.dragging || self.velocity != 0.0
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn header_visible(&self) -> bool {
        self.header_visible
    }

    pub fn footer_visible(&self) -> bool {
        self.footer_visible
    }

    /// Logical indices bound to the window, in window order.
    pub fn bound_indices(&self) -> Vec<usize> {
        self.window.iter().map(|slot| slot.index).collect()
    }

    /// Bound views with their logical indices, in window order.
    pub fn views(&self) -> impl Iterator<Item = (usize, &V)> {
        self.window.iter().map(|slot| (slot.index, &slot.view))
    }

    /// The view bound to `index`, if it is inside the window.
    pub fn view(&self, index: usize) -> Option<&V> {
        let offset = index.checked_sub(self.top_index)?;
        self.window
            .get(offset)
            .filter(|slot| slot.index == index)
            .map(|slot| &slot.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Labels {
        count: usize,
        binds: usize,
    }

    impl RecyclerAdapter<String> for Labels {
        fn item_count(&self) -> usize {
            self.count
        }

        fn bind_view(&mut self, index: usize, view: &mut String) {
            self.binds += 1;
            *view = format!("item_{index}");
        }
    }

    fn list(config: RecyclerConfig, count: usize) -> RecyclerList<String, Labels> {
        RecyclerList::new(config, Labels { count, binds: 0 }, String::new).expect("valid config")
    }

    #[test]
    fn content_extent_counts_every_gap() {
        let cfg = RecyclerConfig::default()
            .item_extent(50.0)
            .spacing(10.0)
            .padding(5.0, 7.0)
            .header(30.0)
            .footer(20.0);
        let l = list(cfg, 4);
        // 5 + 7 + 30 + 20 + 4*50 + (4 + 2 - 1) * 10
        assert_eq!(l.content_extent(), 312.0);
        assert_eq!(l.item_start(0), 45.0);
        assert_eq!(l.item_start(2), 165.0);
    }

    #[test]
    fn empty_list_has_no_gaps() {
        let l = list(RecyclerConfig::default().spacing(10.0), 0);
        assert_eq!(l.content_extent(), 0.0);
        assert_eq!(l.capacity(), 0);
        assert!(l.bound_indices().is_empty());
    }

    #[test]
    fn huge_viewport_clamps_capacity_to_item_count() {
        let cfg = RecyclerConfig::default()
            .viewport_extent(1e20)
            .item_extent(1.0);
        assert!(cfg.check().is_ok());
        let mut l = list(cfg, 50);
        assert_eq!(l.capacity(), 50);
        assert_eq!(l.bound_indices(), (0..50).collect::<Vec<_>>());
        assert_eq!(l.max_scroll_offset(), 0.0);

        l.adapter_mut().count = 3;
        l.reload();
        assert_eq!(l.capacity(), 3);
        assert_eq!(l.bound_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn anchored_position_mirrors_for_horizontal() {
        let cfg = RecyclerConfig::default().viewport_extent(200.0).item_extent(100.0);
        let v = list(cfg.clone(), 4);
        let h = list(cfg.horizontal(), 4);
        // content 400, centre 200; item 0 centre 50
        assert_eq!(v.anchored_position(0), 150.0);
        assert_eq!(h.anchored_position(0), -150.0);
        assert_eq!(v.anchored_position(3), -150.0);
    }

    #[test]
    fn required_top_treats_touching_edges_as_hidden() {
        let mut l = list(RecyclerConfig::default().viewport_extent(300.0), 100);
        l.scroll_to(99.0);
        assert_eq!(l.top_index(), 0);
        l.scroll_to(100.0);
        assert_eq!(l.top_index(), 1);
    }

    #[test]
    fn incremental_scroll_binds_only_new_edges() {
        let mut l = list(RecyclerConfig::default().viewport_extent(300.0), 100);
        let initial = l.adapter().binds;
        assert_eq!(initial, 4);
        l.scroll_by(150.0);
        assert_eq!(l.bound_indices(), vec![1, 2, 3, 4]);
        assert_eq!(l.adapter().binds, initial + 1);
        l.scroll_by(-150.0);
        assert_eq!(l.bound_indices(), vec![0, 1, 2, 3]);
        assert_eq!(l.adapter().binds, initial + 2);
    }

    #[test]
    fn view_lookup_respects_window() {
        let mut l = list(RecyclerConfig::default().viewport_extent(300.0), 100);
        l.scroll_to(1_000.0);
        assert_eq!(l.view(10).map(String::as_str), Some("item_10"));
        assert!(l.view(2).is_none());
        assert!(l.view(40).is_none());
    }

    #[test]
    fn non_finite_scroll_is_ignored() {
        let mut l = list(RecyclerConfig::default(), 100);
        l.scroll_to(f32::NAN);
        assert_eq!(l.scroll_offset(), 0.0);
    }
}
