#![forbid(unsafe_code)]

//! Dialog masks.
//!
//! A dialog is separated from the panels beneath it by a full-bleed mask
//! layer. Consecutive dialogs share one mask: the first dialog of a run
//! creates it, later dialogs join it, and the mask always sits directly
//! beneath the topmost dialog of the run.
//!
//! # Invariants
//!
//! - A contiguous run of dialogs holds exactly one mask; its owner is the
//!   bottom-most dialog of the run.
//! - The mask layer sits immediately below the top holder's panel layer.
//! - A mask is destroyed (and its layer removed) only after its last holder
//!   has exited and the mask exit animation has settled.

use crate::completion::completion_pair;
use crate::panel::{HookFuture, Panel, PanelId};
use crate::stack::{Layer, StackShared};
use futures::FutureExt;
use panelstack_core::Rgba;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MASK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique mask identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaskId(u64);

impl MaskId {
    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mask#{}", self.0)
    }
}

struct MaskInner {
    id: MaskId,
    color: Rgba,
    visible: Cell<bool>,
    destroyed: Cell<bool>,
    holders: RefCell<Vec<PanelId>>,
}

/// Overlay layer shared by a run of dialogs.
#[derive(Clone)]
pub struct Mask {
    inner: Rc<MaskInner>,
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("id", &self.inner.id)
            .field("visible", &self.inner.visible.get())
            .field("destroyed", &self.inner.destroyed.get())
            .field("holders", &self.inner.holders.borrow())
            .finish()
    }
}

impl PartialEq for Mask {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Mask {}

impl Mask {
    fn new(color: Rgba, owner: PanelId) -> Self {
        Self {
            inner: Rc::new(MaskInner {
                id: MaskId(NEXT_MASK_ID.fetch_add(1, Ordering::Relaxed)),
                color,
                visible: Cell::new(true),
                destroyed: Cell::new(false),
                holders: RefCell::new(vec![owner]),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> MaskId {
        self.inner.id
    }

    #[inline]
    pub fn color(&self) -> Rgba {
        self.inner.color
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// The bottom-most dialog of the run.
    pub fn owner(&self) -> Option<PanelId> {
        self.inner.holders.borrow().first().copied()
    }

    /// The topmost dialog of the run; the mask sits beneath it.
    pub fn top_holder(&self) -> Option<PanelId> {
        self.inner.holders.borrow().last().copied()
    }

    /// Every dialog sharing this mask, bottom to top.
    pub fn holders(&self) -> Vec<PanelId> {
        self.inner.holders.borrow().clone()
    }

    pub(crate) fn set_visible(&self, visible: bool) {
        self.inner.visible.set(visible);
    }

    fn add_holder(&self, panel: PanelId) {
        self.inner.holders.borrow_mut().push(panel);
    }

    /// Remove `panel` from the holders. Returns whether it was the top holder.
    fn remove_holder(&self, panel: PanelId) -> bool {
        let mut holders = self.inner.holders.borrow_mut();
        let was_top = holders.last() == Some(&panel);
        holders.retain(|id| *id != panel);
        was_top
    }
}

/// Give an entering dialog its mask.
///
/// Joins the mask of a dialog directly beneath, or creates a new one and
/// starts its enter animation without waiting for it.
pub(crate) fn attach_mask(stack: &Rc<StackShared>, panel: &Panel, beneath: Option<&Panel>) {
    let inherited = beneath.filter(|b| b.is_dialog()).and_then(Panel::mask);
    match inherited {
        Some(mask) => {
            mask.add_holder(panel.id());
            stack.place_mask_below(mask.id(), panel.id());
            tracing::debug!(
                target: "panelstack.dialog",
                mask = %mask.id(),
                panel = %panel.name(),
                holders = mask.inner.holders.borrow().len(),
                "dialog joined existing mask"
            );
            panel.set_mask(Some(mask));
        }
        None => {
            let mask = Mask::new(stack.config.mask_color, panel.id());
            stack.place_mask_below(mask.id(), panel.id());
            tracing::debug!(
                target: "panelstack.dialog",
                mask = %mask.id(),
                panel = %panel.name(),
                "dialog created mask"
            );
            if let Some(driver) = &stack.animation {
                let (done, _) = completion_pair("mask_enter");
                driver.play_mask_enter(&mask, done);
            }
            panel.set_mask(Some(mask));
        }
    }
}

/// Detach an exiting dialog from its mask.
///
/// Hands the mask to the next dialog of the run when one remains. Otherwise
/// returns a future that plays the mask exit animation and then destroys the
/// mask; the caller awaits it alongside the exit hook.
pub(crate) fn release_mask(stack: &Rc<StackShared>, panel: &Panel) -> Option<HookFuture> {
    let mask = panel.take_mask()?;
    let was_top = mask.remove_holder(panel.id());

    if let Some(next_top) = mask.top_holder() {
        if was_top {
            stack.place_mask_below(mask.id(), next_top);
            tracing::debug!(
                target: "panelstack.dialog",
                mask = %mask.id(),
                next = %next_top,
                "mask handed to dialog beneath"
            );
        }
        return None;
    }

    let (done, signal) = completion_pair("mask_exit");
    match &stack.animation {
        Some(driver) => driver.play_mask_exit(&mask, done),
        None => done.complete(),
    }
    let stack = Rc::downgrade(stack);
    Some(
        async move {
            let _ = signal.await;
            if let Some(stack) = stack.upgrade() {
                stack.remove_layer(Layer::Mask(mask.id()));
            }
            mask.inner.destroyed.set(true);
            mask.set_visible(false);
            tracing::debug!(
                target: "panelstack.dialog",
                mask = %mask.id(),
                "mask destroyed"
            );
        }
        .boxed_local(),
    )
}

/// Fold the mask of `upper` into the mask of `lower` when a removal has
/// made the two dialog runs contiguous.
///
/// The upper run's mask is destroyed at once, without an exit animation;
/// the merged mask moves beneath the new top holder.
pub(crate) fn merge_runs(stack: &Rc<StackShared>, lower: &Panel, upper: &Panel) {
    if !(lower.is_dialog() && upper.is_dialog()) {
        return;
    }
    let (Some(kept), Some(merged)) = (lower.mask(), upper.mask()) else {
        return;
    };
    if kept == merged {
        return;
    }
    let moved = merged.holders();
    for panel in stack.panels() {
        if moved.contains(&panel.id()) {
            panel.set_mask(Some(kept.clone()));
        }
    }
    kept.inner.holders.borrow_mut().extend(moved.iter().copied());
    merged.inner.holders.borrow_mut().clear();
    stack.remove_layer(Layer::Mask(merged.id()));
    merged.inner.destroyed.set(true);
    merged.set_visible(false);
    if let Some(top) = kept.top_holder() {
        stack.place_mask_below(kept.id(), top);
    }
    tracing::debug!(
        target: "panelstack.dialog",
        kept = %kept.id(),
        merged = %merged.id(),
        holders = moved.len(),
        "dialog runs merged"
    );
}

/// Mirror a dialog's activation onto its mask and the panel beneath.
pub(crate) fn couple_visibility(stack: &Rc<StackShared>, panel: &Panel, active: bool) {
    if let Some(mask) = panel.mask() {
        mask.set_visible(active);
    }
    if let Some(under) = stack.panel_below(panel.id()) {
        under.set_active_raw(active);
    }
    tracing::trace!(
        target: "panelstack.dialog",
        panel = %panel.name(),
        active,
        "dialog visibility coupled"
    );
}
