#![forbid(unsafe_code)]

//! Navigable panels and their lifecycle.
//!
//! A [`Panel`] is a cheap-clone handle. The stack drives it through
//! `Created → Entering → Active → (Background ⇄ Active) → Exiting → Destroyed`;
//! every transition emits a begin event, awaits an overridable
//! [`PanelHooks`] method, then emits the matching end event.
//!
//! # Invariants
//!
//! - A panel has at most one owning stack at a time. Ownership is set when a
//!   push starts and released once the panel has exited.
//! - Each enter/exit cycle stores at most one pending animation completer per
//!   direction; [`Panel::finish_enter_animation`] and
//!   [`Panel::finish_exit_animation`] consume it exactly once.
//! - Result waiters are resolved right after the `BeginExit` event, before
//!   the exit hook runs.
//!
//! # Failure Modes
//!
//! - Hooks are called while the panel's hook object is mutably borrowed.
//!   A hook must not call back into a method that reaches its own hook
//!   object again (e.g. re-enter the panel synchronously).
//! - Reading or writing a capability through the wrong type returns
//!   [`NavError::CapabilityTypeMismatch`]; an undeclared capability returns
//!   [`NavError::MissingCapability`].

use crate::animation::Animator;
use crate::capability::Capability;
use crate::completion::{Completer, Settled, completion_pair};
use crate::config::{DEFAULT_ENTER_TRIGGER, DEFAULT_EXIT_TRIGGER};
use crate::dialog::{self, Mask};
use crate::error::NavError;
use crate::event::PanelEvent;
use crate::stack::{NavFuture, StackShared, UiStack};
use crate::transition::BindingTransition;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use panelstack_core::{SubscriptionId, Subscribers};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Future returned by lifecycle hooks.
pub type HookFuture = LocalBoxFuture<'static, ()>;

static NEXT_PANEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique panel identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u64);

impl PanelId {
    fn next() -> Self {
        Self(NEXT_PANEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel#{}", self.0)
    }
}

/// What kind of panel this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PanelRole {
    /// Full screen.
    #[default]
    Screen,
    /// Modal dialog separated from the panels beneath by a mask.
    Dialog,
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelState {
    Created,
    Entering,
    Active,
    Background,
    Exiting,
    Destroyed,
}

/// Overridable lifecycle behaviour.
///
/// Every method has a default: enter/exit play the panel's animation,
/// background/foreground complete immediately.
pub trait PanelHooks {
    fn on_enter(&mut self, panel: &Panel) -> HookFuture {
        panel.play_enter_animation()
    }

    fn on_exit(&mut self, panel: &Panel) -> HookFuture {
        panel.play_exit_animation()
    }

    fn on_enter_background(&mut self, _panel: &Panel, _covering: &Panel) -> HookFuture {
        futures::future::ready(()).boxed_local()
    }

    fn on_enter_foreground(&mut self, _panel: &Panel, _uncovering: &Panel) -> HookFuture {
        futures::future::ready(()).boxed_local()
    }
}

/// Hooks with every default behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl PanelHooks for DefaultHooks {}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Enter,
    Exit,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
        }
    }
}

type ResultWaiter = oneshot::Sender<Option<Box<dyn Any>>>;

struct PanelInner {
    id: PanelId,
    name: String,
    role: PanelRole,
    state: Cell<PanelState>,
    active: Cell<bool>,
    owner: RefCell<Weak<StackShared>>,
    hooks: RefCell<Box<dyn PanelHooks>>,
    animator: Option<Animator>,
    bindings: Vec<BindingTransition>,
    input: RefCell<Option<Capability>>,
    output: RefCell<Option<Capability>>,
    result_waiters: RefCell<Vec<ResultWaiter>>,
    pending_enter: RefCell<Option<Completer>>,
    pending_exit: RefCell<Option<Completer>>,
    mask: RefCell<Option<Mask>>,
    events: Subscribers<PanelEvent>,
}

/// Handle to a navigable panel.
#[derive(Clone)]
pub struct Panel {
    inner: Rc<PanelInner>,
}

impl PartialEq for Panel {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Panel {}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("role", &self.inner.role)
            .field("state", &self.inner.state.get())
            .field("active", &self.inner.active.get())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Panel`].
pub struct PanelBuilder {
    name: String,
    role: PanelRole,
    hooks: Box<dyn PanelHooks>,
    animator: Option<Animator>,
    bindings: Vec<BindingTransition>,
    input: Option<Capability>,
    output: Option<Capability>,
}

impl fmt::Debug for PanelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelBuilder")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("bindings", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

impl PanelBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: PanelRole::Screen,
            hooks: Box::new(DefaultHooks),
            animator: None,
            bindings: Vec::new(),
            input: None,
            output: None,
        }
    }

    /// Make this panel a dialog.
    #[must_use]
    pub fn dialog(mut self) -> Self {
        self.role = PanelRole::Dialog;
        self
    }

    /// Replace the default lifecycle hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: impl PanelHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Attach a trigger-driven animator.
    #[must_use]
    pub fn animator(mut self, animator: Animator) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Bind a transition to a trigger id.
    #[must_use]
    pub fn bind(mut self, binding: BindingTransition) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Declare that the panel accepts an input parameter of type `T`.
    #[must_use]
    pub fn accepts<T: Clone + 'static>(mut self) -> Self {
        self.input = Some(Capability::of::<T>());
        self
    }

    /// Declare that the panel produces a result of type `R`.
    #[must_use]
    pub fn provides<R: Clone + 'static>(mut self) -> Self {
        self.output = Some(Capability::of::<R>());
        self
    }

    /// Finish the panel.
    pub fn build(self) -> Panel {
        Panel {
            inner: Rc::new(PanelInner {
                id: PanelId::next(),
                name: self.name,
                role: self.role,
                state: Cell::new(PanelState::Created),
                active: Cell::new(true),
                owner: RefCell::new(Weak::new()),
                hooks: RefCell::new(self.hooks),
                animator: self.animator,
                bindings: self.bindings,
                input: RefCell::new(self.input),
                output: RefCell::new(self.output),
                result_waiters: RefCell::new(Vec::new()),
                pending_enter: RefCell::new(None),
                pending_exit: RefCell::new(None),
                mask: RefCell::new(None),
                events: Subscribers::new(),
            }),
        }
    }
}

impl Panel {
    /// Start building a panel.
    pub fn builder(name: impl Into<String>) -> PanelBuilder {
        PanelBuilder::new(name)
    }

    /// Screen panel with default hooks.
    pub fn screen(name: impl Into<String>) -> Self {
        PanelBuilder::new(name).build()
    }

    /// Dialog panel with default hooks.
    pub fn dialog(name: impl Into<String>) -> Self {
        PanelBuilder::new(name).dialog().build()
    }

    // ========================================================================
    // Identity and state
    // ========================================================================

    #[inline]
    pub fn id(&self) -> PanelId {
        self.inner.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn role(&self) -> PanelRole {
        self.inner.role
    }

    #[inline]
    pub fn is_dialog(&self) -> bool {
        self.inner.role == PanelRole::Dialog
    }

    #[inline]
    pub fn state(&self) -> PanelState {
        self.inner.state.get()
    }

    /// Whether the panel is currently enabled (visible and receiving input).
    #[inline]
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// The attached animator, if any.
    pub fn animator(&self) -> Option<&Animator> {
        self.inner.animator.as_ref()
    }

    /// Declared trigger bindings.
    pub fn bindings(&self) -> &[BindingTransition] {
        &self.inner.bindings
    }

    /// The stack that owns this panel.
    pub fn stack(&self) -> Option<UiStack> {
        self.owner().map(UiStack::from_shared)
    }

    /// The dialog mask beneath this panel, if it is a dialog on a stack.
    pub fn mask(&self) -> Option<Mask> {
        self.inner.mask.borrow().clone()
    }

    /// The panel directly beneath this one in its stack.
    pub fn under_panel(&self) -> Option<Panel> {
        self.owner()?.panel_below(self.id())
    }

    /// Enable or disable the panel from outside the stack API.
    ///
    /// For a dialog with visibility coupling enabled, the mask and the panel
    /// beneath follow the dialog's new state.
    pub fn set_active(&self, active: bool) {
        if self.inner.active.get() == active {
            return;
        }
        self.inner.active.set(active);
        if !self.is_dialog() {
            return;
        }
        if let Some(stack) = self.owner() {
            if stack.config.couple_dialog_visibility {
                dialog::couple_visibility(&stack, self, active);
            }
        }
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self, callback: impl FnMut(&PanelEvent) + 'static) -> SubscriptionId {
        self.inner.events.subscribe(callback)
    }

    /// Remove a lifecycle subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    // ========================================================================
    // Navigation shortcuts
    // ========================================================================

    /// Pop one panel from the owning stack.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn close(&self) -> NavFuture {
        match self.stack() {
            Some(stack) => stack.pop(1, false),
            None => futures::future::ready(Err(self.detached())).boxed_local(),
        }
    }

    /// Run the transition bound to `trigger`.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn activate_binding(&self, trigger: &str) -> NavFuture<Panel> {
        let binding = self
            .inner
            .bindings
            .iter()
            .find(|b| b.trigger == trigger);
        let Some(binding) = binding else {
            return futures::future::ready(Err(NavError::UnknownBinding {
                panel: self.inner.name.clone(),
                trigger: trigger.to_string(),
            }))
            .boxed_local();
        };
        match self.stack() {
            Some(stack) => stack.do_transition(&binding.transition),
            None => futures::future::ready(Err(self.detached())).boxed_local(),
        }
    }

    // ========================================================================
    // Capabilities
    // ========================================================================

    /// Deliver an input parameter.
    pub fn transfer_parameter<T: 'static>(&self, value: T) -> Result<(), NavError> {
        let mut input = self.inner.input.borrow_mut();
        let slot = self.checked_slot::<T>(input.as_mut(), "input")?;
        slot.set(value);
        Ok(())
    }

    /// The input parameter delivered so far.
    pub fn input<T: Clone + 'static>(&self) -> Result<Option<T>, NavError> {
        let mut input = self.inner.input.borrow_mut();
        let slot = self.checked_slot::<T>(input.as_mut(), "input")?;
        Ok(slot.get())
    }

    /// Set the value handed to result waiters when exit begins.
    pub fn set_result<R: 'static>(&self, value: R) -> Result<(), NavError> {
        let mut output = self.inner.output.borrow_mut();
        let slot = self.checked_slot::<R>(output.as_mut(), "result")?;
        slot.set(value);
        Ok(())
    }

    /// The current result value.
    pub fn read_result<R: Clone + 'static>(&self) -> Result<Option<R>, NavError> {
        let mut output = self.inner.output.borrow_mut();
        let slot = self.checked_slot::<R>(output.as_mut(), "result")?;
        Ok(slot.get())
    }

    /// Wait for the result value, read as soon as the panel begins exiting.
    ///
    /// The capability is checked immediately; the waiter is registered
    /// immediately too, so an exit that starts before the future is first
    /// polled is not missed.
    #[must_use]
    pub fn result<R: 'static>(&self) -> NavFuture<Option<R>> {
        match self.register_result::<R>() {
            Ok(waiting) => waiting,
            Err(err) => futures::future::ready(Err(err)).boxed_local(),
        }
    }

    pub(crate) fn register_result<R: 'static>(&self) -> Result<NavFuture<Option<R>>, NavError> {
        let expected = {
            let mut output = self.inner.output.borrow_mut();
            self.checked_slot::<R>(output.as_mut(), "result")?.type_name()
        };
        let (tx, rx) = oneshot::channel();
        self.inner.result_waiters.borrow_mut().push(tx);
        let panel = self.inner.name.clone();
        Ok(async move {
            match rx.await {
                Ok(Some(value)) => match value.downcast::<R>() {
                    Ok(value) => Ok(Some(*value)),
                    Err(_) => Err(NavError::CapabilityTypeMismatch {
                        panel,
                        capability: "result",
                        expected,
                    }),
                },
                Ok(None) => Ok(None),
                Err(oneshot::Canceled) => Err(NavError::Cancelled {
                    operation: "result",
                }),
            }
        }
        .boxed_local())
    }

    fn checked_slot<'a, T: 'static>(
        &self,
        slot: Option<&'a mut Capability>,
        capability: &'static str,
    ) -> Result<&'a mut Capability, NavError> {
        let slot = slot.ok_or_else(|| NavError::MissingCapability {
            panel: self.inner.name.clone(),
            capability,
        })?;
        if slot.holds::<T>() {
            Ok(slot)
        } else {
            Err(NavError::CapabilityTypeMismatch {
                panel: self.inner.name.clone(),
                capability,
                expected: slot.type_name(),
            })
        }
    }

    fn deliver_result(&self) {
        let waiters = std::mem::take(&mut *self.inner.result_waiters.borrow_mut());
        if waiters.is_empty() {
            return;
        }
        let output = self.inner.output.borrow();
        for waiter in waiters {
            let value = output.as_ref().and_then(Capability::clone_boxed);
            let _ = waiter.send(value);
        }
        tracing::trace!(
            target: "panelstack.panel",
            panel = %self.inner.name,
            "result delivered on exit"
        );
    }

    // ========================================================================
    // Animation
    // ========================================================================

    /// Play the enter animation and wait for it to finish.
    pub fn play_enter_animation(&self) -> HookFuture {
        self.play_animation(Phase::Enter)
    }

    /// Play the exit animation and wait for it to finish.
    pub fn play_exit_animation(&self) -> HookFuture {
        self.play_animation(Phase::Exit)
    }

    /// Report that the animator finished the enter animation.
    ///
    /// Returns `false` if no enter animation was pending.
    pub fn finish_enter_animation(&self) -> bool {
        let pending = self.inner.pending_enter.borrow_mut().take();
        Self::finish(pending)
    }

    /// Report that the animator finished the exit animation.
    ///
    /// Returns `false` if no exit animation was pending.
    pub fn finish_exit_animation(&self) -> bool {
        let pending = self.inner.pending_exit.borrow_mut().take();
        Self::finish(pending)
    }

    fn finish(pending: Option<Completer>) -> bool {
        match pending {
            Some(done) => {
                done.complete();
                true
            }
            None => false,
        }
    }

    fn play_animation(&self, phase: Phase) -> HookFuture {
        let (done, signal) = completion_pair(phase.label());
        let stack = self.owner();
        let trigger = match (&stack, phase) {
            (Some(s), Phase::Enter) => s.config.enter_trigger.clone(),
            (Some(s), Phase::Exit) => s.config.exit_trigger.clone(),
            (None, Phase::Enter) => DEFAULT_ENTER_TRIGGER.to_string(),
            (None, Phase::Exit) => DEFAULT_EXIT_TRIGGER.to_string(),
        };

        let animator = self
            .inner
            .animator
            .as_ref()
            .filter(|a| a.has_trigger(&trigger));
        if let Some(animator) = animator {
            let slot = match phase {
                Phase::Enter => &self.inner.pending_enter,
                Phase::Exit => &self.inner.pending_exit,
            };
            // A completer left over from an interrupted cycle settles here.
            let stale = slot.borrow_mut().replace(done);
            drop(stale);
            animator.set_trigger(&trigger);
        } else if let Some(driver) = stack.as_ref().and_then(|s| s.animation.clone()) {
            match phase {
                Phase::Enter => driver.play_enter(self, done),
                Phase::Exit => driver.play_exit(self, done),
            }
        } else {
            done.complete();
        }

        let name = self.inner.name.clone();
        async move {
            if signal.await == Settled::Abandoned {
                tracing::debug!(
                    target: "panelstack.panel",
                    panel = %name,
                    phase = phase.label(),
                    "animation abandoned, continuing"
                );
            }
        }
        .boxed_local()
    }

    // ========================================================================
    // Lifecycle (driven by the stack)
    // ========================================================================

    pub(crate) async fn enter(&self, stack: &Rc<StackShared>, beneath: Option<Panel>) {
        self.inner.state.set(PanelState::Entering);
        self.inner.events.emit(&PanelEvent::BeginEnter);
        if self.is_dialog() {
            dialog::attach_mask(stack, self, beneath.as_ref());
        }
        let hook = self.inner.hooks.borrow_mut().on_enter(self);
        hook.await;
        self.inner.state.set(PanelState::Active);
        self.inner.events.emit(&PanelEvent::EndEnter);
    }

    pub(crate) async fn exit(&self, stack: &Rc<StackShared>) {
        self.inner.state.set(PanelState::Exiting);
        self.inner.events.emit(&PanelEvent::BeginExit);
        self.deliver_result();
        let mask_release = if self.is_dialog() {
            dialog::release_mask(stack, self)
        } else {
            None
        };
        let hook = self.inner.hooks.borrow_mut().on_exit(self);
        match mask_release {
            Some(release) => {
                futures::join!(hook, release);
            }
            None => hook.await,
        }
        self.inner.events.emit(&PanelEvent::EndExit);
    }

    pub(crate) async fn enter_background(&self, covering: &Panel) {
        let covering_id = covering.id();
        self.inner.state.set(PanelState::Background);
        self.inner
            .events
            .emit(&PanelEvent::BeginEnterBackground {
                covering: covering_id,
            });
        let hook = self
            .inner
            .hooks
            .borrow_mut()
            .on_enter_background(self, covering);
        hook.await;
        self.inner.events.emit(&PanelEvent::EndEnterBackground {
            covering: covering_id,
        });
    }

    pub(crate) async fn enter_foreground(&self, uncovering: &Panel) {
        let uncovering_id = uncovering.id();
        self.inner
            .events
            .emit(&PanelEvent::BeginEnterForeground {
                uncovering: uncovering_id,
            });
        let hook = self
            .inner
            .hooks
            .borrow_mut()
            .on_enter_foreground(self, uncovering);
        hook.await;
        self.inner.state.set(PanelState::Active);
        self.inner.events.emit(&PanelEvent::EndEnterForeground {
            uncovering: uncovering_id,
        });
    }

    // ========================================================================
    // Ownership plumbing
    // ========================================================================

    fn owner(&self) -> Option<Rc<StackShared>> {
        self.inner.owner.borrow().upgrade()
    }

    fn detached(&self) -> NavError {
        NavError::Detached {
            panel: self.inner.name.clone(),
        }
    }

    pub(crate) fn set_owner(&self, owner: Weak<StackShared>) {
        *self.inner.owner.borrow_mut() = owner;
    }

    pub(crate) fn clear_owner(&self) {
        *self.inner.owner.borrow_mut() = Weak::new();
    }

    pub(crate) fn set_state(&self, state: PanelState) {
        self.inner.state.set(state);
    }

    /// Toggle activation without dialog coupling.
    pub(crate) fn set_active_raw(&self, active: bool) {
        self.inner.active.set(active);
    }

    pub(crate) fn set_mask(&self, mask: Option<Mask>) {
        *self.inner.mask.borrow_mut() = mask;
    }

    pub(crate) fn take_mask(&self) -> Option<Mask> {
        self.inner.mask.borrow_mut().take()
    }
}
