#![forbid(unsafe_code)]

//! The navigation stack.
//!
//! [`UiStack`] owns an ordered list of panels (bottom to top) and an explicit
//! z-order of layers (panels and dialog masks). Every navigation request
//! (push, pop, replace, remove, close) goes through one FIFO work queue and
//! runs to completion before the next one starts.
//!
//! # Scheduling
//!
//! Request methods do their validation and queueing synchronously and return
//! a future. By default nothing is spawned: the queue is drained by whichever
//! returned future is polled, or by [`UiStack::drive`], so a host must poll
//! one of them on its single-threaded executor. A stack built with
//! [`UiStackBuilder::spawner`] hands the queue to that executor instead, and
//! requests run even when their futures are dropped. A caller's future
//! resolves once its own request has finished, which may be after earlier
//! queued requests.
//!
//! # Invariants
//!
//! - At most one request is in flight. Requests run in arrival order; none
//!   are reordered or coalesced.
//! - `is_interactable()` is false while a request is in flight, while any
//!   request is queued, and while a transition is resolving its panel from
//!   the factory. It is true otherwise.
//! - `pop`/`remove` are validated against the depth the stack will have once
//!   every accepted request has run. A rejected request returns an error and
//!   leaves the stack untouched.
//!
//! # Failure Modes
//!
//! - A hook or animation that never settles stalls the queue. No timeout is
//!   applied.
//! - Dropping a request future only discards its reply. A request that has
//!   started always runs to completion once the queue is driven again, and
//!   queued requests keep the stack alive until they have run.
//! - Without a spawner, dropping every future that could drain the queue
//!   pauses it; the next request or [`UiStack::drive`] resumes draining.
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use panelstack_nav::{Panel, RegistryPanelFactory, UiStack};
//! use std::rc::Rc;
//!
//! let stack = UiStack::new(Rc::new(RegistryPanelFactory::new()));
//! block_on(stack.push(Panel::screen("Home"), true)).unwrap();
//! block_on(stack.push(Panel::screen("Settings"), true)).unwrap();
//! assert_eq!(stack.depth(), 2);
//! assert_eq!(stack.top().map(|p| p.name().to_string()).as_deref(), Some("Settings"));
//!
//! block_on(stack.pop(1, false)).unwrap();
//! assert_eq!(stack.depth(), 1);
//! assert!(stack.is_interactable());
//! ```

use crate::animation::AnimationDriver;
use crate::config::StackConfig;
use crate::dialog::{self, Mask, MaskId};
use crate::error::NavError;
use crate::event::StackEvent;
use crate::factory::PanelFactory;
use crate::panel::{Panel, PanelId, PanelState};
use crate::transition::{Operation, Transition};
use futures::channel::oneshot;
use futures::future::{Either, LocalBoxFuture, Shared};
use futures::task::{LocalSpawn, LocalSpawnExt};
use futures::FutureExt;
use panelstack_core::{SubscriptionId, Subscribers};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::Instrument;
use web_time::Instant;

/// Future returned by navigation requests.
pub type NavFuture<T = ()> = LocalBoxFuture<'static, Result<T, NavError>>;

type Drainer = Shared<LocalBoxFuture<'static, ()>>;

/// One entry of the stack's z-order, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Panel(PanelId),
    Mask(MaskId),
}

// ============================================================================
// Requests
// ============================================================================

enum Request {
    Push {
        panel: Panel,
        disable_under: bool,
    },
    Pop {
        count: usize,
        disable_under: bool,
    },
    Replace {
        panel: Panel,
        disable_under: bool,
    },
    Remove {
        offset: usize,
        count: usize,
        disable_under: bool,
    },
    /// Take one specific panel off, wherever it sits when the request runs.
    Close {
        panel: Panel,
        disable_under: bool,
    },
}

impl Request {
    fn kind(&self) -> &'static str {
        match self {
            Self::Push { .. } => "push",
            Self::Pop { .. } => "pop",
            Self::Replace { .. } => "replace",
            Self::Remove { .. } => "remove",
            Self::Close { .. } => "close",
        }
    }

    /// Depth after this request runs on a stack of `depth` panels.
    fn project(&self, depth: usize) -> Result<usize, NavError> {
        match *self {
            Self::Push { .. } => Ok(depth + 1),
            Self::Replace { .. } => Ok(depth.max(1)),
            Self::Pop { count, .. } => {
                if count == 0 {
                    Err(NavError::EmptyRequest)
                } else if count > depth {
                    Err(NavError::PopOutOfRange {
                        requested: count,
                        depth,
                    })
                } else {
                    Ok(depth - count)
                }
            }
            Self::Remove { offset, count, .. } => {
                if count == 0 {
                    Err(NavError::EmptyRequest)
                } else if offset.checked_add(count).is_none_or(|end| end > depth) {
                    Err(NavError::RemoveOutOfRange {
                        offset,
                        count,
                        depth,
                    })
                } else {
                    Ok(depth - count)
                }
            }
            // A panel already gone by then makes this a no-op; the projection
            // is corrected once the request has run.
            Self::Close { .. } => Ok(depth.saturating_sub(1)),
        }
    }
}

struct Pending {
    request: Request,
    reply: oneshot::Sender<Result<(), NavError>>,
}

// ============================================================================
// Shared state
// ============================================================================

struct StackState {
    panels: Vec<Panel>,
    layers: Vec<Layer>,
    queue: VecDeque<Pending>,
    projected_depth: usize,
    input_locks: usize,
    pushing: bool,
    popping: bool,
    interactable: bool,
    /// Set while requests are queued or running, cleared when the drain
    /// loop finds the queue empty.
    drainer: Option<Drainer>,
}

impl StackState {
    fn new() -> Self {
        Self {
            panels: Vec::new(),
            layers: Vec::new(),
            queue: VecDeque::new(),
            projected_depth: 0,
            input_locks: 0,
            pushing: false,
            popping: false,
            interactable: true,
            drainer: None,
        }
    }

    /// Recompute the projected depth from the live panels and the queue.
    fn reproject(&mut self) {
        let mut depth = self.panels.len();
        for pending in &self.queue {
            depth = pending.request.project(depth).unwrap_or(depth);
        }
        self.projected_depth = depth;
    }
}

pub(crate) struct StackShared {
    pub(crate) config: StackConfig,
    pub(crate) animation: Option<Rc<dyn AnimationDriver>>,
    factory: Rc<dyn PanelFactory>,
    spawner: Option<Rc<dyn LocalSpawn>>,
    state: RefCell<StackState>,
    events: Subscribers<StackEvent>,
    interactivity: Subscribers<bool>,
}

/// Keeps global input disabled while alive.
struct InputLock {
    stack: Rc<StackShared>,
}

impl InputLock {
    fn acquire(stack: &Rc<StackShared>) -> Self {
        stack.state.borrow_mut().input_locks += 1;
        stack.refresh_interactable();
        Self {
            stack: Rc::clone(stack),
        }
    }
}

impl Drop for InputLock {
    fn drop(&mut self) {
        {
            let mut state = self.stack.state.borrow_mut();
            state.input_locks = state.input_locks.saturating_sub(1);
        }
        self.stack.refresh_interactable();
    }
}

impl StackShared {
    fn refresh_interactable(&self) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let value = state.input_locks == 0 && state.queue.is_empty();
            if state.interactable == value {
                None
            } else {
                state.interactable = value;
                Some(value)
            }
        };
        if let Some(value) = changed {
            tracing::trace!(
                target: "panelstack.stack",
                interactable = value,
                "input toggled"
            );
            self.interactivity.emit(&value);
        }
    }

    fn top(&self) -> Option<Panel> {
        self.state.borrow().panels.last().cloned()
    }

    fn depth(&self) -> usize {
        self.state.borrow().panels.len()
    }

    pub(crate) fn panels(&self) -> Vec<Panel> {
        self.state.borrow().panels.clone()
    }

    pub(crate) fn panel_below(&self, id: PanelId) -> Option<Panel> {
        let state = self.state.borrow();
        match state.panels.iter().position(|p| p.id() == id) {
            Some(index) => index
                .checked_sub(1)
                .and_then(|below| state.panels.get(below).cloned()),
            // Entering or exiting panels sit above the recorded top.
            None => state.panels.last().cloned(),
        }
    }

    // ------------------------------------------------------------------------
    // Layers
    // ------------------------------------------------------------------------

    fn attach(self: &Rc<Self>, panel: &Panel) {
        panel.set_owner(Rc::downgrade(self));
        panel.set_active_raw(true);
        let layer = Layer::Panel(panel.id());
        let mut state = self.state.borrow_mut();
        state.layers.retain(|l| *l != layer);
        state.layers.push(layer);
    }

    fn detach(&self, panel: &Panel) {
        self.remove_layer(Layer::Panel(panel.id()));
        panel.clear_owner();
        panel.set_state(PanelState::Destroyed);
    }

    pub(crate) fn place_mask_below(&self, mask: MaskId, panel: PanelId) {
        let mut state = self.state.borrow_mut();
        state.layers.retain(|l| *l != Layer::Mask(mask));
        let index = state
            .layers
            .iter()
            .position(|l| *l == Layer::Panel(panel))
            .unwrap_or(state.layers.len());
        state.layers.insert(index, Layer::Mask(mask));
    }

    pub(crate) fn remove_layer(&self, layer: Layer) {
        self.state.borrow_mut().layers.retain(|l| *l != layer);
    }

    // ------------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------------

    fn submit(self: &Rc<Self>, request: Request) -> NavFuture {
        let operation = request.kind();
        let queued = {
            let mut state = self.state.borrow_mut();
            match request.project(state.projected_depth) {
                Ok(depth) => {
                    let busy = state.input_locks > 0 || !state.queue.is_empty();
                    if busy {
                        if let Request::Push { panel, .. } | Request::Replace { panel, .. } =
                            &request
                        {
                            panel.set_active_raw(false);
                        }
                    }
                    state.projected_depth = depth;
                    let (reply, rx) = oneshot::channel();
                    state.queue.push_back(Pending { request, reply });
                    Ok((rx, state.queue.len(), busy))
                }
                Err(err) => Err(err),
            }
        };

        let (rx, queue_len, busy) = match queued {
            Ok(queued) => queued,
            Err(err) => {
                tracing::error!(
                    target: "panelstack.stack",
                    operation,
                    error = %err,
                    "navigation request rejected"
                );
                return futures::future::ready(Err(err)).boxed_local();
            }
        };
        if busy {
            tracing::debug!(
                target: "panelstack.stack",
                operation,
                queue_len,
                "navigation request queued"
            );
        }
        self.refresh_interactable();

        let drainer = self.drainer();
        async move {
            let reply = match futures::future::select(rx, drainer).await {
                Either::Left((reply, _)) => reply,
                Either::Right(((), rx)) => rx.await,
            };
            reply.unwrap_or(Err(NavError::Cancelled { operation }))
        }
        .boxed_local()
    }

    /// The future draining the queue, shared by every pending request.
    ///
    /// The stack keeps the drainer alive until the queue is empty, so a
    /// request runs to completion even if every caller future is dropped.
    /// A new drainer is handed to the spawner, when one is configured.
    fn drainer(self: &Rc<Self>) -> Drainer {
        let fresh = {
            let mut state = self.state.borrow_mut();
            if let Some(running) = &state.drainer {
                return running.clone();
            }
            let drainer = Rc::clone(self).drain().boxed_local().shared();
            state.drainer = Some(drainer.clone());
            drainer
        };
        if let Some(spawner) = &self.spawner {
            if let Err(err) = spawner.spawn_local(fresh.clone()) {
                tracing::warn!(
                    target: "panelstack.stack",
                    error = %err,
                    "spawner rejected the queue drainer, requests wait for a poll"
                );
            }
        }
        fresh
    }

    async fn drain(self: Rc<Self>) {
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let next = state.queue.pop_front();
                if next.is_none() {
                    state.drainer = None;
                }
                next
            };
            let Some(Pending { request, reply }) = next else {
                break;
            };
            let lock = InputLock::acquire(&self);
            let result = self.run(request).await;
            self.state.borrow_mut().reproject();
            // The caller may have stopped waiting.
            let _ = reply.send(result);
            drop(lock);
        }
    }

    async fn run(self: &Rc<Self>, request: Request) -> Result<(), NavError> {
        match request {
            Request::Push {
                panel,
                disable_under,
            } => {
                self.run_push(panel, disable_under, true).await;
                Ok(())
            }
            Request::Pop {
                count,
                disable_under,
            } => {
                let depth = self.depth();
                if count > depth {
                    return Err(NavError::PopOutOfRange {
                        requested: count,
                        depth,
                    });
                }
                self.run_pop(count, disable_under, true).await;
                Ok(())
            }
            Request::Replace {
                panel,
                disable_under,
            } => {
                if self.depth() == 0 {
                    self.run_push(panel, disable_under, true).await;
                } else {
                    futures::join!(
                        self.run_pop(1, disable_under, false),
                        self.run_push(panel, disable_under, false)
                    );
                }
                Ok(())
            }
            Request::Remove {
                offset,
                count,
                disable_under,
            } => {
                let depth = self.depth();
                if offset.checked_add(count).is_none_or(|end| end > depth) {
                    return Err(NavError::RemoveOutOfRange {
                        offset,
                        count,
                        depth,
                    });
                }
                if offset == 0 {
                    self.run_pop(count, disable_under, true).await;
                } else {
                    self.run_remove(offset, count, disable_under).await;
                }
                Ok(())
            }
            Request::Close {
                panel,
                disable_under,
            } => {
                let offset = {
                    let state = self.state.borrow();
                    state
                        .panels
                        .iter()
                        .rposition(|p| *p == panel)
                        .map(|index| state.panels.len() - 1 - index)
                };
                match offset {
                    Some(0) => self.run_pop(1, disable_under, true).await,
                    Some(offset) => self.run_remove(offset, 1, disable_under).await,
                    None => tracing::debug!(
                        target: "panelstack.stack",
                        panel = %panel.name(),
                        "close skipped, panel already left the stack"
                    ),
                }
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Protocols
    // ------------------------------------------------------------------------

    async fn run_push(self: &Rc<Self>, panel: Panel, disable_under: bool, background: bool) {
        let span = tracing::debug_span!(
            "stack.push",
            panel = %panel.name(),
            depth = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        async {
            let start = Instant::now();
            self.events.emit(&StackEvent::BeginPush { panel: panel.id() });
            let beneath = {
                let mut state = self.state.borrow_mut();
                state.pushing = true;
                state.panels.last().cloned()
            };
            self.attach(&panel);

            if background {
                if let Some(under) = &beneath {
                    under.enter_background(&panel).await;
                }
            }
            panel.enter(self, beneath.clone()).await;
            if let Some(under) = &beneath {
                under.set_active_raw(!disable_under);
            }

            let depth = {
                let mut state = self.state.borrow_mut();
                state.panels.push(panel.clone());
                state.pushing = false;
                state.panels.len()
            };
            let span = tracing::Span::current();
            span.record("depth", depth as u64);
            span.record("duration_us", start.elapsed().as_micros() as u64);
            tracing::debug!(
                target: "panelstack.stack",
                panel = %panel.name(),
                depth,
                "push complete"
            );
            self.events.emit(&StackEvent::EndPush { panel: panel.id() });
        }
        .instrument(span)
        .await
    }

    async fn run_pop(self: &Rc<Self>, count: usize, disable_under: bool, foreground: bool) {
        let span = tracing::debug_span!(
            "stack.pop",
            count = count as u64,
            depth = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        async {
            let start = Instant::now();
            self.state.borrow_mut().popping = true;
            for _ in 0..count {
                let Some(panel) = self.top() else {
                    break;
                };
                self.events.emit(&StackEvent::BeginPop { panel: panel.id() });
                let beneath = {
                    let mut state = self.state.borrow_mut();
                    state.panels.pop();
                    state.panels.last().cloned()
                };
                self.retire(panel, beneath, disable_under, foreground).await;
            }
            let depth = {
                let mut state = self.state.borrow_mut();
                state.popping = false;
                state.panels.len()
            };
            let span = tracing::Span::current();
            span.record("depth", depth as u64);
            span.record("duration_us", start.elapsed().as_micros() as u64);
            tracing::debug!(
                target: "panelstack.stack",
                count,
                depth,
                "pop complete"
            );
        }
        .instrument(span)
        .await
    }

    async fn run_remove(self: &Rc<Self>, offset: usize, count: usize, disable_under: bool) {
        let span = tracing::debug_span!(
            "stack.remove",
            offset = offset as u64,
            count = count as u64,
            duration_us = tracing::field::Empty,
        );
        async {
            let start = Instant::now();
            self.state.borrow_mut().popping = true;
            for _ in 0..count {
                let target = {
                    let state = self.state.borrow();
                    state
                        .panels
                        .len()
                        .checked_sub(offset + 1)
                        .and_then(|index| state.panels.get(index).cloned())
                };
                let Some(panel) = target else {
                    break;
                };
                self.events.emit(&StackEvent::BeginPop { panel: panel.id() });
                let beneath = {
                    let mut state = self.state.borrow_mut();
                    match state.panels.iter().position(|p| *p == panel) {
                        Some(index) => {
                            state.panels.remove(index);
                            index
                                .checked_sub(1)
                                .and_then(|below| state.panels.get(below).cloned())
                        }
                        None => None,
                    }
                };
                // The top is unaffected, so nothing returns to the foreground.
                self.retire(panel, beneath, disable_under, false).await;
            }
            let seam = {
                let state = self.state.borrow();
                let above = state.panels.len().checked_sub(offset);
                above.and_then(|above| {
                    let lower = state.panels.get(above.checked_sub(1)?)?;
                    Some((lower.clone(), state.panels.get(above)?.clone()))
                })
            };
            if let Some((lower, upper)) = seam {
                dialog::merge_runs(self, &lower, &upper);
            }
            self.state.borrow_mut().popping = false;
            tracing::Span::current()
                .record("duration_us", start.elapsed().as_micros() as u64);
            tracing::debug!(
                target: "panelstack.stack",
                offset,
                count,
                "remove complete"
            );
        }
        .instrument(span)
        .await
    }

    /// Exit a panel already taken off the list, recycle it, and reveal the
    /// panel beneath.
    async fn retire(
        self: &Rc<Self>,
        panel: Panel,
        beneath: Option<Panel>,
        disable_under: bool,
        foreground: bool,
    ) {
        if let Some(under) = &beneath {
            under.set_active_raw(!disable_under);
        }
        panel.exit(self).await;
        self.detach(&panel);
        self.factory.recycle_panel(panel.clone());
        if foreground {
            if let Some(under) = &beneath {
                under.enter_foreground(&panel).await;
            }
        }
        self.events.emit(&StackEvent::EndPop { panel: panel.id() });
    }
}

// ============================================================================
// Public handle
// ============================================================================

/// Builder for [`UiStack`].
pub struct UiStackBuilder {
    factory: Rc<dyn PanelFactory>,
    config: StackConfig,
    animation: Option<Rc<dyn AnimationDriver>>,
    spawner: Option<Rc<dyn LocalSpawn>>,
}

impl fmt::Debug for UiStackBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiStackBuilder")
            .field("config", &self.config)
            .field("animation", &self.animation.is_some())
            .field("spawner", &self.spawner.is_some())
            .finish_non_exhaustive()
    }
}

impl UiStackBuilder {
    /// Start a builder around `factory`.
    pub fn new(factory: Rc<dyn PanelFactory>) -> Self {
        Self {
            factory,
            config: StackConfig::default(),
            animation: None,
            spawner: None,
        }
    }

    /// Use `config` instead of the defaults.
    #[must_use]
    pub fn config(mut self, config: StackConfig) -> Self {
        self.config = config;
        self
    }

    /// Fallback animation provider for panels without a matching animator.
    #[must_use]
    pub fn animation_driver(mut self, driver: Rc<dyn AnimationDriver>) -> Self {
        self.animation = Some(driver);
        self
    }

    /// Run the request queue on `spawner`, so requests make progress even
    /// when their futures are dropped unpolled.
    #[must_use]
    pub fn spawner(mut self, spawner: Rc<dyn LocalSpawn>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Build the stack.
    pub fn build(self) -> UiStack {
        let problems = self.config.validate();
        if !problems.is_empty() {
            tracing::warn!(
                target: "panelstack.stack",
                problems = ?problems,
                "stack built with invalid config"
            );
        }
        UiStack {
            shared: Rc::new(StackShared {
                config: self.config,
                animation: self.animation,
                factory: self.factory,
                spawner: self.spawner,
                state: RefCell::new(StackState::new()),
                events: Subscribers::new(),
                interactivity: Subscribers::new(),
            }),
        }
    }
}

/// Cheap-clone handle to a navigation stack.
#[derive(Clone)]
pub struct UiStack {
    shared: Rc<StackShared>,
}

impl fmt::Debug for UiStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("UiStack")
            .field("depth", &state.panels.len())
            .field("queued", &state.queue.len())
            .field("interactable", &state.interactable)
            .finish_non_exhaustive()
    }
}

impl UiStack {
    /// Stack with default config and no animation driver.
    pub fn new(factory: Rc<dyn PanelFactory>) -> Self {
        UiStackBuilder::new(factory).build()
    }

    /// Start configuring a stack.
    pub fn builder(factory: Rc<dyn PanelFactory>) -> UiStackBuilder {
        UiStackBuilder::new(factory)
    }

    pub(crate) fn from_shared(shared: Rc<StackShared>) -> Self {
        Self { shared }
    }

    pub fn config(&self) -> &StackConfig {
        &self.shared.config
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Push `panel` on top.
    ///
    /// Protocol: `BeginPush`, input disabled, panel attached, the panel
    /// beneath enters background, the new panel enters, the panel beneath is
    /// disabled if `disable_under_panel`, the panel is recorded as top,
    /// `EndPush`.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn push(&self, panel: Panel, disable_under_panel: bool) -> NavFuture {
        self.shared.submit(Request::Push {
            panel,
            disable_under: disable_under_panel,
        })
    }

    /// Push several panels in order, disabling each panel beneath.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn push_all(&self, panels: impl IntoIterator<Item = Panel>) -> NavFuture {
        let pushes: Vec<NavFuture> = panels
            .into_iter()
            .map(|panel| self.push(panel, true))
            .collect();
        async move {
            futures::future::try_join_all(pushes).await?;
            Ok(())
        }
        .boxed_local()
    }

    /// Pop `count` panels.
    ///
    /// Fails with [`NavError::PopOutOfRange`] without touching the stack if
    /// `count` exceeds the depth the stack will have once queued requests run.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn pop(&self, count: usize, disable_under_panel: bool) -> NavFuture {
        self.shared.submit(Request::Pop {
            count,
            disable_under: disable_under_panel,
        })
    }

    /// Swap the top panel for `panel`.
    ///
    /// The old top starts exiting before the new panel starts entering; the
    /// panel beneath receives neither background nor foreground hooks. On an
    /// empty stack this is a push.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn replace(&self, panel: Panel, disable_under_panel: bool) -> NavFuture {
        self.shared.submit(Request::Replace {
            panel,
            disable_under: disable_under_panel,
        })
    }

    /// Remove `count` panels starting `offset` panels below the top.
    ///
    /// Panels above the window stay in place. With `offset == 0` this is a
    /// pop.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn remove(&self, offset: usize, count: usize, disable_under_panel: bool) -> NavFuture {
        self.shared.submit(Request::Remove {
            offset,
            count,
            disable_under: disable_under_panel,
        })
    }

    /// Take `panel` off the stack, wherever it sits once earlier requests
    /// have run.
    ///
    /// The top panel is popped; a panel further down is removed. Resolves
    /// without touching the stack if `panel` has already left it.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn close(&self, panel: &Panel) -> NavFuture {
        self.shared.submit(Request::Close {
            panel: panel.clone(),
            disable_under: false,
        })
    }

    /// Run queued requests to completion.
    ///
    /// Resolves at once when nothing is queued. Requests whose futures were
    /// dropped keep their place in the queue; this drives them without
    /// holding on to each one.
    pub fn drive(&self) -> LocalBoxFuture<'static, ()> {
        let idle = {
            let state = self.shared.state.borrow();
            state.drainer.is_none() && state.queue.is_empty()
        };
        if idle {
            return futures::future::ready(()).boxed_local();
        }
        self.shared.drainer().boxed_local()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Create the destination panel through the factory and push or replace it.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn do_transition(&self, transition: &Transition) -> NavFuture<Panel> {
        let resolved = self.resolve(transition, |_| Ok(()));
        async move { resolved.await.map(|(panel, ())| panel) }.boxed_local()
    }

    /// Like [`UiStack::do_transition`], delivering `input` before the panel
    /// enters.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn do_transition_with<T: 'static>(
        &self,
        transition: &Transition,
        input: T,
    ) -> NavFuture<Panel> {
        let resolved = self.resolve(transition, move |panel| panel.transfer_parameter(input));
        async move { resolved.await.map(|(panel, ())| panel) }.boxed_local()
    }

    /// Run a transition and wait for the destination's result, read when it
    /// begins exiting.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn do_transition_for_result<R: 'static>(
        &self,
        transition: &Transition,
    ) -> NavFuture<Option<R>> {
        let resolved = self.resolve(transition, |panel| panel.register_result::<R>());
        async move {
            let (_, result) = resolved.await?;
            result.await
        }
        .boxed_local()
    }

    /// Run a transition with an input parameter and wait for its result.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn do_transition_with_for_result<T: 'static, R: 'static>(
        &self,
        transition: &Transition,
        input: T,
    ) -> NavFuture<Option<R>> {
        let resolved = self.resolve(transition, move |panel| {
            panel.transfer_parameter(input)?;
            panel.register_result::<R>()
        });
        async move {
            let (_, result) = resolved.await?;
            result.await
        }
        .boxed_local()
    }

    /// Resolve the destination, run `prepare` on it, then submit the
    /// operation. Input stays disabled from the call until the operation is
    /// queued.
    fn resolve<X: 'static>(
        &self,
        transition: &Transition,
        prepare: impl FnOnce(&Panel) -> Result<X, NavError> + 'static,
    ) -> NavFuture<(Panel, X)> {
        let shared = Rc::clone(&self.shared);
        let transition = transition.clone();
        let lock = InputLock::acquire(&shared);
        let span = tracing::debug_span!(
            "stack.transition",
            destination = %transition.destination,
            operation = ?transition.operation,
        );
        async move {
            let created = shared.factory.create_panel(&transition.destination).await;
            let Some(panel) = created else {
                drop(lock);
                let err = NavError::PanelNotFound {
                    name: transition.destination.clone(),
                };
                tracing::error!(
                    target: "panelstack.stack",
                    error = %err,
                    "transition could not resolve its destination"
                );
                return Err(err);
            };
            let prepared = match prepare(&panel) {
                Ok(prepared) => prepared,
                Err(err) => {
                    drop(lock);
                    tracing::error!(
                        target: "panelstack.stack",
                        panel = %panel.name(),
                        error = %err,
                        "transition destination rejected its capabilities"
                    );
                    shared.factory.recycle_panel(panel);
                    return Err(err);
                }
            };
            let stack = UiStack::from_shared(Rc::clone(&shared));
            let operation = match transition.operation {
                Operation::Push => stack.push(panel.clone(), transition.disable_under_panel),
                Operation::Replace => {
                    stack.replace(panel.clone(), transition.disable_under_panel)
                }
            };
            drop(lock);
            operation.await?;
            Ok((panel, prepared))
        }
        .instrument(span)
        .boxed_local()
    }

    // ========================================================================
    // Dialog masks
    // ========================================================================

    /// Handle a tap on a dialog mask.
    ///
    /// Returns the close of the dialog above the mask when mask taps close
    /// dialogs and that dialog is still the top panel; `None` otherwise.
    /// The close targets that dialog, so requests queued behind it do not
    /// change what the tap closes.
    #[must_use = "requests queue immediately but only run while the stack is driven"]
    pub fn tap_mask(&self, mask: MaskId) -> Option<NavFuture> {
        if !self.shared.config.close_dialog_on_mask_tap {
            return None;
        }
        let top = self.top()?;
        if top.mask().map(|m| m.id()) != Some(mask) {
            tracing::trace!(
                target: "panelstack.dialog",
                mask = %mask,
                "mask tap ignored, dialog is no longer on top"
            );
            return None;
        }
        Some(self.close(&top))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The top panel.
    pub fn top(&self) -> Option<Panel> {
        self.shared.top()
    }

    /// Number of panels on the stack (excluding panels still entering).
    pub fn depth(&self) -> usize {
        self.shared.depth()
    }

    /// Panels bottom to top.
    pub fn panels(&self) -> Vec<Panel> {
        self.shared.state.borrow().panels.clone()
    }

    /// Z-order of panels and masks, bottom to top.
    pub fn layers(&self) -> Vec<Layer> {
        self.shared.state.borrow().layers.clone()
    }

    /// Live dialog masks, bottom to top.
    pub fn masks(&self) -> Vec<Mask> {
        let mut masks: Vec<Mask> = Vec::new();
        for panel in self.panels() {
            if let Some(mask) = panel.mask() {
                if !masks.contains(&mask) {
                    masks.push(mask);
                }
            }
        }
        masks
    }

    /// Whether global input is enabled.
    pub fn is_interactable(&self) -> bool {
        self.shared.state.borrow().interactable
    }

    pub fn is_pushing(&self) -> bool {
        self.shared.state.borrow().pushing
    }

    pub fn is_popping(&self) -> bool {
        self.shared.state.borrow().popping
    }

    /// Requests accepted but not yet started.
    pub fn queued_requests(&self) -> usize {
        self.shared.state.borrow().queue.len()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Subscribe to push/pop events.
    pub fn subscribe(&self, callback: impl FnMut(&StackEvent) + 'static) -> SubscriptionId {
        self.shared.events.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.events.unsubscribe(id)
    }

    /// Subscribe to global input toggles.
    pub fn on_interactivity_changed(
        &self,
        callback: impl FnMut(&bool) + 'static,
    ) -> SubscriptionId {
        self.shared.interactivity.subscribe(callback)
    }

    pub fn unsubscribe_interactivity(&self, id: SubscriptionId) -> bool {
        self.shared.interactivity.unsubscribe(id)
    }
}
