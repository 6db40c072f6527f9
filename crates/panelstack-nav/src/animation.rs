#![forbid(unsafe_code)]

//! Animation seams.
//!
//! Two collaborators can animate a panel:
//!
//! - an [`Animator`] attached to the panel itself, which knows a set of named
//!   triggers (a state machine driven by the host engine), and
//! - a stack-wide [`AnimationDriver`], used when the panel has no animator or
//!   its animator lacks the configured trigger.
//!
//! When neither applies the animation completes immediately. In every case
//! the lifecycle hook awaits a [`CompletionSignal`](crate::CompletionSignal)
//! that the animation side settles through a [`Completer`].

use crate::completion::Completer;
use crate::dialog::Mask;
use crate::panel::Panel;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;

/// Stack-level default animation provider.
pub trait AnimationDriver {
    /// Play the enter animation of `panel`, then call `done.complete()`.
    fn play_enter(&self, panel: &Panel, done: Completer);

    /// Play the exit animation of `panel`, then call `done.complete()`.
    fn play_exit(&self, panel: &Panel, done: Completer);

    /// Fade a freshly created dialog mask in.
    fn play_mask_enter(&self, _mask: &Mask, done: Completer) {
        done.complete();
    }

    /// Fade a dialog mask out before it is destroyed.
    fn play_mask_exit(&self, _mask: &Mask, done: Completer) {
        done.complete();
    }
}

/// Trigger-driven animation state machine attached to a panel.
///
/// The animator only records which triggers fire; the host forwards them to
/// its engine through [`Animator::on_trigger`] and reports the end of the
/// animation with [`Panel::finish_enter_animation`] or
/// [`Panel::finish_exit_animation`].
#[derive(Default)]
pub struct Animator {
    triggers: BTreeSet<String>,
    fired: RefCell<Vec<String>>,
    sink: Option<Box<dyn Fn(&str)>>,
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("triggers", &self.triggers)
            .field("fired", &self.fired.borrow())
            .finish_non_exhaustive()
    }
}

impl Animator {
    /// Create an animator without triggers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a trigger parameter.
    #[must_use]
    pub fn with_trigger(mut self, name: impl Into<String>) -> Self {
        self.triggers.insert(name.into());
        self
    }

    /// Forward every fired trigger to `sink`.
    #[must_use]
    pub fn on_trigger(mut self, sink: impl Fn(&str) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Check if a trigger parameter named `name` exists.
    pub fn has_trigger(&self, name: &str) -> bool {
        self.triggers.contains(name)
    }

    /// Fire a trigger.
    pub fn set_trigger(&self, name: &str) {
        self.fired.borrow_mut().push(name.to_string());
        if let Some(sink) = &self.sink {
            sink(name);
        }
    }

    /// Triggers fired so far, oldest first.
    pub fn fired(&self) -> Vec<String> {
        self.fired.borrow().clone()
    }
}
