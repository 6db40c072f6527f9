#![forbid(unsafe_code)]

//! One-shot completion sources for animations and hooks.
//!
//! A [`Completer`] is handed to whoever finishes the work (an animation
//! driver, an animation-event callback); the matching [`CompletionSignal`]
//! is awaited by the lifecycle hook.
//!
//! # Failure Modes
//!
//! - Dropping a [`Completer`] without calling [`Completer::complete`] settles
//!   the signal as [`Settled::Abandoned`] and logs a warning. The awaiting
//!   hook resumes; it never hangs on a lost completer.
//! - A completer that is kept alive forever stalls the awaiting hook. No
//!   timeout is applied here.

use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// How a [`CompletionSignal`] settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// [`Completer::complete`] was called.
    Completed,
    /// The completer was dropped without completing.
    Abandoned,
}

/// Resolving half of a completion source. Consumed on completion.
#[derive(Debug)]
pub struct Completer {
    tx: Option<oneshot::Sender<()>>,
    label: &'static str,
}

impl Completer {
    /// Resolve the paired signal.
    pub fn complete(mut self) {
        if let Some(tx) = self.tx.take() {
            // The waiting side may already be gone; nothing to report then.
            let _ = tx.send(());
        }
    }

    /// What this completer finishes (`"enter"`, `"exit"`, `"mask_enter"`, ...).
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::warn!(
                target: "panelstack.panel",
                label = self.label,
                "completion source dropped without completing"
            );
        }
    }
}

/// Awaitable half of a completion source.
#[derive(Debug)]
#[must_use = "a completion signal does nothing unless awaited"]
pub struct CompletionSignal {
    rx: oneshot::Receiver<()>,
}

impl Future for CompletionSignal {
    type Output = Settled;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Settled> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(())) => Poll::Ready(Settled::Completed),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Settled::Abandoned),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Create a linked completer/signal pair.
pub fn completion_pair(label: &'static str) -> (Completer, CompletionSignal) {
    let (tx, rx) = oneshot::channel();
    (
        Completer {
            tx: Some(tx),
            label,
        },
        CompletionSignal { rx },
    )
}
