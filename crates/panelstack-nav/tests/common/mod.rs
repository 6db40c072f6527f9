//! Shared fixtures for stack integration tests.
//!
//! `Harness` owns a single-threaded executor, a stack, and a manual
//! animation driver whose completers are released explicitly, so tests can
//! stop in the middle of a transition and inspect the stack.

#![allow(dead_code)]

use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use panelstack_nav::{
    AnimationDriver, Completer, HookFuture, Mask, Panel, PanelHooks, RegistryPanelFactory,
    StackConfig, UiStack,
};
use std::cell::RefCell;
use std::rc::Rc;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ---------------------------------------------------------------------------
// Animation driver
// ---------------------------------------------------------------------------

/// Records every animation request and holds its completer until released.
#[derive(Default)]
pub struct ManualDriver {
    pending: RefCell<Vec<Completer>>,
    played: RefCell<Vec<String>>,
}

impl ManualDriver {
    fn hold(&self, what: String, done: Completer) {
        self.played.borrow_mut().push(what);
        self.pending.borrow_mut().push(done);
    }

    /// Complete every held animation. Returns how many were released.
    pub fn complete_all(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        let released = batch.len();
        for done in batch {
            done.complete();
        }
        released
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn played(&self) -> Vec<String> {
        self.played.borrow().clone()
    }

    pub fn played_count(&self, prefix: &str) -> usize {
        self.played
            .borrow()
            .iter()
            .filter(|p| p.starts_with(prefix))
            .count()
    }
}

impl AnimationDriver for ManualDriver {
    fn play_enter(&self, panel: &Panel, done: Completer) {
        self.hold(format!("enter {}", panel.name()), done);
    }

    fn play_exit(&self, panel: &Panel, done: Completer) {
        self.hold(format!("exit {}", panel.name()), done);
    }

    fn play_mask_enter(&self, mask: &Mask, done: Completer) {
        self.hold(format!("mask_enter {}", mask.id()), done);
    }

    fn play_mask_exit(&self, mask: &Mask, done: Completer) {
        self.hold(format!("mask_exit {}", mask.id()), done);
    }
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// Appends `"<name>:<hook>"` to a shared log on every lifecycle hook.
pub struct LoggedHooks {
    pub log: Log,
}

impl PanelHooks for LoggedHooks {
    fn on_enter(&mut self, panel: &Panel) -> HookFuture {
        self.log.borrow_mut().push(format!("{}:enter", panel.name()));
        panel.play_enter_animation()
    }

    fn on_exit(&mut self, panel: &Panel) -> HookFuture {
        self.log.borrow_mut().push(format!("{}:exit", panel.name()));
        panel.play_exit_animation()
    }

    fn on_enter_background(&mut self, panel: &Panel, covering: &Panel) -> HookFuture {
        self.log
            .borrow_mut()
            .push(format!("{}:background<{}", panel.name(), covering.name()));
        Box::pin(async {})
    }

    fn on_enter_foreground(&mut self, panel: &Panel, uncovering: &Panel) -> HookFuture {
        self.log
            .borrow_mut()
            .push(format!("{}:foreground<{}", panel.name(), uncovering.name()));
        Box::pin(async {})
    }
}

pub fn logged(name: &str, log: &Log) -> Panel {
    Panel::builder(name)
        .hooks(LoggedHooks { log: log.clone() })
        .build()
}

pub fn logged_dialog(name: &str, log: &Log) -> Panel {
    Panel::builder(name)
        .dialog()
        .hooks(LoggedHooks { log: log.clone() })
        .build()
}

pub fn names(stack: &UiStack) -> Vec<String> {
    stack.panels().iter().map(|p| p.name().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Result slot filled when a spawned future finishes.
pub struct Outcome<T>(Rc<RefCell<Option<T>>>);

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn take(&self) -> Option<T> {
        self.0.borrow_mut().take()
    }
}

pub struct Harness {
    pub pool: LocalPool,
    pub driver: Rc<ManualDriver>,
    pub factory: Rc<RegistryPanelFactory>,
    pub stack: UiStack,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(RegistryPanelFactory::new(), StackConfig::default())
    }

    pub fn with_factory(factory: RegistryPanelFactory) -> Self {
        Self::build(factory, StackConfig::default())
    }

    pub fn with_config(config: StackConfig) -> Self {
        Self::build(RegistryPanelFactory::new(), config)
    }

    /// A stack whose queue runs on the harness pool, so requests progress
    /// without anyone holding their futures.
    pub fn spawning() -> Self {
        Self::build_on(RegistryPanelFactory::new(), StackConfig::default(), true)
    }

    fn build(factory: RegistryPanelFactory, config: StackConfig) -> Self {
        Self::build_on(factory, config, false)
    }

    fn build_on(factory: RegistryPanelFactory, config: StackConfig, spawn: bool) -> Self {
        let pool = LocalPool::new();
        let driver = Rc::new(ManualDriver::default());
        let factory = Rc::new(factory);
        let mut builder = UiStack::builder(factory.clone())
            .config(config)
            .animation_driver(driver.clone());
        if spawn {
            builder = builder.spawner(Rc::new(pool.spawner()));
        }
        Self {
            pool,
            driver,
            factory,
            stack: builder.build(),
        }
    }

    /// Spawn a future on the pool and capture its output.
    pub fn spawn<T: 'static>(&self, fut: LocalBoxFuture<'static, T>) -> Outcome<T> {
        let slot = Rc::new(RefCell::new(None));
        let out = Rc::clone(&slot);
        self.pool
            .spawner()
            .spawn_local(async move {
                let value = fut.await;
                *out.borrow_mut() = Some(value);
            })
            .expect("spawn on local pool");
        Outcome(slot)
    }

    /// Run until every task is blocked on an animation, without releasing any.
    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Run to quiescence, releasing animations whenever the pool stalls.
    pub fn settle(&mut self) {
        loop {
            self.pool.run_until_stalled();
            if self.driver.complete_all() == 0 {
                break;
            }
        }
    }

    /// Push a panel and settle.
    pub fn push_now(&mut self, panel: Panel, disable_under: bool) {
        let done = self.spawn(self.stack.push(panel, disable_under));
        self.settle();
        done.take()
            .expect("push finished")
            .expect("push succeeded");
    }
}
