#![forbid(unsafe_code)]

//! Panel creation and recycling.
//!
//! The stack never constructs panels itself. It asks a [`PanelFactory`] for a
//! panel by name and hands popped panels back for recycling.

use crate::panel::Panel;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;

/// Async panel source.
pub trait PanelFactory {
    /// Resolve a panel by name. `None` means the name is unknown.
    fn create_panel(&self, name: &str) -> LocalBoxFuture<'static, Option<Panel>>;

    /// Take back a panel that has finished exiting.
    fn recycle_panel(&self, panel: Panel);

    /// Names this factory can create.
    fn products(&self) -> Vec<String> {
        Vec::new()
    }
}

type Constructor = Box<dyn Fn() -> Panel>;

/// Factory backed by a name-to-constructor map.
///
/// Creation resolves immediately. Recycled panels are dropped.
#[derive(Default)]
pub struct RegistryPanelFactory {
    constructors: BTreeMap<String, Constructor>,
    created: Cell<u64>,
    recycled: Cell<u64>,
}

impl fmt::Debug for RegistryPanelFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryPanelFactory")
            .field("products", &self.constructors.keys().collect::<Vec<_>>())
            .field("created", &self.created.get())
            .field("recycled", &self.recycled.get())
            .finish()
    }
}

impl RegistryPanelFactory {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `name`, replacing any previous one.
    #[must_use]
    pub fn with_panel(mut self, name: impl Into<String>, ctor: impl Fn() -> Panel + 'static) -> Self {
        self.constructors.insert(name.into(), Box::new(ctor));
        self
    }

    /// Panels created so far.
    pub fn created_count(&self) -> u64 {
        self.created.get()
    }

    /// Panels handed back so far.
    pub fn recycled_count(&self) -> u64 {
        self.recycled.get()
    }
}

impl PanelFactory for RegistryPanelFactory {
    fn create_panel(&self, name: &str) -> LocalBoxFuture<'static, Option<Panel>> {
        let panel = self.constructors.get(name).map(|ctor| ctor());
        match &panel {
            Some(p) => {
                self.created.set(self.created.get() + 1);
                tracing::debug!(
                    target: "panelstack.stack",
                    panel = name,
                    id = p.id().get(),
                    "factory created panel"
                );
            }
            None => tracing::warn!(
                target: "panelstack.stack",
                panel = name,
                "factory has no constructor for panel"
            ),
        }
        futures::future::ready(panel).boxed_local()
    }

    fn recycle_panel(&self, panel: Panel) {
        self.recycled.set(self.recycled.get() + 1);
        tracing::trace!(
            target: "panelstack.stack",
            panel = panel.name(),
            "factory recycled panel"
        );
    }

    fn products(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }
}
