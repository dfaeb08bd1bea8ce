use std::cell::Cell;
use std::rc::Rc;

use log::trace;
use riact_core::{
    App, Component, Element, HostId, HostOp, MemoryHost, PatchPlan, RenderError, RuntimeConfig,
};

/// Headless harness for exercising rendered trees in tests.
///
/// `TestRoot` owns an [`App`] mounted into an in-memory host and exposes
/// helpers for re-rendering, dispatching events by attribute and draining
/// queued state writes without a real render target.
pub struct TestRoot {
    app: App<MemoryHost>,
}

impl TestRoot {
    /// Mount `element` into a fresh `<body>` container.
    pub fn mount(element: Element) -> Result<Self, RenderError> {
        Self::mount_with_config(element, RuntimeConfig::default())
    }

    pub fn mount_with_config(element: Element, config: RuntimeConfig) -> Result<Self, RenderError> {
        let mut host = MemoryHost::new();
        let container = host.create_root("body");
        let app = App::mount_with_config(host, container, element, config)?;
        Ok(Self { app })
    }

    /// Reconcile the mounted tree against a new root element.
    pub fn render(&mut self, element: Element) -> Result<(), RenderError> {
        self.app.render(element)
    }

    /// Plan the next render would apply, without applying it.
    pub fn diff(&self, element: &Element) -> Result<PatchPlan, RenderError> {
        Ok(self.app.diff(element)?)
    }

    pub fn apply(&mut self, plan: PatchPlan) -> Result<(), RenderError> {
        self.app.apply(plan)
    }

    /// Run queued state writes and dirty components until none remain.
    pub fn pump_until_idle(&mut self) -> Result<(), RenderError> {
        while self.has_pending_work() {
            trace!("pumping {} queued tasks", self.app.scheduler().pending_tasks());
            self.app.flush()?;
        }
        Ok(())
    }

    pub fn has_pending_work(&self) -> bool {
        let scheduler = self.app.scheduler();
        scheduler.pending_tasks() > 0 || scheduler.dirty_count() > 0
    }

    /// Dispatch `event` to the first node whose attribute `key` equals `value`.
    ///
    /// Returns false when no node matches or the node has no handler.
    pub fn dispatch_by(&mut self, key: &str, value: &str, event: &str) -> Result<bool, RenderError> {
        match self.find(key, value) {
            Some(node) => self.app.dispatch(node, event),
            None => Ok(false),
        }
    }

    /// Click the node whose `id` attribute is `id`.
    pub fn click(&mut self, id: &str) -> Result<bool, RenderError> {
        self.dispatch_by("id", id, "click")
    }

    pub fn find(&self, key: &str, value: &str) -> Option<HostId> {
        self.app
            .host()
            .find_by_attribute(self.app.container(), key, value)
    }

    /// Markup of everything mounted under the container.
    pub fn markup(&self) -> String {
        self.app.host().markup(self.app.container())
    }

    pub fn dump_tree(&self) -> String {
        self.app.host().dump_tree(self.app.container())
    }

    /// Host calls recorded since the last call, mount included on the first.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        self.app.host_mut().take_ops()
    }

    /// Number of structural host calls (creation, insertion, removal) recorded so far.
    pub fn structural_op_count(&self) -> usize {
        self.app
            .host()
            .ops()
            .iter()
            .filter(|op| op.is_structural())
            .count()
    }

    pub fn root_component(&self) -> Option<Component> {
        self.app.root_component()
    }

    pub fn app(&self) -> &App<MemoryHost> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App<MemoryHost> {
        &mut self.app
    }

    pub fn host(&self) -> &MemoryHost {
        self.app.host()
    }
}

/// Convenience helper for tests that only need temporary access to a mounted
/// `TestRoot`.
pub fn run_test_root<R>(
    element: Element,
    f: impl FnOnce(&mut TestRoot) -> R,
) -> Result<R, RenderError> {
    let mut root = TestRoot::mount(element)?;
    Ok(f(&mut root))
}

/// Shared counter bumped from inside render functions.
#[derive(Clone, Debug, Default)]
pub struct RenderCounter(Rc<Cell<usize>>);

impl RenderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }

    pub fn reset(&self) {
        self.0.set(0);
    }
}
