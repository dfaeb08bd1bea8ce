//! Root entry point binding an element tree to a host container.

use std::rc::Rc;

use log::debug;

use crate::component::Component;
use crate::config::RuntimeConfig;
use crate::context::{Context, ContextStore};
use crate::diff::diff_root;
use crate::element::{event_attribute, Element, Tag};
use crate::error::{DiffError, RenderError};
use crate::host::{HostId, HostSink};
use crate::patch::PatchPlan;
use crate::runtime::RuntimeHandle;
use crate::scheduler::{Scheduler, Transaction};
use crate::value::{AttrValue, Attributes};
use crate::vnode::VNode;

/// A mounted application: host, live tree and the scheduler driving it.
pub struct App<H: HostSink> {
    host: H,
    container: HostId,
    root: VNode,
    scheduler: Scheduler,
    runtime: RuntimeHandle,
}

impl<H: HostSink> App<H> {
    pub fn mount(host: H, container: HostId, element: Element) -> Result<Self, RenderError> {
        Self::mount_with_config(host, container, element, RuntimeConfig::default())
    }

    /// Mounts `element` as the only child of `container`.
    pub fn mount_with_config(
        host: H,
        container: HostId,
        element: Element,
        config: RuntimeConfig,
    ) -> Result<Self, RenderError> {
        let scheduler = Scheduler::new(&config);
        let runtime = RuntimeHandle::new(&scheduler, Rc::new(ContextStore::new()), config);
        let root = VNode::new(Tag::Host("#root".to_owned()), None, Attributes::new());
        root.set_host(container);
        let mut app = Self {
            host,
            container,
            root,
            scheduler,
            runtime,
        };
        app.render(element)?;
        debug!("app mounted into host node {container}");
        Ok(app)
    }

    /// Reconciles the mounted tree against a new root element.
    pub fn render(&mut self, element: Element) -> Result<(), RenderError> {
        let root = self.root.clone();
        let runtime = self.runtime.clone();
        self.scheduler.batching_update(&mut self.host, |tx| {
            let plan = diff_root(&root, &element)?;
            plan.apply(tx.host(), &runtime)
        })
    }

    /// Plan that [`App::render`] would apply for `element`.
    pub fn diff(&self, element: &Element) -> Result<PatchPlan, DiffError> {
        diff_root(&self.root, element)
    }

    pub fn apply(&mut self, plan: PatchPlan) -> Result<(), RenderError> {
        let runtime = self.runtime.clone();
        self.scheduler
            .batching_update(&mut self.host, |tx| plan.apply(tx.host(), &runtime))
    }

    /// Runs queued state writes, one transaction each.
    pub fn flush(&mut self) -> Result<(), RenderError> {
        self.scheduler.flush(&mut self.host)
    }

    pub fn batching_update<R>(
        &mut self,
        work: impl FnOnce(&mut Transaction<'_>) -> Result<R, RenderError>,
    ) -> Result<R, RenderError> {
        self.scheduler.batching_update(&mut self.host, work)
    }

    /// Calls the `event` handler of the element mounted as `node` inside one batch.
    ///
    /// Returns false when the node has no such handler.
    pub fn dispatch(&mut self, node: HostId, event: &str) -> Result<bool, RenderError> {
        let Some(target) = self.root.find_by_host(node) else {
            return Ok(false);
        };
        let handler = target
            .attributes()
            .get(&event_attribute(event))
            .and_then(AttrValue::as_handler)
            .cloned();
        let Some(handler) = handler else {
            return Ok(false);
        };
        self.batching_update(|_| {
            handler.call();
            Ok(())
        })?;
        Ok(true)
    }

    /// Sets the value of `context` and re-renders its readers in one batch.
    pub fn provide<T: Clone + 'static>(
        &mut self,
        context: &Context<T>,
        value: T,
    ) -> Result<(), RenderError> {
        let readers = self.runtime.contexts().provide(context, value);
        self.batching_update(|tx| {
            for reader in &readers {
                tx.mark_dirty(reader);
            }
            Ok(())
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn container(&self) -> HostId {
        self.container
    }

    /// Synthetic node standing for the container; the mounted tree is its child.
    pub fn root_node(&self) -> &VNode {
        &self.root
    }

    /// Instance rendered at the root, when the root element is a component.
    pub fn root_component(&self) -> Option<Component> {
        self.root.child(0).and_then(|node| node.component())
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn runtime(&self) -> &RuntimeHandle {
        &self.runtime
    }

    /// Removes the mounted tree from the container and unmounts every component.
    pub fn unmount(&mut self) -> Result<(), RenderError> {
        let Some(node) = self.root.remove_child(0) else {
            return Ok(());
        };
        if let Some(id) = node.host_node() {
            self.host.remove_child(self.container, id)?;
        }
        node.destroy();
        debug!("app unmounted from host node {}", self.container);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
