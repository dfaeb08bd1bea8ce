//! Component declarations and live component instances.

use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};

use crate::diff::diff_root;
use crate::element::{Child, Element};
use crate::error::RenderError;
use crate::hooks::Hooks;
use crate::host::HostSink;
use crate::runtime::RuntimeHandle;
use crate::value::{AttrValue, Attributes};
use crate::vnode::{VNode, VNodeInner};

pub type ComponentId = usize;

static NEXT_COMPONENT_ID: AtomicUsize = AtomicUsize::new(1);

/// Attributes and declared children handed to a render function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    attributes: Attributes,
    children: Vec<Child>,
}

impl Props {
    pub fn new(attributes: Attributes, children: Vec<Child>) -> Self {
        Self {
            attributes,
            children,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttrValue::as_number)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttrValue::as_bool)
    }
}

type RenderFn = dyn Fn(&mut Hooks<'_>, &Props) -> Element;
type ShouldUpdateFn = dyn Fn(Option<&Props>, &Props) -> bool;
type BeforeInitializeFn = dyn Fn(&Props);

/// Builder for a [`ComponentType`] with optional lifecycle hooks.
pub struct Declaration {
    name: String,
    render: Box<RenderFn>,
    should_update: Option<Box<ShouldUpdateFn>>,
    before_initialize: Option<Box<BeforeInitializeFn>>,
    memo: bool,
}

impl Declaration {
    /// Skip re-renders whose props equal the previous ones.
    pub fn memo(mut self) -> Self {
        self.memo = true;
        self
    }

    /// Predicate receiving the previous props (`None` for self-triggered updates)
    /// and the current ones. Takes precedence over [`Declaration::memo`].
    pub fn should_update(
        mut self,
        predicate: impl Fn(Option<&Props>, &Props) -> bool + 'static,
    ) -> Self {
        self.should_update = Some(Box::new(predicate));
        self
    }

    /// Runs once per instance, before the first render.
    pub fn before_initialize(mut self, hook: impl Fn(&Props) + 'static) -> Self {
        self.before_initialize = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> ComponentType {
        ComponentType {
            decl: Rc::new(self),
        }
    }
}

/// A component declaration. Clones share identity.
#[derive(Clone)]
pub struct ComponentType {
    decl: Rc<Declaration>,
}

impl ComponentType {
    pub fn new(
        name: impl Into<String>,
        render: impl Fn(&mut Hooks<'_>, &Props) -> Element + 'static,
    ) -> Self {
        Self::declare(name, render).build()
    }

    pub fn declare(
        name: impl Into<String>,
        render: impl Fn(&mut Hooks<'_>, &Props) -> Element + 'static,
    ) -> Declaration {
        Declaration {
            name: name.into(),
            render: Box::new(render),
            should_update: None,
            before_initialize: None,
            memo: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn same_declaration(&self, other: &ComponentType) -> bool {
        Rc::ptr_eq(&self.decl, &other.decl)
    }

    /// Element rendering this component with no props.
    pub fn element(&self) -> Element {
        Element::component(self)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.same_declaration(other)
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.decl.name).finish()
    }
}

pub(crate) struct ComponentInner {
    id: ComponentId,
    ty: ComponentType,
    props: RefCell<Props>,
    hooks: RefCell<Vec<Box<dyn Any>>>,
    initialized: Cell<bool>,
    dirty: Cell<bool>,
    unmounted: Cell<bool>,
    node: RefCell<Weak<VNodeInner>>,
    runtime: RuntimeHandle,
    renders: Cell<usize>,
}

/// Live instance bound to one component boundary node.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Component {
    /// Binds a new instance to `node` and commits its first render.
    pub fn mount(
        node: &VNode,
        ty: &ComponentType,
        props: Props,
        host: &mut dyn HostSink,
        runtime: &RuntimeHandle,
    ) -> Result<Component, RenderError> {
        let component = Component {
            inner: Rc::new(ComponentInner {
                id: NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed),
                ty: ty.clone(),
                props: RefCell::new(props),
                hooks: RefCell::new(Vec::new()),
                initialized: Cell::new(false),
                dirty: Cell::new(false),
                unmounted: Cell::new(false),
                node: RefCell::new(node.downgrade()),
                runtime: runtime.clone(),
                renders: Cell::new(0),
            }),
        };
        node.push_child(VNode::placeholder());
        node.set_component(component.clone());
        if let Some(hook) = &ty.decl.before_initialize {
            hook(&component.inner.props.borrow());
        }
        component.update(host, None)?;
        debug!("mounted component `{}` #{}", ty.name(), component.id());
        Ok(component)
    }

    pub(crate) fn from_inner(inner: Rc<ComponentInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ComponentInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn id(&self) -> ComponentId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        self.inner.ty.name()
    }

    pub fn component_type(&self) -> &ComponentType {
        &self.inner.ty
    }

    pub fn props(&self) -> Ref<'_, Props> {
        self.inner.props.borrow()
    }

    pub fn node(&self) -> Option<VNode> {
        self.inner.node.borrow().upgrade().map(VNode::from_inner)
    }

    pub(crate) fn inner_hooks(&self) -> &RefCell<Vec<Box<dyn Any>>> {
        &self.inner.hooks
    }

    pub(crate) fn runtime(&self) -> &RuntimeHandle {
        &self.inner.runtime
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    pub fn is_mounted(&self) -> bool {
        !self.inner.unmounted.get()
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Flags the instance for the next flush; false when already flagged or unmounted.
    pub(crate) fn mark_dirty(&self) -> bool {
        if self.inner.unmounted.get() || self.inner.dirty.get() {
            return false;
        }
        self.inner.dirty.set(true);
        true
    }

    pub fn render_count(&self) -> usize {
        self.inner.renders.get()
    }

    pub fn hook_count(&self) -> usize {
        self.inner.hooks.borrow().len()
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stores new props from the parent and updates against the previous ones.
    pub fn receive_props(&self, props: Props, host: &mut dyn HostSink) -> Result<bool, RenderError> {
        let previous = self.inner.props.replace(props);
        self.update(host, Some(&previous))
    }

    /// Re-renders and commits unless skipped; returns whether a render happened.
    ///
    /// `previous` is `None` when the update was triggered by the component's
    /// own state or by a context change.
    pub fn update(&self, host: &mut dyn HostSink, previous: Option<&Props>) -> Result<bool, RenderError> {
        self.inner.dirty.set(false);
        if self.inner.unmounted.get() {
            return Ok(false);
        }
        if self.inner.initialized.get() && !self.should_update(previous) {
            return Ok(false);
        }
        let Some(node) = self.node() else {
            return Ok(false);
        };
        let element = self.render()?;
        let plan = diff_root(&node, &element)?;
        plan.apply(host, &self.inner.runtime)?;
        self.inner.initialized.set(true);
        Ok(true)
    }

    fn should_update(&self, previous: Option<&Props>) -> bool {
        let decl = &self.inner.ty.decl;
        let current = self.inner.props.borrow();
        match (&decl.should_update, previous) {
            (Some(predicate), _) => predicate(previous, &current),
            (None, Some(previous)) if decl.memo => *previous != *current,
            _ => true,
        }
    }

    fn render(&self) -> Result<Element, RenderError> {
        let _slot = self.inner.runtime.scheduler().begin_render(self.id())?;
        let props = self.inner.props.borrow().clone();
        let mut hooks = Hooks::new(self);
        let element = (self.inner.ty.decl.render)(&mut hooks, &props);
        if let Err(err) = hooks.finish() {
            warn!("render of `{}` aborted: {err}", self.name());
            return Err(err.into());
        }
        self.inner.renders.set(self.inner.renders.get() + 1);
        Ok(element)
    }

    /// Makes the instance inert; queued state writes become no-ops.
    pub fn unmount(&self) {
        if self.inner.unmounted.replace(true) {
            return;
        }
        *self.inner.node.borrow_mut() = Weak::new();
        self.inner.runtime.contexts().unsubscribe(self);
        debug!("unmounted component `{}` #{}", self.name(), self.id());
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .field("renders", &self.inner.renders.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/component_tests.rs"]
mod tests;
