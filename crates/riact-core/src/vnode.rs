//! Live virtual-node tree.
//!
//! Nodes are shared handles. Ownership flows from parent to child; the parent
//! link is weak, the same way composition scopes point back at the runtime.

use std::cell::{Cell, Ref, RefCell};
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use crate::component::Component;
use crate::element::{Element, Tag};
use crate::host::HostId;
use crate::value::{Attributes, Key};

pub(crate) struct VNodeInner {
    tag: RefCell<Tag>,
    key: Option<Key>,
    attributes: RefCell<Attributes>,
    children: RefCell<Vec<VNode>>,
    parent: RefCell<Weak<VNodeInner>>,
    host: Cell<Option<HostId>>,
    component: RefCell<Option<Component>>,
}

#[derive(Clone)]
pub struct VNode {
    inner: Rc<VNodeInner>,
}

impl VNode {
    pub fn new(tag: Tag, key: Option<Key>, attributes: Attributes) -> Self {
        Self {
            inner: Rc::new(VNodeInner {
                tag: RefCell::new(tag),
                key,
                attributes: RefCell::new(attributes),
                children: RefCell::new(Vec::new()),
                parent: RefCell::new(Weak::new()),
                host: Cell::new(None),
                component: RefCell::new(None),
            }),
        }
    }

    /// Childless node carrying only the tag, key and attributes of `element`.
    pub fn shell(element: &Element) -> Self {
        Self::new(
            element.tag.clone(),
            element.key.clone(),
            element.attributes.clone(),
        )
    }

    /// Empty slot held by a component boundary until its first render commits.
    pub fn placeholder() -> Self {
        Self::new(Tag::Empty, None, Attributes::new())
    }

    pub(crate) fn from_inner(inner: Rc<VNodeInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<VNodeInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn ptr_eq(&self, other: &VNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn tag(&self) -> Ref<'_, Tag> {
        self.inner.tag.borrow()
    }

    pub fn key(&self) -> Option<&Key> {
        self.inner.key.as_ref()
    }

    pub fn attributes(&self) -> Ref<'_, Attributes> {
        self.inner.attributes.borrow()
    }

    pub fn set_attributes(&self, attributes: Attributes) {
        *self.inner.attributes.borrow_mut() = attributes;
    }

    pub fn text(&self) -> Option<String> {
        match &*self.inner.tag.borrow() {
            Tag::Text(content) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn set_text(&self, content: impl Into<String>) {
        *self.inner.tag.borrow_mut() = Tag::Text(content.into());
    }

    /// Whether this node is the unrendered slot of a component boundary.
    pub fn is_placeholder(&self) -> bool {
        matches!(*self.inner.tag.borrow(), Tag::Empty) && self.inner.host.get().is_none()
    }

    pub fn is_boundary(&self) -> bool {
        self.inner.tag.borrow().is_component()
    }

    /// Whether an element of `tag` may reuse this node. Placeholders never match.
    pub fn tag_matches(&self, tag: &Tag) -> bool {
        !self.is_placeholder() && self.inner.tag.borrow().same_type(tag)
    }

    pub fn host(&self) -> Option<HostId> {
        self.inner.host.get()
    }

    pub fn set_host(&self, id: HostId) {
        self.inner.host.set(Some(id));
    }

    pub fn component(&self) -> Option<Component> {
        self.inner.component.borrow().clone()
    }

    pub(crate) fn set_component(&self, component: Component) {
        *self.inner.component.borrow_mut() = Some(component);
    }

    pub fn parent(&self) -> Option<VNode> {
        self.inner.parent.borrow().upgrade().map(VNode::from_inner)
    }

    fn set_parent(&self, parent: &VNode) {
        *self.inner.parent.borrow_mut() = parent.downgrade();
    }

    fn clear_parent(&self) {
        *self.inner.parent.borrow_mut() = Weak::new();
    }

    pub fn children(&self) -> Ref<'_, Vec<VNode>> {
        self.inner.children.borrow()
    }

    pub fn child(&self, index: usize) -> Option<VNode> {
        self.inner.children.borrow().get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn index_of(&self, child: &VNode) -> Option<usize> {
        self.inner
            .children
            .borrow()
            .iter()
            .position(|candidate| candidate.ptr_eq(child))
    }

    pub fn push_child(&self, child: VNode) {
        child.set_parent(self);
        self.inner.children.borrow_mut().push(child);
    }

    /// Inserts at `index`, clamped to the end of the list.
    pub fn insert_child(&self, index: usize, child: VNode) {
        child.set_parent(self);
        let mut children = self.inner.children.borrow_mut();
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Swaps the child at `index` for `child` and returns the previous one.
    pub fn set_child(&self, index: usize, child: VNode) -> Option<VNode> {
        let mut children = self.inner.children.borrow_mut();
        let slot = children.get_mut(index)?;
        child.set_parent(self);
        let previous = std::mem::replace(slot, child);
        Some(previous)
    }

    pub fn remove_child(&self, index: usize) -> Option<VNode> {
        let mut children = self.inner.children.borrow_mut();
        if index >= children.len() {
            return None;
        }
        Some(children.remove(index))
    }

    /// Relocates a child; `to` is its index after the move.
    pub fn move_child(&self, from: usize, to: usize) -> bool {
        let mut children = self.inner.children.borrow_mut();
        if from >= children.len() || to >= children.len() {
            return false;
        }
        if from != to {
            let child = children.remove(from);
            children.insert(to, child);
        }
        true
    }

    /// Host node standing for this node, looking through component boundaries.
    pub fn host_node(&self) -> Option<HostId> {
        if self.is_boundary() {
            return self.child(0).and_then(|child| child.host_node());
        }
        self.host()
    }

    /// Host element that this node's children are attached to.
    pub fn child_container(&self) -> Option<HostId> {
        match &*self.inner.tag.borrow() {
            Tag::Host(_) => self.host(),
            Tag::Component(_) => self.parent().and_then(|parent| parent.child_container()),
            Tag::Text(_) | Tag::Empty => None,
        }
    }

    /// Host node that follows the child slot `index` in document order.
    ///
    /// Looks at later siblings first, then, for boundaries, past the boundary
    /// itself in its own parent.
    pub fn host_after(&self, index: usize) -> Option<HostId> {
        let following = self
            .inner
            .children
            .borrow()
            .iter()
            .skip(index + 1)
            .find_map(VNode::host_node);
        if following.is_some() || !self.is_boundary() {
            return following;
        }
        let parent = self.parent()?;
        let position = parent.index_of(self)?;
        parent.host_after(position)
    }

    /// Detaches this subtree: severs parent links and unmounts components.
    pub fn destroy(&self) {
        let children: Vec<VNode> = self.inner.children.borrow().clone();
        for child in &children {
            child.destroy();
        }
        if let Some(component) = self.inner.component.borrow_mut().take() {
            component.unmount();
        }
        self.clear_parent();
    }

    /// Depth-first pre-order walk; the callback receives each node and its depth.
    pub fn walk(&self, visit: &mut dyn FnMut(&VNode, usize)) {
        self.walk_at(visit, 0);
    }

    fn walk_at(&self, visit: &mut dyn FnMut(&VNode, usize), depth: usize) {
        visit(self, depth);
        let children: Vec<VNode> = self.inner.children.borrow().clone();
        for child in &children {
            child.walk_at(visit, depth + 1);
        }
    }

    pub fn find_by_host(&self, id: HostId) -> Option<VNode> {
        if !self.is_boundary() && self.host() == Some(id) {
            return Some(self.clone());
        }
        let children: Vec<VNode> = self.inner.children.borrow().clone();
        children.iter().find_map(|child| child.find_by_host(id))
    }

    pub fn dump(&self) -> String {
        let mut output = String::new();
        self.walk(&mut |node, depth| {
            let indent = "  ".repeat(depth);
            let tag = node.tag();
            let _ = match &*tag {
                Tag::Host(name) => write!(output, "{indent}<{name}>"),
                Tag::Text(content) => write!(output, "{indent}{content:?}"),
                Tag::Component(ty) => write!(output, "{indent}[{}]", ty.name()),
                Tag::Empty => write!(output, "{indent}(empty)"),
            };
            if let Some(key) = node.key() {
                let _ = write!(output, " key={key}");
            }
            if let Some(host) = node.host() {
                let _ = write!(output, " #{host}");
            }
            output.push('\n');
        });
        output
    }
}

impl std::fmt::Debug for VNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VNode")
            .field("tag", &self.inner.tag.borrow().name())
            .field("key", &self.inner.key)
            .field("host", &self.inner.host.get())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/vnode_tests.rs"]
mod tests;
