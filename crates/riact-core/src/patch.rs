//! Patch vocabulary and its application to the live tree and the host.

use log::{debug, trace};

use crate::component::{Component, Props};
use crate::diff::check_unique_keys;
use crate::element::{flatten_children, Element, Tag};
use crate::error::{PatchError, RenderError};
use crate::host::{HostId, HostSink};
use crate::runtime::RuntimeHandle;
use crate::value::Attributes;
use crate::vnode::VNode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Insert,
    Remove,
    Replace,
    UpdateProps,
    Move,
    SetText,
}

/// One edit to the children or content of a target node.
///
/// Child indices refer to the child list as left by the previous patch of the
/// same entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch {
    Insert { index: usize, item: Element },
    Remove { index: usize },
    Replace { index: usize, item: Element },
    UpdateProps { attributes: Attributes },
    /// `to` is the child's index once it has been moved.
    Move { from: usize, to: usize },
    SetText { text: String },
}

impl Patch {
    pub fn insert(index: usize, item: Element) -> Self {
        Patch::Insert { index, item }
    }

    pub fn remove(index: usize) -> Self {
        Patch::Remove { index }
    }

    pub fn replace(index: usize, item: Element) -> Self {
        Patch::Replace { index, item }
    }

    pub fn update_props(attributes: Attributes) -> Self {
        Patch::UpdateProps { attributes }
    }

    pub fn relocate(from: usize, to: usize) -> Self {
        Patch::Move { from, to }
    }

    pub fn set_text(text: impl Into<String>) -> Self {
        Patch::SetText { text: text.into() }
    }

    pub fn action(&self) -> Action {
        match self {
            Patch::Insert { .. } => Action::Insert,
            Patch::Remove { .. } => Action::Remove,
            Patch::Replace { .. } => Action::Replace,
            Patch::UpdateProps { .. } => Action::UpdateProps,
            Patch::Move { .. } => Action::Move,
            Patch::SetText { .. } => Action::SetText,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PatchEntry {
    pub target: VNode,
    pub patches: Vec<Patch>,
}

/// New props for a retained child component, delivered after all patches.
#[derive(Clone, Debug)]
pub struct ComponentUpdate {
    pub node: VNode,
    pub props: Props,
}

#[derive(Clone, Debug, Default)]
pub struct PatchPlan {
    pub entries: Vec<PatchEntry>,
    pub updates: Vec<ComponentUpdate>,
}

impl PatchPlan {
    /// Appends an entry; empty patch lists are dropped.
    pub fn push(&mut self, target: VNode, patches: Vec<Patch>) {
        if !patches.is_empty() {
            self.entries.push(PatchEntry { target, patches });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.updates.is_empty()
    }

    pub fn patch_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.patches.len()).sum()
    }

    pub fn patches(&self) -> impl Iterator<Item = &Patch> {
        self.entries.iter().flat_map(|entry| entry.patches.iter())
    }

    pub fn patches_for(&self, target: &VNode) -> Option<&[Patch]> {
        self.entries
            .iter()
            .find(|entry| entry.target.ptr_eq(target))
            .map(|entry| entry.patches.as_slice())
    }

    pub fn count(&self, action: Action) -> usize {
        self.patches()
            .filter(|patch| patch.action() == action)
            .count()
    }

    /// Applies every entry in order, then delivers component prop updates.
    pub fn apply(self, host: &mut dyn HostSink, runtime: &RuntimeHandle) -> Result<(), RenderError> {
        for entry in self.entries {
            for patch in entry.patches {
                log_patch(runtime, &entry.target, &patch);
                apply_patch(&entry.target, patch, host, runtime)?;
            }
        }
        for update in self.updates {
            update.node.set_attributes(update.props.attributes().clone());
            if let Some(component) = update.node.component() {
                component.receive_props(update.props, host)?;
            }
        }
        Ok(())
    }
}

fn log_patch(runtime: &RuntimeHandle, target: &VNode, patch: &Patch) {
    if runtime.config().log_patches() {
        debug!("patch <{}>: {:?}", target.tag().name(), patch.action());
    } else {
        trace!("patch <{}>: {:?}", target.tag().name(), patch);
    }
}

fn out_of_bounds(target: &VNode, index: usize) -> RenderError {
    PatchError::IndexOutOfBounds {
        parent: target.tag().name().to_owned(),
        index,
        len: target.child_count(),
    }
    .into()
}

fn apply_patch(
    target: &VNode,
    patch: Patch,
    host: &mut dyn HostSink,
    runtime: &RuntimeHandle,
) -> Result<(), RenderError> {
    match patch {
        Patch::Insert { index, item } => {
            if index > target.child_count() {
                return Err(out_of_bounds(target, index));
            }
            let node = mount_child(target, index, &item, host, runtime)?;
            attach(target, index, &node, host)?;
        }
        Patch::Remove { index } => {
            let node = target
                .remove_child(index)
                .ok_or_else(|| out_of_bounds(target, index))?;
            if let (Some(container), Some(id)) = (target.child_container(), node.host_node()) {
                host.remove_child(container, id)?;
            }
            node.destroy();
        }
        Patch::Replace { index, item } => {
            let node = VNode::shell(&item);
            let previous = target
                .set_child(index, node.clone())
                .ok_or_else(|| out_of_bounds(target, index))?;
            let previous_host = previous.host_node();
            if let Err(err) = build(&node, &item, host, runtime) {
                target.set_child(index, previous);
                node.destroy();
                return Err(err);
            }
            if let (Some(container), Some(old), Some(new)) =
                (target.child_container(), previous_host, node.host_node())
            {
                host.replace_child(container, new, old)?;
            }
            previous.destroy();
        }
        Patch::Move { from, to } => {
            let node = target.child(from).ok_or_else(|| out_of_bounds(target, from))?;
            if !target.move_child(from, to) {
                return Err(out_of_bounds(target, to));
            }
            if let (Some(container), Some(id)) = (target.child_container(), node.host_node()) {
                host.remove_child(container, id)?;
            }
            attach(target, to, &node, host)?;
        }
        Patch::UpdateProps { attributes } => {
            let previous = target.attributes().clone();
            target.set_attributes(attributes.clone());
            if let (Tag::Host(_), Some(id)) = (&*target.tag(), target.host()) {
                sync_attributes(host, id, &previous, &attributes)?;
            }
        }
        Patch::SetText { text } => {
            target.set_text(text.as_str());
            if let Some(id) = target.host() {
                host.set_text_content(id, &text)?;
            }
        }
    }
    Ok(())
}

fn sync_attributes(
    host: &mut dyn HostSink,
    id: HostId,
    previous: &Attributes,
    next: &Attributes,
) -> Result<(), RenderError> {
    for (key, value) in next {
        if previous.get(key) != Some(value) {
            host.set_attribute(id, key, value)?;
        }
    }
    for key in previous.keys() {
        if !next.contains_key(key) {
            host.remove_attribute(id, key)?;
        }
    }
    Ok(())
}

/// Places the host counterpart of the child at `index` before its next host sibling.
fn attach(
    parent: &VNode,
    index: usize,
    node: &VNode,
    host: &mut dyn HostSink,
) -> Result<(), RenderError> {
    let (Some(container), Some(id)) = (parent.child_container(), node.host_node()) else {
        return Ok(());
    };
    match parent.host_after(index) {
        Some(before) => host.insert_before(container, id, before)?,
        None => host.append_child(container, id)?,
    }
    Ok(())
}

/// Creates the live subtree for `element` at `index` of `parent`.
///
/// The node is linked into the parent before its contents are built, and
/// unlinked again if building fails. The host counterpart is left detached
/// from the parent's container.
pub fn mount_child(
    parent: &VNode,
    index: usize,
    element: &Element,
    host: &mut dyn HostSink,
    runtime: &RuntimeHandle,
) -> Result<VNode, RenderError> {
    let node = VNode::shell(element);
    parent.insert_child(index, node.clone());
    if let Err(err) = build(&node, element, host, runtime) {
        parent.remove_child(index);
        node.destroy();
        return Err(err);
    }
    Ok(node)
}

fn build(
    node: &VNode,
    element: &Element,
    host: &mut dyn HostSink,
    runtime: &RuntimeHandle,
) -> Result<(), RenderError> {
    match &element.tag {
        Tag::Host(name) => {
            let id = host.create_element(name)?;
            node.set_host(id);
            for (key, value) in &element.attributes {
                host.set_attribute(id, key, value)?;
            }
            let children = flatten_children(&element.children);
            check_unique_keys(name, &children)?;
            for child in &children {
                let child_node = VNode::shell(child);
                node.push_child(child_node.clone());
                build(&child_node, child, host, runtime)?;
                if let Some(child_id) = child_node.host_node() {
                    host.append_child(id, child_id)?;
                }
            }
        }
        Tag::Text(content) => node.set_host(host.create_text(content)?),
        Tag::Empty => node.set_host(host.create_text("")?),
        Tag::Component(ty) => {
            let props = Props::new(element.attributes.clone(), element.children.clone());
            Component::mount(node, ty, props, host, runtime)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/patch_tests.rs"]
mod tests;
