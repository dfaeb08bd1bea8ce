//! Boundary between the reconciler and the render target.
//!
//! The reconciler only ever writes through [`HostSink`]; it never reads host
//! state back. [`MemoryHost`] is the in-process implementation used by tests,
//! benchmarks and the demo.

use indexmap::IndexMap;
use thiserror::Error;

use crate::value::AttrValue;

pub type HostId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host node {id} missing")]
    Missing { id: HostId },
    #[error("host node {id} cannot hold children or attributes")]
    NotAnElement { id: HostId },
    #[error("host node {child} is not a child of {parent}")]
    NotAChild { parent: HostId, child: HostId },
    #[error("host rejected the operation: {0}")]
    Rejected(String),
}

/// Write-only render target.
pub trait HostSink {
    fn create_element(&mut self, tag: &str) -> Result<HostId, HostError>;
    fn create_text(&mut self, text: &str) -> Result<HostId, HostError>;
    fn set_attribute(
        &mut self,
        node: HostId,
        key: &str,
        value: &AttrValue,
    ) -> Result<(), HostError>;
    fn remove_attribute(&mut self, node: HostId, key: &str) -> Result<(), HostError>;
    fn append_child(&mut self, parent: HostId, child: HostId) -> Result<(), HostError>;
    fn insert_before(
        &mut self,
        parent: HostId,
        child: HostId,
        before: HostId,
    ) -> Result<(), HostError>;
    fn remove_child(&mut self, parent: HostId, child: HostId) -> Result<(), HostError>;
    fn replace_child(
        &mut self,
        parent: HostId,
        new_child: HostId,
        old_child: HostId,
    ) -> Result<(), HostError>;
    fn set_text_content(&mut self, node: HostId, text: &str) -> Result<(), HostError>;
}

/// One call received by a [`MemoryHost`], in submission order.
#[derive(Clone, Debug, PartialEq)]
pub enum HostOp {
    CreateElement { id: HostId, tag: String },
    CreateText { id: HostId, text: String },
    SetAttribute { node: HostId, key: String, value: AttrValue },
    RemoveAttribute { node: HostId, key: String },
    AppendChild { parent: HostId, child: HostId },
    InsertBefore { parent: HostId, child: HostId, before: HostId },
    RemoveChild { parent: HostId, child: HostId },
    ReplaceChild { parent: HostId, new_child: HostId, old_child: HostId },
    SetTextContent { node: HostId, text: String },
}

impl HostOp {
    /// True for operations that change the shape of the host tree.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HostOp::AppendChild { .. }
                | HostOp::InsertBefore { .. }
                | HostOp::RemoveChild { .. }
                | HostOp::ReplaceChild { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MemoryNodeKind {
    Element(String),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct MemoryNode {
    pub kind: MemoryNodeKind,
    pub attributes: IndexMap<String, AttrValue>,
    pub children: Vec<HostId>,
    pub parent: Option<HostId>,
}

impl MemoryNode {
    fn new(kind: MemoryNodeKind) -> Self {
        Self {
            kind,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// Arena-backed host that records every operation it receives.
#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element to mount an application into. Not recorded.
    pub fn create_root(&mut self, tag: &str) -> HostId {
        self.push_node(MemoryNode::new(MemoryNodeKind::Element(tag.to_owned())))
    }

    pub fn node(&self, id: HostId) -> Option<&MemoryNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: HostId) -> &[HostId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// First attached descendant of `root` (inclusive) whose `key` attribute renders as `value`.
    pub fn find_by_attribute(&self, root: HostId, key: &str, value: &str) -> Option<HostId> {
        let node = self.nodes.get(root)?;
        let matches = node
            .attributes
            .get(key)
            .and_then(AttrValue::to_host_string)
            .is_some_and(|current| current == value);
        if matches {
            return Some(root);
        }
        node.children
            .iter()
            .find_map(|&child| self.find_by_attribute(child, key, value))
    }

    /// Serialises the children of `id` as compact markup; handlers are omitted.
    pub fn markup(&self, id: HostId) -> String {
        let mut output = String::new();
        for &child in self.children(id) {
            self.write_markup(&mut output, child);
        }
        output
    }

    /// Serialises `id` itself, including its own tag.
    pub fn outer_markup(&self, id: HostId) -> String {
        let mut output = String::new();
        self.write_markup(&mut output, id);
        output
    }

    fn write_markup(&self, output: &mut String, id: HostId) {
        let Some(node) = self.nodes.get(id) else {
            output.push_str("<?>");
            return;
        };
        match &node.kind {
            MemoryNodeKind::Text(text) => output.push_str(text),
            MemoryNodeKind::Element(tag) => {
                output.push('<');
                output.push_str(tag);
                for (key, value) in &node.attributes {
                    if let Some(rendered) = value.to_host_string() {
                        output.push_str(&format!(" {key}=\"{rendered}\""));
                    }
                }
                output.push('>');
                for &child in &node.children {
                    self.write_markup(output, child);
                }
                output.push_str(&format!("</{tag}>"));
            }
        }
    }

    pub fn dump_tree(&self, root: HostId) -> String {
        let mut output = String::new();
        self.dump_node(&mut output, root, 0);
        output
    }

    fn dump_node(&self, output: &mut String, id: HostId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.nodes.get(id) {
            Some(node) => {
                match &node.kind {
                    MemoryNodeKind::Element(tag) => {
                        output.push_str(&format!("{indent}[{id}] <{tag}>"));
                        for (key, value) in &node.attributes {
                            if let Some(rendered) = value.to_host_string() {
                                output.push_str(&format!(" {key}={rendered}"));
                            }
                        }
                        output.push('\n');
                    }
                    MemoryNodeKind::Text(text) => {
                        output.push_str(&format!("{indent}[{id}] {text:?}\n"));
                    }
                }
                for &child in &node.children {
                    self.dump_node(output, child, depth + 1);
                }
            }
            None => output.push_str(&format!("{indent}[{id}] (missing)\n")),
        }
    }

    fn push_node(&mut self, node: MemoryNode) -> HostId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    fn get_mut(&mut self, id: HostId) -> Result<&mut MemoryNode, HostError> {
        self.nodes.get_mut(id).ok_or(HostError::Missing { id })
    }

    fn element_mut(&mut self, id: HostId) -> Result<&mut MemoryNode, HostError> {
        let node = self.get_mut(id)?;
        match node.kind {
            MemoryNodeKind::Element(_) => Ok(node),
            MemoryNodeKind::Text(_) => Err(HostError::NotAnElement { id }),
        }
    }

    fn detach(&mut self, child: HostId) -> Result<(), HostError> {
        if let Some(parent) = self.get_mut(child)?.parent.take() {
            let siblings = &mut self.get_mut(parent)?.children;
            siblings.retain(|&id| id != child);
        }
        Ok(())
    }

    fn position_of(&self, parent: HostId, child: HostId) -> Result<usize, HostError> {
        self.nodes
            .get(parent)
            .ok_or(HostError::Missing { id: parent })?
            .children
            .iter()
            .position(|&id| id == child)
            .ok_or(HostError::NotAChild { parent, child })
    }
}

impl HostSink for MemoryHost {
    fn create_element(&mut self, tag: &str) -> Result<HostId, HostError> {
        let id = self.push_node(MemoryNode::new(MemoryNodeKind::Element(tag.to_owned())));
        self.ops.push(HostOp::CreateElement {
            id,
            tag: tag.to_owned(),
        });
        Ok(id)
    }

    fn create_text(&mut self, text: &str) -> Result<HostId, HostError> {
        let id = self.push_node(MemoryNode::new(MemoryNodeKind::Text(text.to_owned())));
        self.ops.push(HostOp::CreateText {
            id,
            text: text.to_owned(),
        });
        Ok(id)
    }

    fn set_attribute(
        &mut self,
        node: HostId,
        key: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        self.element_mut(node)?
            .attributes
            .insert(key.to_owned(), value.clone());
        self.ops.push(HostOp::SetAttribute {
            node,
            key: key.to_owned(),
            value: value.clone(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: HostId, key: &str) -> Result<(), HostError> {
        self.element_mut(node)?.attributes.shift_remove(key);
        self.ops.push(HostOp::RemoveAttribute {
            node,
            key: key.to_owned(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: HostId, child: HostId) -> Result<(), HostError> {
        self.element_mut(parent)?;
        self.detach(child)?;
        self.element_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        self.ops.push(HostOp::AppendChild { parent, child });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: HostId,
        child: HostId,
        before: HostId,
    ) -> Result<(), HostError> {
        self.element_mut(parent)?;
        self.get_mut(child)?;
        self.detach(child)?;
        let index = self.position_of(parent, before)?;
        self.element_mut(parent)?.children.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);
        self.ops.push(HostOp::InsertBefore {
            parent,
            child,
            before,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: HostId, child: HostId) -> Result<(), HostError> {
        let index = self.position_of(parent, child)?;
        self.element_mut(parent)?.children.remove(index);
        self.get_mut(child)?.parent = None;
        self.ops.push(HostOp::RemoveChild { parent, child });
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: HostId,
        new_child: HostId,
        old_child: HostId,
    ) -> Result<(), HostError> {
        self.position_of(parent, old_child)?;
        self.detach(new_child)?;
        let index = self.position_of(parent, old_child)?;
        self.element_mut(parent)?.children[index] = new_child;
        self.get_mut(old_child)?.parent = None;
        self.get_mut(new_child)?.parent = Some(parent);
        self.ops.push(HostOp::ReplaceChild {
            parent,
            new_child,
            old_child,
        });
        Ok(())
    }

    fn set_text_content(&mut self, node: HostId, text: &str) -> Result<(), HostError> {
        let target = self.get_mut(node)?;
        match &mut target.kind {
            MemoryNodeKind::Text(content) => *content = text.to_owned(),
            MemoryNodeKind::Element(_) => {
                target.children.clear();
                let id = self.push_node(MemoryNode {
                    parent: Some(node),
                    ..MemoryNode::new(MemoryNodeKind::Text(text.to_owned()))
                });
                self.nodes[node].children.push(id);
            }
        }
        self.ops.push(HostOp::SetTextContent {
            node,
            text: text.to_owned(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod tests;
