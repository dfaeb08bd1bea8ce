//! Tree comparison producing a [`PatchPlan`].
//!
//! Sibling lists are reconciled by identity: an explicit key when present,
//! otherwise the position among unkeyed siblings. Common ends are trimmed,
//! removed identities are dropped, and the longest increasing run of retained
//! nodes stays put while everything else moves around it.

use crate::collections::{map_with_capacity, set_with_capacity};
use crate::component::Props;
use crate::element::{flatten_children, Child, Element, Tag};
use crate::error::DiffError;
use crate::lis::longest_increasing_positions;
use crate::patch::{ComponentUpdate, Patch, PatchPlan};
use crate::value::Key;
use crate::vnode::VNode;

/// How a sibling is recognised across renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Identity<'a> {
    Keyed(&'a Key),
    /// Ordinal among the unkeyed siblings of the same list.
    Implicit(usize),
}

fn identities<'a, I>(keys: I) -> Vec<Identity<'a>>
where
    I: IntoIterator<Item = Option<&'a Key>>,
{
    let mut unkeyed = 0;
    keys.into_iter()
        .map(|key| match key {
            Some(key) => Identity::Keyed(key),
            None => {
                unkeyed += 1;
                Identity::Implicit(unkeyed - 1)
            }
        })
        .collect()
}

/// Length of the common prefix and suffix of `old` and `new` under `key`.
///
/// The two never overlap: `head + tail <= min(old.len(), new.len())`.
pub fn trim_by<A, B, K, F, G>(old: &[A], new: &[B], old_key: F, new_key: G) -> (usize, usize)
where
    K: PartialEq,
    F: Fn(&A) -> K,
    G: Fn(&B) -> K,
{
    let limit = old.len().min(new.len());
    let head = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| old_key(a) == new_key(b))
        .count();
    let tail = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(limit - head)
        .take_while(|(a, b)| old_key(a) == new_key(b))
        .count();
    (head, tail)
}

/// Rejects sibling lists in which a key appears twice.
pub fn check_unique_keys(parent: &str, elements: &[Element]) -> Result<(), DiffError> {
    let mut seen = set_with_capacity(elements.len());
    for key in elements.iter().filter_map(|element| element.key.as_ref()) {
        if !seen.insert(key) {
            return Err(DiffError::DuplicateKey {
                key: key.clone(),
                parent: parent.to_owned(),
            });
        }
    }
    Ok(())
}

/// Checks key uniqueness throughout a subtree about to be built from scratch.
///
/// Children of component elements are props and are checked when rendered.
fn check_subtree_keys(element: &Element) -> Result<(), DiffError> {
    if let Tag::Host(name) = &element.tag {
        let children = flatten_children(&element.children);
        check_unique_keys(name, &children)?;
        for child in &children {
            check_subtree_keys(child)?;
        }
    }
    Ok(())
}

/// Plan turning the children of `parent` into `children`.
pub fn diff_children(parent: &VNode, children: &[Child]) -> Result<PatchPlan, DiffError> {
    let elements = flatten_children(children);
    let mut plan = PatchPlan::default();
    let patches = reconcile_children(parent, &elements, &mut plan)?;
    plan.push(parent.clone(), patches);
    Ok(plan)
}

/// Plan turning the rendered subtree held in slot 0 of `boundary` into `element`.
///
/// Keys at the render root are not compared.
pub fn diff_root(boundary: &VNode, element: &Element) -> Result<PatchPlan, DiffError> {
    let mut plan = PatchPlan::default();
    let mut patches = Vec::new();
    match boundary.child(0) {
        Some(current) => match_pair(&current, element, 0, &mut patches, &mut plan)?,
        None => {
            check_subtree_keys(element)?;
            patches.push(Patch::insert(0, element.clone()));
        }
    }
    plan.push(boundary.clone(), patches);
    Ok(plan)
}

/// Plan turning the live node `old` into `new`, replacing it within its parent if needed.
pub fn diff_tree(old: &VNode, new: &Element) -> Result<PatchPlan, DiffError> {
    let mut plan = PatchPlan::default();
    match old.parent() {
        Some(parent) => {
            let index = parent.index_of(old).ok_or_else(|| DiffError::Detached {
                tag: old.tag().name().to_owned(),
            })?;
            let mut patches = Vec::new();
            match_pair(old, new, index, &mut patches, &mut plan)?;
            plan.push(parent, patches);
        }
        None if old.tag_matches(&new.tag) => diff_node(old, new, &mut plan)?,
        None => {
            return Err(DiffError::Detached {
                tag: old.tag().name().to_owned(),
            })
        }
    }
    Ok(plan)
}

fn match_pair(
    old: &VNode,
    new: &Element,
    index: usize,
    patches: &mut Vec<Patch>,
    plan: &mut PatchPlan,
) -> Result<(), DiffError> {
    if old.tag_matches(&new.tag) {
        diff_node(old, new, plan)
    } else {
        check_subtree_keys(new)?;
        patches.push(Patch::replace(index, new.clone()));
        Ok(())
    }
}

/// Compares a node with an element of the same type.
fn diff_node(old: &VNode, new: &Element, plan: &mut PatchPlan) -> Result<(), DiffError> {
    match &new.tag {
        Tag::Text(content) => {
            if old.text().as_deref() != Some(content.as_str()) {
                plan.push(old.clone(), vec![Patch::set_text(content.clone())]);
            }
        }
        Tag::Empty => {}
        Tag::Host(_) => {
            let mut patches = Vec::new();
            if *old.attributes() != new.attributes {
                patches.push(Patch::update_props(new.attributes.clone()));
            }
            let children = flatten_children(&new.children);
            patches.extend(reconcile_children(old, &children, plan)?);
            plan.push(old.clone(), patches);
        }
        Tag::Component(_) => plan.updates.push(ComponentUpdate {
            node: old.clone(),
            props: Props::new(new.attributes.clone(), new.children.clone()),
        }),
    }
    Ok(())
}

/// Patches for the child list of `parent`; descendants go straight into `plan`.
fn reconcile_children(
    parent: &VNode,
    new: &[Element],
    plan: &mut PatchPlan,
) -> Result<Vec<Patch>, DiffError> {
    check_unique_keys(parent.tag().name(), new)?;

    let old: Vec<VNode> = parent.children().clone();
    let old_ids = identities(old.iter().map(VNode::key));
    let new_ids = identities(new.iter().map(|element| element.key.as_ref()));
    let (head, tail) = trim_by(&old_ids, &new_ids, |id| *id, |id| *id);
    let mut patches = Vec::new();

    for index in 0..head {
        match_pair(&old[index], &new[index], index, &mut patches, plan)?;
    }

    let old_span = head..old.len() - tail;
    let new_span = head..new.len() - tail;

    let mut new_positions = map_with_capacity(new_span.len());
    for (slot, id) in new_ids[new_span.clone()].iter().enumerate() {
        new_positions.insert(*id, slot);
    }

    // Retained nodes in their current order, as (old slot, new slot).
    let mut retained: Vec<(usize, usize)> = Vec::with_capacity(old_span.len());
    let mut removed = 0;
    for (slot, id) in old_ids[old_span.clone()].iter().enumerate() {
        match new_positions.get(id) {
            Some(&target) => retained.push((slot, target)),
            None => {
                patches.push(Patch::remove(head + slot - removed));
                removed += 1;
            }
        }
    }

    let mut sources = vec![-1isize; new_span.len()];
    for &(from, to) in &retained {
        sources[to] = from as isize;
    }
    let mut stable = vec![false; new_span.len()];
    for slot in longest_increasing_positions(&sources) {
        stable[slot] = true;
    }

    // Nodes are ordered by (base, new slot). A retained node starts on its old
    // slot as base; a placed node takes the base of the node it was put before,
    // the end of the span being base `old_span.len()`.
    let end = old_span.len();
    let mut placed = PositionIndex::new(end + 1);
    for &(from, _) in &retained {
        placed.add(from);
    }
    let mut bases = vec![end; new_span.len()];
    for slot in (0..new_span.len()).rev() {
        let (anchor, base) = match bases.get(slot + 1) {
            Some(&base) => (placed.count_before(base), base),
            None => (placed.len(), end),
        };
        let element = &new[head + slot];
        if sources[slot] < 0 {
            check_subtree_keys(element)?;
            patches.push(Patch::insert(head + anchor, element.clone()));
            placed.add(base);
            bases[slot] = base;
            continue;
        }
        let from = sources[slot] as usize;
        let at = placed.count_before(from);
        let mut index = at;
        if stable[slot] {
            bases[slot] = from;
        } else {
            let to = if at < anchor { anchor - 1 } else { anchor };
            if at != to {
                patches.push(Patch::relocate(head + at, head + to));
            }
            placed.remove(from);
            placed.add(base);
            bases[slot] = base;
            index = to;
        }
        let source = old_span.start + from;
        match_pair(&old[source], element, head + index, &mut patches, plan)?;
    }

    for offset in 0..tail {
        let from = old.len() - tail + offset;
        let to = new.len() - tail + offset;
        match_pair(&old[from], &new[to], to, &mut patches, plan)?;
    }

    Ok(patches)
}

/// Counts of live nodes per base, answering "how many sit before this base".
struct PositionIndex {
    tree: Vec<usize>,
    len: usize,
}

impl PositionIndex {
    fn new(bases: usize) -> Self {
        Self {
            tree: vec![0; bases + 1],
            len: 0,
        }
    }

    fn add(&mut self, base: usize) {
        self.len += 1;
        let mut at = base + 1;
        while at < self.tree.len() {
            self.tree[at] += 1;
            at += at & at.wrapping_neg();
        }
    }

    fn remove(&mut self, base: usize) {
        self.len -= 1;
        let mut at = base + 1;
        while at < self.tree.len() {
            self.tree[at] -= 1;
            at += at & at.wrapping_neg();
        }
    }

    /// Nodes whose base is below `base`.
    fn count_before(&self, base: usize) -> usize {
        let mut total = 0;
        let mut at = base;
        while at > 0 {
            total += self.tree[at];
            at -= at & at.wrapping_neg();
        }
        total
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
#[path = "tests/diff_tests.rs"]
mod tests;
