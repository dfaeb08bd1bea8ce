use riact_core::prelude::*;
use riact_core::{Action, HostOp};
use riact_testing::TestRoot;

fn keyed_list(keys: &[i64]) -> Element {
    Element::new("ul").children(
        keys.iter()
            .map(|key| Element::new("li").key(*key).child(key.to_string())),
    )
}

fn list_markup(keys: &[i64]) -> String {
    let items: String = keys.iter().map(|key| format!("<li>{key}</li>")).collect();
    format!("<ul>{items}</ul>")
}

/// Small deterministic generator so failures reproduce.
struct Shuffler(u64);

impl Shuffler {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }

    fn keys(&mut self, universe: i64) -> Vec<i64> {
        let mut keys: Vec<i64> = (0..universe).filter(|_| self.next() % 3 != 0).collect();
        for index in (1..keys.len()).rev() {
            let swap = (self.next() % (index as u64 + 1)) as usize;
            keys.swap(index, swap);
        }
        keys
    }
}

#[test]
fn rotation_moves_one_node_without_recreating_any() {
    let mut root = TestRoot::mount(keyed_list(&[1, 2, 3])).expect("mount");
    root.take_ops();

    let plan = root.diff(&keyed_list(&[2, 3, 1])).expect("diff");
    assert_eq!(plan.count(Action::Move), 1);
    assert_eq!(plan.count(Action::Insert), 0);
    assert_eq!(plan.count(Action::Remove), 0);
    root.apply(plan).expect("apply");

    assert_eq!(root.markup(), list_markup(&[2, 3, 1]));
    let created = root
        .take_ops()
        .into_iter()
        .filter(|op| matches!(op, HostOp::CreateElement { .. } | HostOp::CreateText { .. }))
        .count();
    assert_eq!(created, 0);
}

#[test]
fn keyed_updates_match_fresh_mounts() {
    let mut shuffler = Shuffler(7);
    for _ in 0..120 {
        let before = shuffler.keys(10);
        let after = shuffler.keys(10);

        let mut root = TestRoot::mount(keyed_list(&before)).expect("mount");
        root.render(keyed_list(&after)).expect("render");
        let fresh = TestRoot::mount(keyed_list(&after)).expect("fresh mount");

        assert_eq!(root.markup(), fresh.markup(), "{before:?} -> {after:?}");
    }
}

/// Keyed `li`, `p` and component siblings with unkeyed text and spans between them.
fn mixed_children(shuffler: &mut Shuffler, item: &ComponentType) -> Element {
    let mut children: Vec<Child> = Vec::new();
    for key in shuffler.keys(8) {
        if shuffler.below(3) == 0 {
            children.push(if shuffler.below(2) == 0 {
                Child::from(format!("t{}", shuffler.below(3)))
            } else {
                Element::new("span").child(shuffler.below(3) as i64).into()
            });
        }
        let label = format!("{key}.{}", shuffler.below(2));
        let element = match shuffler.below(3) {
            0 => Element::new("li").key(key).child(label),
            1 => Element::new("p").key(key).child(label),
            _ => item.element().key(key).attr("label", label),
        };
        children.push(element.into());
    }
    Element::new("div").children(children)
}

#[test]
fn mixed_sibling_updates_match_fresh_mounts() {
    let item = ComponentType::new("Item", |hooks, props| {
        let (_, _) = hooks.use_state(0);
        Element::new("em").child(props.str("label").unwrap_or_default().to_owned())
    });
    let mut shuffler = Shuffler(23);
    for _ in 0..200 {
        let before = mixed_children(&mut shuffler, &item);
        let after = mixed_children(&mut shuffler, &item);

        let mut root = TestRoot::mount(before.clone()).expect("mount");
        root.render(after.clone()).expect("render");
        let fresh = TestRoot::mount(after.clone()).expect("fresh mount");

        assert_eq!(root.markup(), fresh.markup(), "{before:?} -> {after:?}");
        assert_eq!(root.diff(&after).expect("diff").patch_count(), 0);
    }
}

#[test]
fn rendering_the_same_tree_twice_is_a_no_op() {
    let tree = Element::new("section")
        .attr("class", "list")
        .child(keyed_list(&[4, 5, 6]))
        .child("footer");
    let mut root = TestRoot::mount(tree.clone()).expect("mount");

    assert!(root.diff(&tree).expect("diff").is_empty());
    root.take_ops();
    root.render(tree).expect("render");
    assert!(root.take_ops().is_empty());
}

#[test]
fn attribute_changes_update_in_place() {
    let mut root = TestRoot::mount(Element::new("p").attr("class", "a").attr("title", "t"))
        .expect("mount");
    root.take_ops();

    root.render(Element::new("p").attr("class", "b")).expect("render");
    assert_eq!(root.markup(), "<p class=\"b\"></p>");
    let ops = root.take_ops();
    assert_eq!(ops.len(), 2);
    assert!(ops.iter().all(|op| !op.is_structural()));
}

#[test]
fn reordered_unkeyed_items_are_rewritten_in_place() {
    let items = |labels: &[&str]| {
        Element::new("ul").children(labels.iter().map(|label| Element::new("li").child(*label)))
    };
    let mut root = TestRoot::mount(items(&["a", "b"])).expect("mount");

    let plan = root.diff(&items(&["b", "a"])).expect("diff");
    assert_eq!(plan.count(Action::Move), 0);
    assert_eq!(plan.count(Action::SetText), 2);
    root.apply(plan).expect("apply");
    assert_eq!(root.markup(), "<ul><li>b</li><li>a</li></ul>");
}
