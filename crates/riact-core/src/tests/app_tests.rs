use std::cell::{Cell, RefCell};

use super::*;
use crate::component::ComponentType;
use crate::hooks::Setter;
use crate::host::MemoryHost;
use crate::patch::Action;

fn mount(element: Element) -> App<MemoryHost> {
    let mut host = MemoryHost::new();
    let container = host.create_root("body");
    App::mount(host, container, element).expect("mount")
}

fn markup(app: &App<MemoryHost>) -> String {
    app.host().markup(app.container())
}

/// Counter whose button increments by one per click.
fn counter(renders: &Rc<Cell<usize>>) -> ComponentType {
    let renders = renders.clone();
    ComponentType::new("Counter", move |hooks, _| {
        renders.set(renders.get() + 1);
        let (count, set_count) = hooks.use_state(0);
        Element::new("button")
            .attr("id", "inc")
            .on("click", move || set_count.update(|n| n + 1))
            .child(count)
    })
}

#[test]
fn dispatch_runs_handler_in_a_batch() {
    let renders = Rc::new(Cell::new(0));
    let mut app = mount(counter(&renders).element());
    let button = app
        .host()
        .find_by_attribute(app.container(), "id", "inc")
        .expect("button");

    assert!(app.dispatch(button, "click").expect("dispatch"));
    assert_eq!(markup(&app), "<button id=\"inc\">1</button>");
    assert!(!app.dispatch(button, "hover").expect("no handler"));
    assert_eq!(renders.get(), 2);
}

#[test]
fn two_writes_in_one_batch_render_once() {
    let renders = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<Setter<i32>>>> = Rc::default();
    let captured = slot.clone();
    let counted = renders.clone();
    let ty = ComponentType::new("Batched", move |hooks, _| {
        counted.set(counted.get() + 1);
        let (value, set_value) = hooks.use_state(0);
        *captured.borrow_mut() = Some(set_value);
        Element::new("p").child(value)
    });
    let mut app = mount(ty.element());
    let set = slot.borrow().clone().expect("setter");

    app.batching_update(|_| {
        set.set(1);
        set.update(|n| n + 10);
        Ok(())
    })
    .expect("batch");

    assert_eq!(renders.get(), 2);
    assert_eq!(markup(&app), "<p>11</p>");
}

#[test]
fn writes_outside_a_batch_render_per_flush_turn() {
    let renders = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<Setter<i32>>>> = Rc::default();
    let captured = slot.clone();
    let counted = renders.clone();
    let ty = ComponentType::new("Unbatched", move |hooks, _| {
        counted.set(counted.get() + 1);
        let (value, set_value) = hooks.use_state(0);
        *captured.borrow_mut() = Some(set_value);
        Element::new("p").child(value)
    });
    let mut app = mount(ty.element());
    let set = slot.borrow().clone().expect("setter");

    set.set(1);
    set.set(2);
    assert_eq!(renders.get(), 1);
    assert_eq!(markup(&app), "<p>0</p>");

    app.flush().expect("flush");
    assert_eq!(renders.get(), 3);
    assert_eq!(markup(&app), "<p>2</p>");
}

#[test]
fn providing_a_context_rerenders_readers_only() {
    let theme = Context::new(|| "light".to_owned());
    let reader_renders = Rc::new(Cell::new(0));
    let other_renders = Rc::new(Cell::new(0));

    let (ctx, counted) = (theme.clone(), reader_renders.clone());
    let reader = ComponentType::new("Themed", move |hooks, _| {
        counted.set(counted.get() + 1);
        let value = hooks.use_context(&ctx);
        Element::new("span").attr("class", value)
    });
    let counted = other_renders.clone();
    let other = ComponentType::new("Plain", move |_, _| {
        counted.set(counted.get() + 1);
        Element::new("hr")
    });

    let mut app = mount(
        Element::new("div")
            .child(reader.element())
            .child(other.element()),
    );
    assert_eq!(markup(&app), "<div><span class=\"light\"></span><hr></hr></div>");

    app.provide(&theme, "dark".to_owned()).expect("provide");
    assert_eq!(markup(&app), "<div><span class=\"dark\"></span><hr></hr></div>");
    assert_eq!(reader_renders.get(), 2);
    assert_eq!(other_renders.get(), 1);
}

fn item_list(item: &ComponentType, labels: &[&str]) -> Element {
    Element::new("ul").children(
        labels
            .iter()
            .map(|label| item.element().key(*label).attr("label", *label)),
    )
}

#[test]
fn keyed_components_move_with_their_host_nodes() {
    let item = ComponentType::new("Item", |hooks, props| {
        let (label, _) = hooks.use_state(props.str("label").unwrap_or_default().to_owned());
        Element::new("li").child(label)
    });
    let mut app = mount(item_list(&item, &["a", "b", "c"]));
    let first = app
        .root_node()
        .child(0)
        .and_then(|ul| ul.child(0))
        .and_then(|node| node.component())
        .expect("first item");

    let plan = app.diff(&item_list(&item, &["c", "a", "b"])).expect("diff");
    assert_eq!(plan.count(Action::Move), 1);
    assert_eq!(plan.count(Action::Insert) + plan.count(Action::Remove), 0);
    app.apply(plan).expect("apply");

    assert_eq!(markup(&app), "<ul><li>c</li><li>a</li><li>b</li></ul>");
    assert!(first.is_mounted());
    assert_eq!(first.render_count(), 2);
}

#[test]
fn render_replaces_root_of_different_type() {
    let mut app = mount(Element::new("main").child("one"));
    app.render(Element::new("section").child("two")).expect("render");
    assert_eq!(markup(&app), "<section>two</section>");

    app.render(Element::new("section").child("three")).expect("render");
    assert_eq!(markup(&app), "<section>three</section>");
}

#[test]
fn unmount_clears_container_and_components() {
    let renders = Rc::new(Cell::new(0));
    let mut app = mount(Element::new("div").child(counter(&renders).element()));
    let component = app
        .root_node()
        .child(0)
        .and_then(|div| div.child(0))
        .and_then(|node| node.component())
        .expect("counter");

    app.unmount().expect("unmount");
    assert_eq!(markup(&app), "");
    assert!(!component.is_mounted());
    assert_eq!(app.root_node().child_count(), 0);
}

#[test]
fn runaway_updates_hit_the_flush_limit() {
    let ty = ComponentType::new("Runaway", |hooks, _| {
        let (n, set_n) = hooks.use_state(0u32);
        set_n.set(n + 1);
        Element::new("p").child(i64::from(n))
    });
    let mut host = MemoryHost::new();
    let container = host.create_root("body");
    let config = RuntimeConfig::default().with_max_flush_passes(4);

    let err = App::mount_with_config(host, container, ty.element(), config)
        .err()
        .expect("flush limit");
    assert!(matches!(err, RenderError::FlushLimit { passes: 4 }));
}

#[test]
fn duplicate_keys_fail_mount() {
    let mut host = MemoryHost::new();
    let container = host.create_root("body");
    let element = Element::new("ul")
        .child(Element::new("li").key(1))
        .child(Element::new("li").key(1));

    let err = App::mount(host, container, element).err().expect("duplicate key");
    assert!(matches!(err, RenderError::Diff(DiffError::DuplicateKey { .. })));
}

#[test]
fn writes_from_a_failed_batch_land_on_the_next_flush() {
    let slot: Rc<RefCell<Option<Setter<i32>>>> = Rc::default();
    let captured = slot.clone();
    let ty = ComponentType::new("Recovering", move |hooks, _| {
        let (value, set_value) = hooks.use_state(0);
        *captured.borrow_mut() = Some(set_value);
        Element::new("p").child(value)
    });
    let mut app = mount(ty.element());
    let set = slot.borrow().clone().expect("setter");

    let result: Result<(), RenderError> = app.batching_update(|_| {
        set.set(7);
        Err(RenderError::FlushLimit { passes: 0 })
    });
    assert!(result.is_err());
    assert_eq!(markup(&app), "<p>0</p>");

    app.flush().expect("flush");
    assert_eq!(markup(&app), "<p>7</p>");
    assert_eq!(app.scheduler().pending_tasks(), 0);
    assert_eq!(app.scheduler().dirty_count(), 0);
}

#[test]
fn duplicate_keys_deep_in_a_new_subtree_leave_the_tree_untouched() {
    let mut app = mount(Element::new("div").child(Element::new("i").child("x")));
    let broken = Element::new("div").child(Element::new("b").child("y")).child(
        Element::new("ul")
            .child(Element::new("li").key(1))
            .child(Element::new("li").key(1)),
    );

    let err = app.render(broken).expect_err("duplicate key");
    assert!(matches!(err, RenderError::Diff(DiffError::DuplicateKey { .. })));
    assert_eq!(markup(&app), "<div><i>x</i></div>");

    let fixed = Element::new("div")
        .child(Element::new("b").child("y"))
        .child(Element::new("ul").child(Element::new("li").key(1).child("one")));
    app.render(fixed).expect("render");
    assert_eq!(markup(&app), "<div><b>y</b><ul><li>one</li></ul></div>");
}
