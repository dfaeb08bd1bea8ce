use super::*;
use crate::app::App;
use crate::error::HookError;
use crate::hooks::Setter;
use crate::host::MemoryHost;

type Slot<T> = Rc<RefCell<Option<Setter<T>>>>;

fn mount(element: Element) -> App<MemoryHost> {
    let mut host = MemoryHost::new();
    let container = host.create_root("body");
    App::mount(host, container, element).expect("mount")
}

fn markup(app: &App<MemoryHost>) -> String {
    app.host().markup(app.container())
}

fn setter<T>(slot: &Slot<T>) -> Setter<T> {
    slot.borrow().clone().expect("setter captured")
}

#[test]
fn state_slots_keep_identity_across_renders() {
    let count: Slot<i32> = Rc::default();
    let captured = count.clone();
    let ty = ComponentType::new("Pair", move |hooks, _| {
        let (n, set_n) = hooks.use_state(0);
        let (label, _) = hooks.use_state("x".to_owned());
        *captured.borrow_mut() = Some(set_n);
        Element::new("p").child(format!("{n}:{label}"))
    });
    let mut app = mount(ty.element());
    assert_eq!(markup(&app), "<p>0:x</p>");

    setter(&count).set(5);
    app.flush().expect("flush");
    assert_eq!(markup(&app), "<p>5:x</p>");

    setter(&count).update(|n| n + 1);
    app.flush().expect("flush");
    assert_eq!(markup(&app), "<p>6:x</p>");
    assert_eq!(app.root_component().expect("root").hook_count(), 2);
}

#[test]
fn extra_hook_aborts_render_and_keeps_tree() {
    let extra = Rc::new(Cell::new(false));
    let count: Slot<i32> = Rc::default();
    let (flag, captured) = (extra.clone(), count.clone());
    let ty = ComponentType::new("Greedy", move |hooks, _| {
        let (n, set_n) = hooks.use_state(0);
        if flag.get() {
            hooks.use_state(1);
        }
        *captured.borrow_mut() = Some(set_n);
        Element::new("span").child(n)
    });
    let mut app = mount(ty.element());

    extra.set(true);
    setter(&count).set(9);
    let err = app.flush().expect_err("hook count violation");
    assert!(matches!(
        err,
        RenderError::Hook(HookError::CountMismatch {
            expected: 1,
            found: 2,
            ..
        })
    ));
    assert_eq!(markup(&app), "<span>0</span>");
}

#[test]
fn missing_hook_is_a_count_mismatch() {
    let skip = Rc::new(Cell::new(false));
    let count: Slot<i32> = Rc::default();
    let (flag, captured) = (skip.clone(), count.clone());
    let ty = ComponentType::new("Shy", move |hooks, _| {
        let (n, set_n) = hooks.use_state(0);
        if !flag.get() {
            hooks.use_state(());
        }
        *captured.borrow_mut() = Some(set_n);
        Element::new("span").child(n)
    });
    let mut app = mount(ty.element());

    skip.set(true);
    setter(&count).set(1);
    let err = app.flush().expect_err("hook count violation");
    assert!(matches!(
        err,
        RenderError::Hook(HookError::CountMismatch {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn changed_hook_type_is_reported() {
    let as_text = Rc::new(Cell::new(false));
    let count: Slot<i32> = Rc::default();
    let (flag, captured) = (as_text.clone(), count.clone());
    let ty = ComponentType::new("Fickle", move |hooks, _| {
        if flag.get() {
            let (text, _) = hooks.use_state(String::new());
            return Element::new("span").child(text);
        }
        let (n, set_n) = hooks.use_state(0);
        *captured.borrow_mut() = Some(set_n);
        Element::new("span").child(n)
    });
    let mut app = mount(ty.element());

    as_text.set(true);
    setter(&count).set(3);
    let err = app.flush().expect_err("hook type violation");
    match err {
        RenderError::Hook(HookError::TypeMismatch { index, expected, .. }) => {
            assert_eq!(index, 0);
            assert_eq!(expected, std::any::type_name::<String>());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(markup(&app), "<span>0</span>");
}

#[test]
fn before_initialize_runs_once_before_first_render() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let count: Slot<i32> = Rc::default();
    let (init_log, render_log, captured) = (log.clone(), log.clone(), count.clone());
    let ty = ComponentType::declare("Logged", move |hooks, _| {
        let (n, set_n) = hooks.use_state(0);
        *captured.borrow_mut() = Some(set_n);
        render_log.borrow_mut().push(format!("render {n}"));
        Element::new("i")
    })
    .before_initialize(move |props| {
        init_log
            .borrow_mut()
            .push(format!("init {}", props.str("label").unwrap_or("-")));
    })
    .build();
    let mut app = mount(ty.element().attr("label", "a"));

    setter(&count).set(1);
    app.flush().expect("flush");
    assert_eq!(*log.borrow(), vec!["init a", "render 0", "render 1"]);
}

fn counted(name: &str, renders: &Rc<Cell<usize>>) -> Declaration {
    let renders = renders.clone();
    ComponentType::declare(name, move |_, props| {
        renders.set(renders.get() + 1);
        Element::new("em").child(props.str("label").unwrap_or_default().to_owned())
    })
}

fn parent_of(child: &ComponentType, count: &Slot<i32>) -> ComponentType {
    let child = child.clone();
    let captured = count.clone();
    ComponentType::new("Parent", move |hooks, _| {
        let (n, set_n) = hooks.use_state(0);
        *captured.borrow_mut() = Some(set_n);
        Element::new("div")
            .child(n)
            .child(child.element().attr("label", "fixed"))
    })
}

#[test]
fn memo_skips_equal_props() {
    let renders = Rc::new(Cell::new(0));
    let child = counted("Memo", &renders).memo().build();
    let count: Slot<i32> = Rc::default();
    let mut app = mount(parent_of(&child, &count).element());

    setter(&count).set(1);
    app.flush().expect("flush");
    assert_eq!(markup(&app), "<div>1<em>fixed</em></div>");
    assert_eq!(renders.get(), 1);
}

#[test]
fn plain_child_renders_with_parent() {
    let renders = Rc::new(Cell::new(0));
    let child = counted("Plain", &renders).build();
    let count: Slot<i32> = Rc::default();
    let mut app = mount(parent_of(&child, &count).element());

    setter(&count).set(1);
    app.flush().expect("flush");
    assert_eq!(renders.get(), 2);
}

#[test]
fn should_update_sees_previous_props() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = seen.clone();
    let child = ComponentType::declare("Picky", |_, props| {
        Element::new("b").child(props.str("label").unwrap_or_default().to_owned())
    })
    .should_update(move |previous, next| {
        record.borrow_mut().push((
            previous.and_then(|props| props.str("label")).map(str::to_owned),
            next.str("label").map(str::to_owned),
        ));
        false
    })
    .build();

    let mut app = mount(Element::new("main").child(child.element().attr("label", "a")));
    app.render(Element::new("main").child(child.element().attr("label", "b")))
        .expect("render");

    assert_eq!(
        *seen.borrow(),
        vec![(Some("a".to_owned()), Some("b".to_owned()))]
    );
    assert_eq!(markup(&app), "<main><b>a</b></main>");
}

#[test]
fn setter_after_unmount_is_a_no_op() {
    let count: Slot<i32> = Rc::default();
    let captured = count.clone();
    let ty = ComponentType::new("Gone", move |hooks, _| {
        let (n, set_n) = hooks.use_state(0);
        *captured.borrow_mut() = Some(set_n);
        Element::new("p").child(n)
    });
    let mut app = mount(ty.element());
    let component = app.root_component().expect("root");

    let set = setter(&count);
    set.set(1);
    app.unmount().expect("unmount");
    set.set(2);
    assert!(!set.is_live());
    app.flush().expect("queued write is dropped");

    assert!(!component.is_mounted());
    assert_eq!(component.render_count(), 1);
    assert_eq!(markup(&app), "");
}

#[test]
fn component_root_change_replaces_host_node() {
    let toggle: Slot<bool> = Rc::default();
    let captured = toggle.clone();
    let ty = ComponentType::new("Toggle", move |hooks, _| {
        let (on, set_on) = hooks.use_state(false);
        *captured.borrow_mut() = Some(set_on);
        if on {
            Element::new("strong").child("on")
        } else {
            Element::new("span").child("off")
        }
    });
    let mut app = mount(Element::new("div").child("a").child(ty.element()).child("z"));

    setter(&toggle).set(true);
    app.flush().expect("flush");
    assert_eq!(markup(&app), "<div>a<strong>on</strong>z</div>");
}
