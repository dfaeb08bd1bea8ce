use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info};
use riact_core::prelude::*;
use riact_core::{EventHandler, RenderError, RuntimeConfig};

#[derive(Clone, Debug, PartialEq)]
struct Todo {
    id: i64,
    label: String,
    done: bool,
}

impl Todo {
    fn new(id: i64, label: &str) -> Self {
        Self {
            id,
            label: label.to_owned(),
            done: false,
        }
    }
}

type TodoSetter = Rc<RefCell<Option<Setter<Vec<Todo>>>>>;

fn todo_item(theme: &Context<String>) -> ComponentType {
    let theme = theme.clone();
    ComponentType::new("TodoItem", move |hooks, props| {
        let theme = hooks.use_context(&theme);
        let id = props.number("id").unwrap_or_default() as i64;
        let done = props.bool("done").unwrap_or(false);
        let mut toggle = Element::new("button").attr("id", format!("toggle-{id}"));
        if let Some(handler) = props.get("onToggle").and_then(AttrValue::as_handler) {
            toggle = toggle.attr("onClick", handler.clone());
        }
        Element::new("li")
            .attr("class", format!("{theme} {}", if done { "done" } else { "open" }))
            .child(props.str("label").unwrap_or_default().to_owned())
            .child(toggle.child(if done { "undo" } else { "done" }))
    })
}

fn todo_list(theme: &Context<String>, exposed: TodoSetter) -> ComponentType {
    let item = todo_item(theme);
    ComponentType::new("TodoList", move |hooks, _| {
        let (todos, set_todos) = hooks.use_state(vec![
            Todo::new(1, "write the diff"),
            Todo::new(2, "test the scheduler"),
            Todo::new(3, "ship the demo"),
        ]);
        *exposed.borrow_mut() = Some(set_todos.clone());

        let rows: Vec<Element> = todos
            .iter()
            .map(|todo| {
                let (setter, id) = (set_todos.clone(), todo.id);
                let on_toggle = EventHandler::new(move || {
                    setter.update(move |todos: &Vec<Todo>| {
                        todos
                            .iter()
                            .map(|t| Todo {
                                done: if t.id == id { !t.done } else { t.done },
                                ..t.clone()
                            })
                            .collect()
                    })
                });
                item.element()
                    .key(todo.id)
                    .attr("id", todo.id)
                    .attr("label", todo.label.as_str())
                    .attr("done", todo.done)
                    .attr("onToggle", on_toggle)
            })
            .collect();

        let (reverse, rotate, add) = (set_todos.clone(), set_todos.clone(), set_todos);
        Element::new("main")
            .child(Element::new("ul").children(rows))
            .child(Element::new("button").attr("id", "reverse").on("click", move || {
                reverse.update(|todos: &Vec<Todo>| todos.iter().rev().cloned().collect())
            }))
            .child(Element::new("button").attr("id", "rotate").on("click", move || {
                rotate.update(|todos: &Vec<Todo>| {
                    let mut next = todos.clone();
                    next.rotate_left(1);
                    next
                })
            }))
            .child(Element::new("button").attr("id", "add").on("click", move || {
                add.update(|todos: &Vec<Todo>| {
                    let id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
                    let mut next = todos.clone();
                    next.push(Todo::new(id, &format!("follow up #{id}")));
                    next
                })
            }))
    })
}

fn click(app: &mut App<MemoryHost>, id: &str) -> Result<(), RenderError> {
    match app.host().find_by_attribute(app.container(), "id", id) {
        Some(node) => {
            let ops_before = app.host().ops().len();
            app.dispatch(node, "click")?;
            info!("click #{id}: {} host ops", app.host().ops().len() - ops_before);
        }
        None => error!("no element with id `{id}`"),
    }
    Ok(())
}

fn print_tree(app: &App<MemoryHost>, title: &str) {
    println!("--- {title} ---");
    print!("{}", app.host().dump_tree(app.container()));
    println!();
}

fn main() -> Result<(), RenderError> {
    env_logger::init();

    println!("=== riact todo demo ===");
    println!("Set RIACT_LOG_PATCHES=1 and RUST_LOG=debug to trace every patch.");
    println!();

    let theme = Context::new(|| String::from("light"));
    let exposed: TodoSetter = Rc::default();

    let mut host = MemoryHost::new();
    let container = host.create_root("body");
    let mut app = App::mount_with_config(
        host,
        container,
        todo_list(&theme, exposed.clone()).element(),
        RuntimeConfig::from_env(),
    )?;
    print_tree(&app, "mounted");

    click(&mut app, "reverse")?;
    print_tree(&app, "reversed");

    click(&mut app, "rotate")?;
    click(&mut app, "toggle-2")?;
    print_tree(&app, "rotated, #2 done");

    click(&mut app, "add")?;
    app.provide(&theme, String::from("dark"))?;
    print_tree(&app, "added, dark theme");

    // Writes outside a handler wait for the next flush.
    if let Some(set_todos) = exposed.borrow().clone() {
        set_todos.update(|todos: &Vec<Todo>| todos.iter().filter(|t| !t.done).cloned().collect());
        set_todos.update(|todos: &Vec<Todo>| {
            let mut next = todos.clone();
            next.sort_by(|a, b| a.label.cmp(&b.label));
            next
        });
    }
    if let Err(err) = app.flush() {
        error!("flush failed: {err}");
    }
    print_tree(&app, "cleared done, sorted");

    println!(
        "{} transactions, {} host ops",
        app.scheduler().transaction_count(),
        app.host().ops().len()
    );
    Ok(())
}
