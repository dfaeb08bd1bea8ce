//! Ambient values shared with every component of an application.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::collections::HashMap;
use crate::component::{Component, ComponentInner};

pub type ContextKey = usize;

static NEXT_CONTEXT_KEY: AtomicUsize = AtomicUsize::new(1);

/// Declares an ambient value and the default read when nothing was provided.
#[derive(Clone)]
pub struct Context<T: Clone + 'static> {
    key: ContextKey,
    default: Rc<dyn Fn() -> T>,
}

impl<T: Clone + 'static> Context<T> {
    pub fn new(default: impl Fn() -> T + 'static) -> Self {
        Self {
            key: NEXT_CONTEXT_KEY.fetch_add(1, Ordering::Relaxed),
            default: Rc::new(default),
        }
    }

    pub fn id(&self) -> ContextKey {
        self.key
    }

    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

impl<T: Clone + 'static> PartialEq for Context<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: Clone + 'static> Eq for Context<T> {}

/// Provided values plus the components that read each of them.
#[derive(Default)]
pub struct ContextStore {
    values: RefCell<HashMap<ContextKey, Rc<dyn Any>>>,
    watchers: RefCell<HashMap<ContextKey, Vec<Weak<ComponentInner>>>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Clone + 'static>(&self, context: &Context<T>) -> T {
        self.values
            .borrow()
            .get(&context.key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
            .unwrap_or_else(|| context.default_value())
    }

    /// Stores `value` and returns the mounted components reading `context`.
    pub fn provide<T: Clone + 'static>(&self, context: &Context<T>, value: T) -> Vec<Component> {
        self.values
            .borrow_mut()
            .insert(context.key, Rc::new(value) as Rc<dyn Any>);
        self.watchers(context.key)
    }

    pub fn is_provided<T: Clone + 'static>(&self, context: &Context<T>) -> bool {
        self.values.borrow().contains_key(&context.key)
    }

    pub fn subscribe(&self, key: ContextKey, component: &Component) {
        let mut watchers = self.watchers.borrow_mut();
        let list = watchers.entry(key).or_default();
        let handle = component.downgrade();
        if !list.iter().any(|existing| existing.ptr_eq(&handle)) {
            list.push(handle);
        }
    }

    pub fn unsubscribe(&self, component: &Component) {
        let handle = component.downgrade();
        for list in self.watchers.borrow_mut().values_mut() {
            list.retain(|existing| !existing.ptr_eq(&handle) && existing.strong_count() > 0);
        }
    }

    pub fn watchers(&self, key: ContextKey) -> Vec<Component> {
        let mut watchers = self.watchers.borrow_mut();
        let Some(list) = watchers.get_mut(&key) else {
            return Vec::new();
        };
        list.retain(|existing| existing.strong_count() > 0);
        list.iter()
            .filter_map(Weak::upgrade)
            .map(Component::from_inner)
            .filter(Component::is_mounted)
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
