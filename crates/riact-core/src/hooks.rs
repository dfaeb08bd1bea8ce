//! Per-render hook access.
//!
//! A [`Hooks`] value exists only for the duration of one render call, so hooks
//! cannot be reached outside of rendering. Slots are matched to calls by order.

use std::any::type_name;
use std::fmt;
use std::rc::Weak;

use crate::component::{Component, ComponentInner};
use crate::context::Context;
use crate::error::HookError;
use crate::scheduler::{SchedulerHandle, Transaction};

pub struct Hooks<'a> {
    component: &'a Component,
    cursor: usize,
    error: Option<HookError>,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(component: &'a Component) -> Self {
        Self {
            component,
            cursor: 0,
            error: None,
        }
    }

    /// Id of the component being rendered.
    pub fn component_id(&self) -> usize {
        self.component.id()
    }

    /// State slot initialised with `initial` on the first render.
    ///
    /// Later renders return the stored value; `initial` is ignored then.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, Setter<T>) {
        let index = self.cursor;
        self.cursor += 1;
        let setter = Setter::new(self.component, index);

        let mut slots = self.component.inner_hooks().borrow_mut();
        if !self.component.is_initialized() {
            slots.push(Box::new(initial.clone()));
            return (initial, setter);
        }
        let stored = slots
            .get(index)
            .map(|slot| slot.downcast_ref::<T>().cloned());
        let recorded = slots.len();
        drop(slots);
        match stored {
            Some(Some(value)) => (value, setter),
            Some(None) => {
                self.fail(HookError::TypeMismatch {
                    component: self.component.name().to_owned(),
                    index,
                    expected: type_name::<T>(),
                });
                (initial, setter)
            }
            None => {
                self.fail(HookError::CountMismatch {
                    component: self.component.name().to_owned(),
                    expected: recorded,
                    found: index + 1,
                });
                (initial, setter)
            }
        }
    }

    /// Current value of `context`; the component re-renders when it changes.
    ///
    /// Does not occupy a state slot.
    pub fn use_context<T: Clone + 'static>(&mut self, context: &Context<T>) -> T {
        let store = self.component.runtime().contexts();
        store.subscribe(context.id(), self.component);
        store.get(context)
    }

    fn fail(&mut self, error: HookError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Checks the calls made during this render against the recorded slots.
    pub(crate) fn finish(self) -> Result<(), HookError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let recorded = self.component.hook_count();
        if self.component.is_initialized() && self.cursor != recorded {
            return Err(HookError::CountMismatch {
                component: self.component.name().to_owned(),
                expected: recorded,
                found: self.cursor,
            });
        }
        Ok(())
    }
}

/// Writes one state slot of a component through the scheduler.
pub struct Setter<T> {
    component: Weak<ComponentInner>,
    index: usize,
    scheduler: SchedulerHandle,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T: 'static> Setter<T> {
    fn new(component: &Component, index: usize) -> Self {
        Self {
            component: component.downgrade(),
            index,
            scheduler: component.runtime().scheduler().clone(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Queues `value` to replace the slot; the component re-renders on the next flush.
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Queues `f(current)` to replace the slot.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        if !self.is_live() {
            return;
        }
        let component = self.component.clone();
        let index = self.index;
        self.scheduler.enqueue(Box::new(move |tx: &mut Transaction<'_>| {
            let Some(inner) = component.upgrade() else {
                return Ok(());
            };
            let component = Component::from_inner(inner);
            if !component.is_mounted() {
                return Ok(());
            }
            {
                let mut slots = component.inner_hooks().borrow_mut();
                let Some(slot) = slots.get_mut(index) else {
                    return Ok(());
                };
                let Some(current) = slot.downcast_ref::<T>() else {
                    return Ok(());
                };
                let next = f(current);
                *slot = Box::new(next);
            }
            tx.mark_dirty(&component);
            Ok(())
        }));
    }

    /// Whether the owning component is still mounted.
    pub fn is_live(&self) -> bool {
        self.component
            .upgrade()
            .map(Component::from_inner)
            .is_some_and(|component| component.is_mounted())
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            index: self.index,
            scheduler: self.scheduler.clone(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("index", &self.index)
            .field("live", &(self.component.strong_count() > 0))
            .finish()
    }
}

impl<T> PartialEq for Setter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && Weak::ptr_eq(&self.component, &other.component)
    }
}
