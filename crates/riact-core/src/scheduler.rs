//! Batched update transactions.
//!
//! State writes never render synchronously. Writes issued while a transaction
//! is open are queued on the batch and settled when it closes; writes issued
//! outside one wait in the microtask queue until [`Scheduler::flush`], where
//! each runs in its own transaction.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::{debug, trace};

use crate::component::{Component, ComponentId};
use crate::config::RuntimeConfig;
use crate::error::RenderError;
use crate::host::HostSink;

pub type Task = Box<dyn FnOnce(&mut Transaction<'_>) -> Result<(), RenderError>>;

/// Hooks run around the work of every transaction.
pub trait TransactionWrapper {
    fn before(&self, _tx: &mut Transaction<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    fn after(&self, _tx: &mut Transaction<'_>) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Settles queued writes and dirty components when a transaction closes.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchingStrategy;

impl TransactionWrapper for BatchingStrategy {
    fn after(&self, tx: &mut Transaction<'_>) -> Result<(), RenderError> {
        tx.flush_batch()
    }
}

struct SchedulerInner {
    performing: Cell<bool>,
    wrappers: RefCell<Vec<Rc<dyn TransactionWrapper>>>,
    dirty: RefCell<Vec<Component>>,
    batched: RefCell<VecDeque<Task>>,
    microtasks: RefCell<VecDeque<Task>>,
    rendering: Cell<Option<ComponentId>>,
    max_flush_passes: Cell<usize>,
    transactions: Cell<u64>,
}

#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl Scheduler {
    pub fn new(config: &RuntimeConfig) -> Self {
        let scheduler = Self::with_wrappers(Vec::new());
        scheduler.inner.max_flush_passes.set(config.max_flush_passes());
        scheduler.add_wrapper(Rc::new(BatchingStrategy));
        scheduler
    }

    /// Scheduler running exactly `wrappers` around each transaction.
    pub fn with_wrappers(wrappers: Vec<Rc<dyn TransactionWrapper>>) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                performing: Cell::new(false),
                wrappers: RefCell::new(wrappers),
                dirty: RefCell::new(Vec::new()),
                batched: RefCell::new(VecDeque::new()),
                microtasks: RefCell::new(VecDeque::new()),
                rendering: Cell::new(None),
                max_flush_passes: Cell::new(RuntimeConfig::default().max_flush_passes()),
                transactions: Cell::new(0),
            }),
        }
    }

    pub fn add_wrapper(&self, wrapper: Rc<dyn TransactionWrapper>) {
        self.inner.wrappers.borrow_mut().push(wrapper);
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn is_performing(&self) -> bool {
        self.inner.performing.get()
    }

    /// Number of transactions opened so far.
    pub fn transaction_count(&self) -> u64 {
        self.inner.transactions.get()
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.microtasks.borrow().len() + self.inner.batched.borrow().len()
    }

    pub fn dirty_count(&self) -> usize {
        self.inner.dirty.borrow().len()
    }

    fn has_unsettled_batch(&self) -> bool {
        !self.inner.batched.borrow().is_empty() || !self.inner.dirty.borrow().is_empty()
    }

    /// Runs `work` inside a transaction: every wrapper's `before`, the work,
    /// then every wrapper's `after`.
    pub fn perform<R>(
        &self,
        host: &mut dyn HostSink,
        work: impl FnOnce(&mut Transaction<'_>) -> Result<R, RenderError>,
    ) -> Result<R, RenderError> {
        let _performing = PerformingGuard::enter(&self.inner);
        let number = self.inner.transactions.get() + 1;
        self.inner.transactions.set(number);
        debug!("transaction {number} opened");

        let wrappers: Vec<Rc<dyn TransactionWrapper>> = self.inner.wrappers.borrow().clone();
        let mut tx = Transaction {
            scheduler: self,
            host,
        };
        for wrapper in &wrappers {
            wrapper.before(&mut tx)?;
        }
        let result = work(&mut tx)?;
        for wrapper in &wrappers {
            wrapper.after(&mut tx)?;
        }
        debug!("transaction {number} closed");
        Ok(result)
    }

    /// Runs `work` in the open transaction, or opens one.
    pub fn batching_update<R>(
        &self,
        host: &mut dyn HostSink,
        work: impl FnOnce(&mut Transaction<'_>) -> Result<R, RenderError>,
    ) -> Result<R, RenderError> {
        if self.is_performing() {
            let mut tx = Transaction {
                scheduler: self,
                host,
            };
            return work(&mut tx);
        }
        self.perform(host, work)
    }

    /// Runs every queued microtask, each in its own transaction.
    ///
    /// Batched writes and dirty components left behind by a transaction that
    /// failed are settled first. Does nothing while a transaction is open.
    pub fn flush(&self, host: &mut dyn HostSink) -> Result<(), RenderError> {
        if self.is_performing() {
            return Ok(());
        }
        if self.has_unsettled_batch() {
            debug!("settling work left by a failed transaction");
            self.perform(&mut *host, |tx| tx.flush_batch())?;
        }
        loop {
            let task = self.inner.microtasks.borrow_mut().pop_front();
            let Some(task) = task else {
                break;
            };
            self.perform(&mut *host, task)?;
        }
        Ok(())
    }

    fn enqueue(&self, task: Task) {
        if self.is_performing() {
            self.inner.batched.borrow_mut().push_back(task);
        } else {
            self.inner.microtasks.borrow_mut().push_back(task);
        }
    }

    fn mark_dirty(&self, component: &Component) {
        if component.mark_dirty() {
            trace!("component `{}` #{} marked dirty", component.name(), component.id());
            self.inner.dirty.borrow_mut().push(component.clone());
        }
    }

    fn take_batched(&self) -> Option<Task> {
        self.inner.batched.borrow_mut().pop_front()
    }

    fn pop_dirty(&self) -> Option<Component> {
        self.inner.dirty.borrow_mut().pop()
    }
}

struct PerformingGuard<'a> {
    inner: &'a SchedulerInner,
    previous: bool,
}

impl<'a> PerformingGuard<'a> {
    fn enter(inner: &'a SchedulerInner) -> Self {
        let previous = inner.performing.replace(true);
        Self { inner, previous }
    }
}

impl Drop for PerformingGuard<'_> {
    fn drop(&mut self) {
        self.inner.performing.set(self.previous);
    }
}

/// Weak reference to a [`Scheduler`] held by components and setters.
#[derive(Clone, Default)]
pub struct SchedulerHandle {
    inner: Weak<SchedulerInner>,
}

impl SchedulerHandle {
    pub fn upgrade(&self) -> Option<Scheduler> {
        self.inner.upgrade().map(|inner| Scheduler { inner })
    }

    /// Queues a task; dropped when the scheduler is gone.
    pub fn enqueue(&self, task: Task) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.enqueue(task);
        }
    }

    /// Claims the rendering slot for `component` until the guard drops.
    pub fn begin_render(&self, component: ComponentId) -> Result<RenderGuard, RenderError> {
        let Some(inner) = self.inner.upgrade() else {
            return Ok(RenderGuard { inner: Weak::new() });
        };
        if let Some(active) = inner.rendering.get() {
            return Err(RenderError::NestedRender {
                active,
                requested: component,
            });
        }
        inner.rendering.set(Some(component));
        Ok(RenderGuard {
            inner: Rc::downgrade(&inner),
        })
    }

    /// Component currently rendering, if any.
    pub fn rendering(&self) -> Option<ComponentId> {
        self.inner.upgrade().and_then(|inner| inner.rendering.get())
    }
}

pub struct RenderGuard {
    inner: Weak<SchedulerInner>,
}

impl Drop for RenderGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.rendering.set(None);
        }
    }
}

/// An open transaction: the scheduler plus exclusive access to the host.
pub struct Transaction<'a> {
    scheduler: &'a Scheduler,
    host: &'a mut dyn HostSink,
}

impl<'a> Transaction<'a> {
    pub fn host(&mut self) -> &mut dyn HostSink {
        &mut *self.host
    }

    pub fn scheduler(&self) -> &Scheduler {
        self.scheduler
    }

    /// Puts `component` on the dirty stack once per cycle.
    pub fn mark_dirty(&mut self, component: &Component) {
        self.scheduler.mark_dirty(component);
    }

    /// Runs `work` inside this transaction.
    pub fn batching_update<R>(
        &mut self,
        work: impl FnOnce(&mut Transaction<'a>) -> Result<R, RenderError>,
    ) -> Result<R, RenderError> {
        work(self)
    }

    /// Drains batched writes, then re-renders dirty components, last marked
    /// first, until nothing is left.
    pub fn flush_batch(&mut self) -> Result<(), RenderError> {
        let limit = self.scheduler.inner.max_flush_passes.get();
        let mut passes = 0;
        loop {
            let mut progressed = false;
            while let Some(task) = self.scheduler.take_batched() {
                task(self)?;
                progressed = true;
            }
            while let Some(component) = self.scheduler.pop_dirty() {
                progressed = true;
                if component.is_dirty() {
                    component.update(&mut *self.host, None)?;
                }
            }
            if !progressed {
                return Ok(());
            }
            passes += 1;
            if passes > limit {
                return Err(RenderError::FlushLimit { passes: limit });
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
