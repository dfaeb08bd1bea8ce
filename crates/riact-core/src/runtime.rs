use std::rc::Rc;

use crate::config::RuntimeConfig;
use crate::context::ContextStore;
use crate::scheduler::{Scheduler, SchedulerHandle};

/// Everything a component needs from the application that owns it.
#[derive(Clone)]
pub struct RuntimeHandle {
    scheduler: SchedulerHandle,
    contexts: Rc<ContextStore>,
    config: RuntimeConfig,
}

impl RuntimeHandle {
    pub fn new(scheduler: &Scheduler, contexts: Rc<ContextStore>, config: RuntimeConfig) -> Self {
        Self {
            scheduler: scheduler.handle(),
            contexts,
            config,
        }
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Scheduler, context store and handle for a standalone runtime.
pub struct Runtime {
    scheduler: Scheduler,
    handle: RuntimeHandle,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let scheduler = Scheduler::new(&config);
        let handle = RuntimeHandle::new(&scheduler, Rc::new(ContextStore::new()), config);
        Self { scheduler, handle }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn handle(&self) -> &RuntimeHandle {
        &self.handle
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
