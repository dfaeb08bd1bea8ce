#![doc = r"Component rendering engine: virtual nodes, keyed reconciliation, hooks and batched updates."]

pub mod app;
pub mod collections;
pub mod component;
pub mod config;
pub mod context;
pub mod diff;
pub mod element;
pub mod error;
pub mod hooks;
pub mod host;
pub mod lis;
pub mod patch;
pub mod runtime;
pub mod scheduler;
pub mod value;
pub mod vnode;

pub use app::App;
pub use component::{Component, ComponentId, ComponentType, Declaration, Props};
pub use config::RuntimeConfig;
pub use context::{Context, ContextStore};
pub use diff::{check_unique_keys, diff_children, diff_root, diff_tree, trim_by, Identity};
pub use element::{flatten_children, Child, Element, Tag};
pub use error::{DiffError, HookError, PatchError, RenderError};
pub use hooks::{Hooks, Setter};
pub use host::{HostError, HostId, HostOp, HostSink, MemoryHost, MemoryNode, MemoryNodeKind};
pub use lis::{longest_increasing_positions, longest_increasing_subsequence};
pub use patch::{mount_child, Action, ComponentUpdate, Patch, PatchEntry, PatchPlan};
pub use runtime::{Runtime, RuntimeHandle};
pub use scheduler::{BatchingStrategy, Scheduler, SchedulerHandle, Task, Transaction, TransactionWrapper};
pub use value::{AttrValue, Attributes, EventHandler, Key};
pub use vnode::VNode;

pub mod prelude {
    pub use crate::app::App;
    pub use crate::component::{ComponentType, Props};
    pub use crate::context::Context;
    pub use crate::element::{Child, Element};
    pub use crate::hooks::{Hooks, Setter};
    pub use crate::host::{HostSink, MemoryHost};
    pub use crate::value::{AttrValue, Key};
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
