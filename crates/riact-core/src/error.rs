use thiserror::Error;

use crate::host::HostError;
use crate::value::Key;

/// Structural problems found while comparing two sibling lists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("duplicate key `{key}` among the children of <{parent}>")]
    DuplicateKey { key: Key, parent: String },
    #[error("<{tag}> is not attached to a parent and cannot be replaced")]
    Detached { tag: String },
}

/// Hook usage that breaks the call-order contract of a component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("component `{component}` called {found} hooks but {expected} were recorded on its first render")]
    CountMismatch {
        component: String,
        expected: usize,
        found: usize,
    },
    #[error("hook {index} of component `{component}` does not hold a `{expected}`")]
    TypeMismatch {
        component: String,
        index: usize,
        expected: &'static str,
    },
}

/// A patch that does not fit the node it targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("child index {index} out of bounds for <{parent}> with {len} children")]
    IndexOutOfBounds {
        parent: String,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Diff(#[from] DiffError),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("component #{requested} started rendering while component #{active} was still rendering")]
    NestedRender { active: usize, requested: usize },
    #[error("updates did not settle after {passes} flush passes")]
    FlushLimit { passes: usize },
}
