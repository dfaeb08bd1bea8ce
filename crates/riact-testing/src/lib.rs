//! Testing utilities and harness for riact

pub mod testing;

// Re-export testing utilities
pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
    pub use riact_core::prelude::*;
}
