//! BLAS Plugin System
//!
//! Provides the action interface through which the host runtime invokes
//! numeric operations: the `ActionPlugin` trait, its metadata, the execution
//! context, and the registry that locates actions by name.

mod traits;
mod registry;
mod context;

pub use traits::{ActionPlugin, ActionMeta, ArgMeta};
pub use registry::ActionRegistry;
pub use context::{ExecContext, DEFAULT_PARALLEL_THRESHOLD};

/// Re-export core types for action authors
pub mod prelude {
    pub use crate::{ActionPlugin, ActionMeta, ArgMeta, ActionRegistry, ExecContext};
    pub use blas_core::prelude::*;
}
