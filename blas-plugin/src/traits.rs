//! Action traits

use blas_core::{BlasError, Value};
use crate::ExecContext;
use serde::Serialize;

/// Metadata about an action argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false, default: None }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str, default: &'static str) -> Self {
        Self { name, typ, description, optional: true, default: Some(default) }
    }
}

/// Metadata for an action
#[derive(Debug, Clone, Serialize)]
pub struct ActionMeta {
    /// Path-style name, e.g. `math/blas/multiply`
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [ArgMeta],
    /// Minimum number of flattened arguments, checked before `execute`
    pub min_args: usize,
    pub returns: &'static str,
    pub examples: &'static [&'static str],
    pub category: &'static str,
    pub related: &'static [&'static str],
}

/// An action invoked by name from the host runtime.
///
/// `execute` appends its results to `ret` in input order. On failure it
/// returns the error and leaves whatever it already appended in place.
pub trait ActionPlugin: Send + Sync {
    fn meta(&self) -> ActionMeta;

    fn execute(
        &self,
        parallel: bool,
        ctx: &ExecContext,
        args: &[Value],
        ret: &mut Vec<Value>,
    ) -> Result<(), BlasError>;
}
