//! BLAS Core - Fundamental types
//!
//! This crate provides the core types used by every BLAS action:
//! - `Value`: Boxed values exchanged with the host runtime
//! - `Vector`, `Matrix`: Dense or sparse `f64` containers
//! - `Kind`: Runtime capability queries ("is this value a matrix?")
//! - `Operands`: Flattening and fixed-width windowing of arguments
//! - `BlasError`: Structured errors naming the failing action

mod container;
mod density;
mod error;
mod kind;
mod sparse;
mod value;
mod window;

pub use container::{Matrix, Vector};
pub use density::Density;
pub use error::{codes, BlasError, ContainerError, ErrorContext, Severity};
pub use kind::{is_kind, Kind};
pub use sparse::{SparseMatrix, SparseVector};
pub use value::Value;
pub use window::Operands;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{BlasError, Density, Kind, Matrix, Operands, Severity, Value, Vector};
}
