//! BLAS Matrix - Vector and matrix actions
//!
//! Provides the numeric actions invoked by the host runtime:
//! - Elementwise operators over windows of (lhs, operator, rhs)
//! - Products over windows of (lhs, rhs): outer, matrix-matrix, matrix-vector
//! - Construction (parse, fromlist, create)
//! - Structural algorithms (graph Laplacian, Perron–Frobenius)
//! - Access and properties (get, rank, column/row sums, SVD)
//!
//! Windowed actions evaluate their windows independently. When a call
//! permits parallel execution the windows run on the rayon pool (feature
//! `rayon`, on by default) and results still arrive in window order.

mod helpers;
mod dispatch;
mod elementwise;
mod product;
mod parse;
mod structural;
mod construct;
mod props;
mod decompose;

pub use elementwise::{elementwise, ElementwiseOp};
pub use product::{multiply, Pairing};
pub use parse::parse_matrix;
pub use structural::{graph_laplacian, perron_frobenius};
pub use props::rank;
pub use decompose::{singular_value_decomposition, Svd};

use blas_plugin::ActionRegistry;

/// Load BLAS actions into registry
pub fn load_blas_library(registry: ActionRegistry) -> ActionRegistry {
    registry
        // Windowed arithmetic (2 actions)
        .with_action(elementwise::ElementwiseFn)
        .with_action(product::MultiplyFn)

        // Construction (3 actions)
        .with_action(parse::ParseFn)
        .with_action(construct::FromListFn)
        .with_action(construct::CreateFn)

        // Structural (2 actions)
        .with_action(structural::GraphLaplacianFn)
        .with_action(structural::PerronFrobeniusFn)

        // Access and properties (5 actions)
        .with_action(props::GetFn)
        .with_action(props::RankFn)
        .with_action(props::ColumnSumFn)
        .with_action(props::RowSumFn)
        .with_action(decompose::SingularValueFn)
}
