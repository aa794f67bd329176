//! Matrix access and properties: get, rank, column and row sums

use blas_core::ContainerError;
use blas_plugin::prelude::*;
use crate::decompose::MAX_SVD_ITERATIONS;
use crate::dispatch::evaluate_ordered;
use crate::helpers::{check_finite, extract_matrix, extract_usize};

pub(crate) const GET: &str = "math/blas/matrix/get";
pub(crate) const RANK: &str = "math/blas/matrix/rank";
pub(crate) const COLUMN_SUM: &str = "math/blas/matrix/columnsum";
pub(crate) const ROW_SUM: &str = "math/blas/matrix/rowsum";

/// Numeric rank: singular values above `max(m, n) · σ_max · ε`
///
/// Non-finite entries are rejected with `DOMAIN_ERROR`.
pub fn rank(m: &Matrix) -> Result<usize, BlasError> {
    if m.rows() == 0 || m.cols() == 0 {
        return Ok(0);
    }
    check_finite(m, RANK)?;
    let sv = m
        .dense()
        .into_owned()
        .try_svd_unordered(false, false, f64::EPSILON, MAX_SVD_ITERATIONS)
        .ok_or_else(|| BlasError::domain_error(format!("{}: SVD did not converge", RANK)))?
        .singular_values;
    let sigma_max = sv.iter().copied().fold(0.0_f64, f64::max);
    let tol = m.rows().max(m.cols()) as f64 * sigma_max * f64::EPSILON;
    Ok(sv.iter().filter(|&&s| s > tol).count())
}

// ============================================================================
// GET - Element access
// ============================================================================

pub struct GetFn;

static GET_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("matrix", "Matrix", "Matrix to read"),
    ArgMeta::required("row", "Number", "Row index (0-based)"),
    ArgMeta::required("col", "Number", "Column index (0-based); further (row, col) pairs may follow"),
];
static GET_EXAMPLES: [&str; 2] = [
    "get(m, 0, 1) → element at row 0, col 1",
    "get(m, 0, 0, 1, 1) → two elements",
];
static GET_RELATED: [&str; 1] = [COLUMN_SUM];

impl ActionPlugin for GetFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: GET,
            description: "Read matrix elements at (row, col) index pairs",
            usage: "get(matrix, row, col, ...)",
            args: &GET_ARGS,
            min_args: 3,
            returns: "Number per index pair",
            examples: &GET_EXAMPLES,
            category: "blas/matrix",
            related: &GET_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        let operands = Operands::flatten(args);
        let Some((first, indices)) = operands.as_slice().split_first() else {
            return Err(BlasError::arg_count(GET, 3, 0));
        };
        let m = extract_matrix(first, GET, "matrix")?;

        let pairs: Vec<&[&Value]> = indices.chunks_exact(2).collect();
        evaluate_ordered(GET, parallel, ctx, &pairs, |_, pair| {
            let row = extract_usize(pair[0], GET, "row")?;
            let col = extract_usize(pair[1], GET, "col")?;
            m.get(row, col).map(Value::Number).ok_or_else(|| {
                ContainerError::IndexOutOfBounds {
                    index: format!("({}, {})", row, col),
                    shape: format!("{}×{} matrix", m.rows(), m.cols()),
                }
                .into()
            })
        }, ret)
    }
}

// ============================================================================
// RANK - Numeric rank
// ============================================================================

pub struct RankFn;

static RANK_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "Matrices to analyze")];
static RANK_EXAMPLES: [&str; 2] = [
    "rank([[2,6],[3,8]]) → 2",
    "rank([[1,2],[2,4]]) → 1",
];
static RANK_RELATED: [&str; 1] = ["math/blas/matrix/singularvalue"];

impl ActionPlugin for RankFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: RANK,
            description: "Numeric rank of each matrix, from its singular values",
            usage: "rank(matrix, ...)",
            args: &RANK_ARGS,
            min_args: 1,
            returns: "Number per matrix",
            examples: &RANK_EXAMPLES,
            category: "blas/matrix",
            related: &RANK_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        let operands = Operands::flatten(args);
        evaluate_ordered(RANK, parallel, ctx, operands.as_slice(), |_, v| {
            let m = extract_matrix(v, RANK, "matrix")?;
            Ok(Value::Number(rank(m)? as f64))
        }, ret)
    }
}

// ============================================================================
// COLUMNSUM / ROWSUM
// ============================================================================

/// Density named by the first text operand, dense when there is none
fn sum_density(operands: &Operands<'_>) -> Result<Density, BlasError> {
    operands
        .iter()
        .find_map(Value::as_text)
        .map_or(Ok(Density::default()), Density::select)
}

fn sums(
    action: &str,
    parallel: bool,
    ctx: &ExecContext,
    args: &[Value],
    ret: &mut Vec<Value>,
    f: fn(&Matrix) -> Vec<f64>,
) -> Result<(), BlasError> {
    let operands = Operands::flatten(args);
    let density = sum_density(&operands)?;
    // Operands other than matrices are skipped
    let matrices: Vec<&Matrix> = operands.iter().filter_map(Value::as_matrix).collect();
    evaluate_ordered(action, parallel, ctx, &matrices, |_, m| {
        Ok(Vector::from_vec(f(m), density).into())
    }, ret)
}

pub struct ColumnSumFn;

static COLUMN_SUM_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Matrices to sum"),
    ArgMeta::optional("density", "Text", "Storage of the sum vectors", "dense"),
];
static COLUMN_SUM_EXAMPLES: [&str; 1] = ["columnsum([[1,2],[3,4]]) → [4,6]"];
static COLUMN_SUM_RELATED: [&str; 1] = [ROW_SUM];

impl ActionPlugin for ColumnSumFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: COLUMN_SUM,
            description: "Vector of column sums for each matrix",
            usage: "columnsum(matrix, ..., [density])",
            args: &COLUMN_SUM_ARGS,
            min_args: 1,
            returns: "Vector per matrix",
            examples: &COLUMN_SUM_EXAMPLES,
            category: "blas/matrix",
            related: &COLUMN_SUM_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        sums(COLUMN_SUM, parallel, ctx, args, ret, Matrix::column_sums)
    }
}

pub struct RowSumFn;

static ROW_SUM_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Matrices to sum"),
    ArgMeta::optional("density", "Text", "Storage of the sum vectors", "dense"),
];
static ROW_SUM_EXAMPLES: [&str; 1] = ["rowsum([[1,2],[3,4]]) → [3,7]"];
static ROW_SUM_RELATED: [&str; 1] = [COLUMN_SUM];

impl ActionPlugin for RowSumFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: ROW_SUM,
            description: "Vector of row sums for each matrix",
            usage: "rowsum(matrix, ..., [density])",
            args: &ROW_SUM_ARGS,
            min_args: 1,
            returns: "Vector per matrix",
            examples: &ROW_SUM_EXAMPLES,
            category: "blas/matrix",
            related: &ROW_SUM_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        sums(ROW_SUM, parallel, ctx, args, ret, Matrix::row_sums)
    }
}
