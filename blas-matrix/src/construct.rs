//! Container construction: vectors from lists, zero matrices

use blas_plugin::prelude::*;
use crate::dispatch::evaluate_ordered;
use crate::helpers::{extract_number_list, extract_usize, split_density};

pub(crate) const FROM_LIST: &str = "math/blas/vector/fromlist";
pub(crate) const CREATE: &str = "math/blas/matrix/create";

// ============ fromlist ============

pub struct FromListFn;

static FROM_LIST_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("list", "List", "Numbers of one vector; one vector per list argument"),
    ArgMeta::optional("density", "Text", "Storage of every created vector", "dense"),
];

static FROM_LIST_EXAMPLES: [&str; 2] = [
    "fromlist([1,2,3]) → dense vector [1,2,3]",
    "fromlist([1,0], [0,0,5], \"sparse\") → two sparse vectors",
];
static FROM_LIST_RELATED: [&str; 2] = ["math/blas/matrix/create", "math/blas/matrix/parse"];

impl ActionPlugin for FromListFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: FROM_LIST,
            description: "Create a vector from each list of numbers",
            usage: "fromlist(list, ..., [density])",
            args: &FROM_LIST_ARGS,
            min_args: 1,
            returns: "Vector per list",
            examples: &FROM_LIST_EXAMPLES,
            category: "blas/vector",
            related: &FROM_LIST_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        // Each argument is one list, so arguments are not flattened
        let (lists, density) = split_density(args);
        evaluate_ordered(FROM_LIST, parallel, ctx, lists, |_, v| {
            let data = extract_number_list(v, FROM_LIST, "list")?;
            Ok(Vector::from_vec(data, density).into())
        }, ret)
    }
}

// ============ create ============

pub struct CreateFn;

static CREATE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("rows", "Number", "Row count"),
    ArgMeta::required("cols", "Number", "Column count"),
    ArgMeta::optional("density", "Text", "Storage of every created matrix", "dense"),
];

static CREATE_EXAMPLES: [&str; 2] = [
    "create(2, 3) → 2×3 dense zero matrix",
    "create(2, 2, 4, 4, \"sparse\") → 2×2 and 4×4 sparse zero matrices",
];
static CREATE_RELATED: [&str; 2] = [FROM_LIST, "math/blas/matrix/parse"];

impl ActionPlugin for CreateFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: CREATE,
            description: "Create a zero matrix for each (rows, cols) pair",
            usage: "create(rows, cols, ..., [density])",
            args: &CREATE_ARGS,
            min_args: 2,
            returns: "Matrix per (rows, cols)",
            examples: &CREATE_EXAMPLES,
            category: "blas/matrix",
            related: &CREATE_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        let operands = Operands::flatten(args);
        // A trailing text must be a density selector here
        let (sizes, density) = match operands.as_slice().split_last() {
            Some((last, rest)) => match last.as_text() {
                Some(tag) => (rest, Density::select(tag)?),
                None => (operands.as_slice(), Density::default()),
            },
            None => (operands.as_slice(), Density::default()),
        };

        let pairs: Vec<&[&Value]> = sizes.chunks_exact(2).collect();
        evaluate_ordered(CREATE, parallel, ctx, &pairs, |_, w| {
            let rows = extract_usize(w[0], CREATE, "rows")?;
            let cols = extract_usize(w[1], CREATE, "cols")?;
            Ok(Matrix::zeros(rows, cols, density).into())
        }, ret)
    }
}
