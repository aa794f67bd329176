//! Products dispatched on the rank pairing of two operands

use blas_plugin::prelude::*;
use crate::dispatch::evaluate_windows;

pub(crate) const MULTIPLY: &str = "math/blas/multiply";

/// Rank pairing of a product window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// vector ⊗ vector
    Outer,
    MatrixMatrix,
    MatrixVector,
    /// vector × matrix, evaluated as matrix × vector with the roles exchanged
    VectorMatrix,
}

impl Pairing {
    /// Candidates in the order they are tried
    pub const PRIORITY: [Pairing; 4] = [
        Pairing::Outer,
        Pairing::MatrixMatrix,
        Pairing::MatrixVector,
        Pairing::VectorMatrix,
    ];

    pub fn kinds(&self) -> (Kind, Kind) {
        match self {
            Pairing::Outer => (Kind::Vector, Kind::Vector),
            Pairing::MatrixMatrix => (Kind::Matrix, Kind::Matrix),
            Pairing::MatrixVector => (Kind::Matrix, Kind::Vector),
            Pairing::VectorMatrix => (Kind::Vector, Kind::Matrix),
        }
    }

    pub fn matches(&self, lhs: &Value, rhs: &Value) -> bool {
        let (l, r) = self.kinds();
        lhs.is_kind(l) && rhs.is_kind(r)
    }

    /// Compute the product for this pairing.
    ///
    /// Returns `None` when the operands do not have this pairing's kinds or
    /// their shapes are not conformant.
    pub fn apply(&self, lhs: &Value, rhs: &Value) -> Option<Value> {
        match self {
            Pairing::Outer => {
                let (u, v) = (lhs.as_vector()?, rhs.as_vector()?);
                Some(u.outer(v).into())
            }
            Pairing::MatrixMatrix => {
                let (a, b) = (lhs.as_matrix()?, rhs.as_matrix()?);
                a.mul_matrix(b).ok().map(Value::from)
            }
            Pairing::MatrixVector => {
                let (m, v) = (lhs.as_matrix()?, rhs.as_vector()?);
                m.mul_vector(v).ok().map(Value::from)
            }
            Pairing::VectorMatrix => {
                let (v, m) = (lhs.as_vector()?, rhs.as_matrix()?);
                m.mul_vector(v).ok().map(Value::from)
            }
        }
    }
}

/// Multiply `lhs` by `rhs` using the first pairing whose kinds match.
///
/// Returns `None` when no pairing matches or the matching pairing rejects
/// the shapes.
pub fn multiply(lhs: &Value, rhs: &Value) -> Option<Value> {
    Pairing::PRIORITY
        .iter()
        .find(|p| p.matches(lhs, rhs))
        .and_then(|p| p.apply(lhs, rhs))
}

fn evaluate_window(index: usize, window: &[&Value]) -> Result<Value, BlasError> {
    let &[lhs, rhs] = window else {
        return Err(BlasError::internal(format!("product window of width {}", window.len())));
    };
    multiply(lhs, rhs).ok_or_else(|| {
        BlasError::operator_error(MULTIPLY, None, index)
            .with_note(format!("operands: {} and {}", lhs.type_name(), rhs.type_name()))
    })
}

// ============ multiply ============

pub struct MultiplyFn;

static MULTIPLY_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("lhs", "Vector|Matrix", "Left multiplicand"),
    ArgMeta::required("rhs", "Vector|Matrix", "Right multiplicand"),
];

static MULTIPLY_EXAMPLES: [&str; 3] = [
    "multiply([1,2], [3,4]) → [[3,4],[6,8]] (outer product)",
    "multiply(a, b) → a·b for conformant matrices",
    "multiply(m, v) → m·v",
];
static MULTIPLY_RELATED: [&str; 1] = ["math/blas/elementwise"];

impl ActionPlugin for MultiplyFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: MULTIPLY,
            description: "Outer, matrix-matrix or matrix-vector product per window of (lhs, rhs)",
            usage: "multiply(lhs, rhs, ...)",
            args: &MULTIPLY_ARGS,
            min_args: 2,
            returns: "Vector|Matrix per window",
            examples: &MULTIPLY_EXAMPLES,
            category: "blas",
            related: &MULTIPLY_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        let operands = Operands::flatten(args);
        evaluate_windows(MULTIPLY, parallel, ctx, &operands, 2, evaluate_window, ret)
    }
}
