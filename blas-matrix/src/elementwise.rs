//! Elementwise binary operators over vectors, matrices and scalars

use blas_plugin::prelude::*;
use crate::dispatch::evaluate_windows;

pub(crate) const ELEMENTWISE: &str = "math/blas/elementwise";

/// Binary operator applied entry by entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementwiseOp {
    Add,
    AbsAdd,
    Sub,
    Mul,
    Div,
}

impl ElementwiseOp {
    pub const ALL: [ElementwiseOp; 5] = [
        ElementwiseOp::Add,
        ElementwiseOp::AbsAdd,
        ElementwiseOp::Sub,
        ElementwiseOp::Mul,
        ElementwiseOp::Div,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "+" => Some(ElementwiseOp::Add),
            "|+|" => Some(ElementwiseOp::AbsAdd),
            "-" => Some(ElementwiseOp::Sub),
            "*" => Some(ElementwiseOp::Mul),
            "/" => Some(ElementwiseOp::Div),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ElementwiseOp::Add => "+",
            ElementwiseOp::AbsAdd => "|+|",
            ElementwiseOp::Sub => "-",
            ElementwiseOp::Mul => "*",
            ElementwiseOp::Div => "/",
        }
    }

    /// Division by zero follows IEEE 754 (±inf or NaN).
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            ElementwiseOp::Add => a + b,
            ElementwiseOp::AbsAdd => (a + b).abs(),
            ElementwiseOp::Sub => a - b,
            ElementwiseOp::Mul => a * b,
            ElementwiseOp::Div => a / b,
        }
    }
}

fn apply_vector(lhs: &Vector, op: ElementwiseOp, rhs: &Value) -> Option<Vector> {
    let mut out = lhs.clone();
    if let Some(r) = rhs.as_vector() {
        out.zip_assign(r, |a, b| op.apply(a, b)).ok()?;
    } else if let Some(s) = rhs.as_number() {
        out.map_assign(|a| op.apply(a, s));
    } else {
        return None;
    }
    Some(out)
}

fn apply_matrix(lhs: &Matrix, op: ElementwiseOp, rhs: &Value) -> Option<Matrix> {
    let mut out = lhs.clone();
    if let Some(r) = rhs.as_matrix() {
        out.zip_assign(r, |a, b| op.apply(a, b)).ok()?;
    } else if let Some(s) = rhs.as_number() {
        out.map_assign(|a| op.apply(a, s));
    } else {
        return None;
    }
    Some(out)
}

/// Combine `lhs` and `rhs` with `op`.
///
/// The left operand must be a vector or matrix; the right operand is a
/// container of the same rank and shape, or a scalar. Returns `None` when no
/// combination matches. Neither operand is modified.
pub fn elementwise(lhs: &Value, op: ElementwiseOp, rhs: &Value) -> Option<Value> {
    if let Some(v) = lhs.as_vector() {
        if let Some(out) = apply_vector(v, op, rhs) {
            return Some(out.into());
        }
    }
    if let Some(m) = lhs.as_matrix() {
        if let Some(out) = apply_matrix(m, op, rhs) {
            return Some(out.into());
        }
    }
    None
}

fn evaluate_window(index: usize, window: &[&Value]) -> Result<Value, BlasError> {
    let &[lhs, symbol, rhs] = window else {
        return Err(BlasError::internal(format!("elementwise window of width {}", window.len())));
    };
    symbol
        .as_text()
        .and_then(ElementwiseOp::from_symbol)
        .and_then(|op| elementwise(lhs, op, rhs))
        .ok_or_else(|| BlasError::operator_error(ELEMENTWISE, Some(symbol), index))
}

// ============ elementwise ============

pub struct ElementwiseFn;

static ELEMENTWISE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("lhs", "Vector|Matrix", "Left operand, copied before the operator is applied"),
    ArgMeta::required("operator", "Text", "One of +, |+|, -, *, /"),
    ArgMeta::required("rhs", "Vector|Matrix|Number", "Right operand of the same shape, or a scalar"),
];

static ELEMENTWISE_EXAMPLES: [&str; 3] = [
    "elementwise([2,5,3,8], \"+\", [8,6,2,1]) → [10,11,5,9]",
    "elementwise(m, \"*\", 2) → m with every entry doubled",
    "elementwise(a, \"-\", b, c, \"/\", 4) → two results, one per window",
];
static ELEMENTWISE_RELATED: [&str; 1] = ["math/blas/multiply"];

impl ActionPlugin for ElementwiseFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: ELEMENTWISE,
            description: "Apply a binary operator entry by entry, per window of (lhs, operator, rhs)",
            usage: "elementwise(lhs, op, rhs, ...)",
            args: &ELEMENTWISE_ARGS,
            min_args: 3,
            returns: "Vector|Matrix per window",
            examples: &ELEMENTWISE_EXAMPLES,
            category: "blas",
            related: &ELEMENTWISE_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        let operands = Operands::flatten(args);
        evaluate_windows(ELEMENTWISE, parallel, ctx, &operands, 3, evaluate_window, ret)
    }
}
