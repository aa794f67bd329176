//! Ordered evaluation of independent operand windows
//!
//! Every window (or item) is evaluated on its own and its result lands in the
//! slot matching its position, so the return sink sees results in input order
//! whether or not evaluation ran on the thread pool. The first failing slot
//! ends the batch; results of earlier slots stay in the sink.

use blas_core::{BlasError, Operands, Value};
use blas_plugin::ExecContext;

/// Evaluate fixed-width windows of `operands` and append their results.
pub(crate) fn evaluate_windows<F>(
    action: &str,
    parallel: bool,
    ctx: &ExecContext,
    operands: &Operands<'_>,
    width: usize,
    eval: F,
    ret: &mut Vec<Value>,
) -> Result<(), BlasError>
where
    F: Fn(usize, &[&Value]) -> Result<Value, BlasError> + Sync,
{
    let windows: Vec<&[&Value]> = operands.windows(width).collect();
    evaluate_ordered(action, parallel, ctx, &windows, |i, w| eval(i, w), ret)
}

/// Evaluate `items` independently and append one result per item.
pub(crate) fn evaluate_ordered<T, F>(
    action: &str,
    parallel: bool,
    ctx: &ExecContext,
    items: &[T],
    eval: F,
    ret: &mut Vec<Value>,
) -> Result<(), BlasError>
where
    T: Sync,
    F: Fn(usize, &T) -> Result<Value, BlasError> + Sync,
{
    if ctx.fan_out(parallel, items.len()) {
        #[cfg(feature = "rayon")]
        return evaluate_parallel(action, items, &eval, ret);
    }

    for (i, item) in items.iter().enumerate() {
        match eval(i, item) {
            Ok(value) => {
                tracing::trace!(action, index = i, "evaluated");
                ret.push(value);
            }
            Err(e) => {
                tracing::debug!(action, index = i, of = items.len(), "batch aborted");
                return Err(e);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "rayon")]
fn evaluate_parallel<T, F>(action: &str, items: &[T], eval: &F, ret: &mut Vec<Value>) -> Result<(), BlasError>
where
    T: Sync,
    F: Fn(usize, &T) -> Result<Value, BlasError> + Sync,
{
    use rayon::prelude::*;

    // One slot per item; collect keeps slot order
    let slots: Vec<Result<Value, BlasError>> = items
        .par_iter()
        .enumerate()
        .map(|(i, item)| eval(i, item))
        .collect();

    tracing::trace!(action, items = items.len(), "parallel evaluation finished");
    let total = slots.len();
    for (i, slot) in slots.into_iter().enumerate() {
        match slot {
            Ok(value) => ret.push(value),
            Err(e) => {
                tracing::debug!(action, index = i, of = total, "batch aborted");
                return Err(e);
            }
        }
    }
    Ok(())
}
