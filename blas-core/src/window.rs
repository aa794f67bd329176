//! Flattening of argument sequences into fixed-width operand windows

use crate::{Density, Value};

/// Flattened, borrowed view over an argument sequence.
///
/// Nested lists are expanded depth-first, keeping left-to-right order. The
/// view holds references only, so windows can be taken any number of times.
#[derive(Debug, Clone, Default)]
pub struct Operands<'a> {
    flat: Vec<&'a Value>,
}

impl<'a> Operands<'a> {
    pub fn flatten(args: &'a [Value]) -> Self {
        let mut flat = Vec::with_capacity(args.len());
        push_flat(args, &mut flat);
        Self { flat }
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a Value] {
        &self.flat
    }

    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.flat.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + '_ {
        self.flat.iter().copied()
    }

    /// Non-overlapping windows of `width` operands.
    ///
    /// Yields `len() / width` windows; a trailing partial window is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn windows(&self, width: usize) -> std::slice::ChunksExact<'_, &'a Value> {
        self.flat.chunks_exact(width)
    }

    /// Split off a trailing density selector.
    ///
    /// Returns the operands before the selector and the selected density. When
    /// the last operand is not a recognized selector, every operand is kept
    /// and the density defaults to dense.
    pub fn split_density(&self) -> (&[&'a Value], Density) {
        match self.flat.split_last() {
            Some((last, rest)) => match last.as_text().and_then(Density::parse) {
                Some(density) => (rest, density),
                None => (self.flat.as_slice(), Density::default()),
            },
            None => (self.flat.as_slice(), Density::default()),
        }
    }
}

fn push_flat<'a>(args: &'a [Value], out: &mut Vec<&'a Value>) {
    for arg in args {
        match arg {
            Value::List(items) => push_flat(items, out),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_flatten_depth_first() {
        let args = vec![
            num(1.0),
            Value::List(vec![num(2.0), Value::List(vec![num(3.0), num(4.0)])]),
            num(5.0),
        ];
        let ops = Operands::flatten(&args);
        let flat: Vec<f64> = ops.iter().filter_map(Value::as_number).collect();
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_windows_drop_partial_tail() {
        let args: Vec<Value> = (0..7).map(|i| num(i as f64)).collect();
        let ops = Operands::flatten(&args);
        let windows: Vec<Vec<f64>> = ops
            .windows(3)
            .map(|w| w.iter().filter_map(|v| v.as_number()).collect())
            .collect();
        assert_eq!(windows, vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]);
    }

    #[test]
    fn test_windows_are_restartable() {
        let args: Vec<Value> = (0..4).map(|i| num(i as f64)).collect();
        let ops = Operands::flatten(&args);
        assert_eq!(ops.windows(2).count(), 2);
        assert_eq!(ops.windows(2).count(), 2);
    }

    #[test]
    fn test_split_density() {
        let args = vec![Value::from("1,2"), Value::from("sparse")];
        let ops = Operands::flatten(&args);
        let (rest, density) = ops.split_density();
        assert_eq!(rest.len(), 1);
        assert_eq!(density, Density::Sparse);

        let args = vec![Value::from("1,2"), Value::from("3;4")];
        let ops = Operands::flatten(&args);
        let (rest, density) = ops.split_density();
        assert_eq!(rest.len(), 2);
        assert_eq!(density, Density::Dense);
    }

    #[test]
    fn test_empty() {
        let ops = Operands::flatten(&[]);
        assert!(ops.is_empty());
        assert_eq!(ops.windows(3).count(), 0);
        assert_eq!(ops.split_density().1, Density::Dense);
    }
}
