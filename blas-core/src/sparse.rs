//! Compressed sparse storage (CSR matrices, index/value vectors)
//!
//! Only nonzero entries are stored. NaN compares unequal to zero and is
//! therefore kept, so a sparse container round-trips every IEEE value a dense
//! one can hold.
//!
//! Storage arriving from outside (deserialized payloads, `new`) is checked
//! against the layout invariants before use, so accessors can index without
//! bounds failures.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::ContainerError;

/// Sparse vector: sorted indices with their nonzero values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VectorParts")]
pub struct SparseVector {
    len: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct VectorParts {
    len: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl TryFrom<VectorParts> for SparseVector {
    type Error = ContainerError;

    fn try_from(p: VectorParts) -> Result<Self, Self::Error> {
        SparseVector::new(p.len, p.indices, p.values)
    }
}

impl SparseVector {
    /// Build from raw parts.
    ///
    /// `indices` must be strictly increasing and below `len`, one per value.
    pub fn new(len: usize, indices: Vec<usize>, values: Vec<f64>) -> Result<Self, ContainerError> {
        if indices.len() != values.len() {
            return Err(ContainerError::InvalidStorage("indices and values must have same length"));
        }
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ContainerError::InvalidStorage("indices must be strictly increasing"));
        }
        if indices.last().is_some_and(|&i| i >= len) {
            return Err(ContainerError::InvalidStorage("index past vector length"));
        }
        Ok(Self { len, indices, values })
    }

    pub fn zeros(len: usize) -> Self {
        Self { len, indices: Vec::new(), values: Vec::new() }
    }

    pub fn from_slice(data: &[f64]) -> Self {
        let mut indices = Vec::new();
        let mut values = Vec::new();
        for (i, &x) in data.iter().enumerate() {
            if x != 0.0 {
                indices.push(i);
                values.push(x);
            }
        }
        Self { len: data.len(), indices, values }
    }

    pub fn from_dense(v: &DVector<f64>) -> Self {
        Self::from_slice(v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of stored (nonzero) entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.len {
            return None;
        }
        Some(match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        })
    }

    /// Iterate over stored entries as `(index, value)`
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn to_dense(&self) -> DVector<f64> {
        let mut v = DVector::zeros(self.len);
        for (i, x) in self.iter_nonzero() {
            v[i] = x;
        }
        v
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}

/// Sparse matrix in compressed sparse row layout.
///
/// `row_ptr` has `rows + 1` entries; the stored entries of row `i` are
/// `col_idx[row_ptr[i]..row_ptr[i + 1]]` (strictly increasing) with their
/// `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixParts")]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct MatrixParts {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl TryFrom<MatrixParts> for SparseMatrix {
    type Error = ContainerError;

    fn try_from(p: MatrixParts) -> Result<Self, Self::Error> {
        SparseMatrix::new(p.rows, p.cols, p.row_ptr, p.col_idx, p.values)
    }
}

impl SparseMatrix {
    /// Build from raw CSR parts, checking the layout invariants.
    pub fn new(
        rows: usize,
        cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self, ContainerError> {
        if row_ptr.len() != rows + 1 {
            return Err(ContainerError::InvalidStorage("row_ptr must have length rows + 1"));
        }
        if row_ptr[0] != 0 {
            return Err(ContainerError::InvalidStorage("first row pointer must be 0"));
        }
        if col_idx.len() != values.len() {
            return Err(ContainerError::InvalidStorage("col_idx and values must have same length"));
        }
        if row_ptr[rows] != values.len() {
            return Err(ContainerError::InvalidStorage("last row pointer must equal nnz"));
        }
        if row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(ContainerError::InvalidStorage("row pointers must be non-decreasing"));
        }
        for i in 0..rows {
            let cols_of_row = &col_idx[row_ptr[i]..row_ptr[i + 1]];
            if cols_of_row.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ContainerError::InvalidStorage("column indices must be strictly increasing per row"));
            }
            if cols_of_row.last().is_some_and(|&j| j >= cols) {
                return Err(ContainerError::InvalidStorage("column index past matrix width"));
            }
        }
        Ok(Self { rows, cols, row_ptr, col_idx, values })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn from_dense(m: &DMatrix<f64>) -> Self {
        let (rows, cols) = m.shape();
        let mut row_ptr = vec![0; rows + 1];
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        for i in 0..rows {
            for j in 0..cols {
                let v = m[(i, j)];
                if v != 0.0 {
                    col_idx.push(j);
                    values.push(v);
                }
            }
            row_ptr[i + 1] = col_idx.len();
        }
        Self { rows, cols, row_ptr, col_idx, values }
    }

    /// Square diagonal matrix with `diag` on the main diagonal
    pub fn from_diagonal(diag: &[f64]) -> Self {
        let n = diag.len();
        let mut row_ptr = vec![0; n + 1];
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        for (i, &v) in diag.iter().enumerate() {
            if v != 0.0 {
                col_idx.push(i);
                values.push(v);
            }
            row_ptr[i + 1] = col_idx.len();
        }
        Self { rows: n, cols: n, row_ptr, col_idx, values }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored entries of row `i` as `(column, value)`
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (start, end) = if i < self.rows {
            (self.row_ptr[i], self.row_ptr[i + 1])
        } else {
            (0, 0)
        };
        self.col_idx[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// Number of nonzero entries in row `i`
    pub fn row_cardinality(&self, i: usize) -> usize {
        if i < self.rows {
            self.row_ptr[i + 1] - self.row_ptr[i]
        } else {
            0
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.rows || j >= self.cols {
            return None;
        }
        let (start, end) = (self.row_ptr[i], self.row_ptr[i + 1]);
        Some(match self.col_idx[start..end].binary_search(&j) {
            Ok(pos) => self.values[start + pos],
            Err(_) => 0.0,
        })
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for (j, v) in self.row(i) {
                m[(i, j)] = v;
            }
        }
        m
    }

    /// Compute `y = A * x`. Callers guarantee `x.len() == cols()`.
    pub fn spmv(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.cols);
        (0..self.rows)
            .map(|i| self.row(i).map(|(j, v)| v * x[j]).sum())
            .collect()
    }
}
