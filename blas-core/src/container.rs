//! Numeric containers: dense or sparse vectors and matrices of `f64`
//!
//! Containers behave like values. Kernels that combine two containers mutate
//! `self` in place, so callers that must not disturb an operand clone it first.

use std::borrow::Cow;
use std::fmt;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::sparse::{SparseMatrix, SparseVector};
use crate::{ContainerError, Density};

/// A vector with dense or sparse storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Vector {
    Dense(DVector<f64>),
    Sparse(SparseVector),
}

/// A matrix with dense or sparse storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Matrix {
    Dense(DMatrix<f64>),
    Sparse(SparseMatrix),
}

impl Vector {
    pub fn from_vec(data: Vec<f64>, density: Density) -> Self {
        match density {
            Density::Dense => Vector::Dense(DVector::from_vec(data)),
            Density::Sparse => Vector::Sparse(SparseVector::from_slice(&data)),
        }
    }

    pub fn from_dense(data: DVector<f64>, density: Density) -> Self {
        match density {
            Density::Dense => Vector::Dense(data),
            Density::Sparse => Vector::Sparse(SparseVector::from_dense(&data)),
        }
    }

    pub fn zeros(len: usize, density: Density) -> Self {
        match density {
            Density::Dense => Vector::Dense(DVector::zeros(len)),
            Density::Sparse => Vector::Sparse(SparseVector::zeros(len)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Vector::Dense(v) => v.len(),
            Vector::Sparse(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn density(&self) -> Density {
        match self {
            Vector::Dense(_) => Density::Dense,
            Vector::Sparse(_) => Density::Sparse,
        }
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Vector::Dense(v) => v.get(index).copied(),
            Vector::Sparse(v) => v.get(index),
        }
    }

    /// Dense view, borrowing when the storage is already dense
    pub fn dense(&self) -> Cow<'_, DVector<f64>> {
        match self {
            Vector::Dense(v) => Cow::Borrowed(v),
            Vector::Sparse(v) => Cow::Owned(v.to_dense()),
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.dense().as_slice().to_vec()
    }

    /// Euclidean (L2) norm
    pub fn norm(&self) -> f64 {
        match self {
            Vector::Dense(v) => v.norm(),
            Vector::Sparse(v) => v.norm(),
        }
    }

    /// Replace every entry `x` with `f(x)`, zeros included.
    pub fn map_assign(&mut self, f: impl Fn(f64) -> f64) {
        match self {
            Vector::Dense(v) => v.apply(|x| *x = f(*x)),
            Vector::Sparse(v) => {
                let mut dense = v.to_dense();
                dense.apply(|x| *x = f(*x));
                *v = SparseVector::from_dense(&dense);
            }
        }
    }

    /// Replace every entry `x` with `f(x, y)` where `y` is the entry of
    /// `other` at the same position. Lengths must match.
    pub fn zip_assign(&mut self, other: &Vector, f: impl Fn(f64, f64) -> f64) -> Result<(), ContainerError> {
        if self.len() != other.len() {
            return Err(ContainerError::shape(
                format!("vector({})", self.len()),
                format!("vector({})", other.len()),
            ));
        }
        let rhs = other.dense();
        match self {
            Vector::Dense(v) => v.zip_apply(&*rhs, |a, b| *a = f(*a, b)),
            Vector::Sparse(v) => {
                let mut dense = v.to_dense();
                dense.zip_apply(&*rhs, |a, b| *a = f(*a, b));
                *v = SparseVector::from_dense(&dense);
            }
        }
        Ok(())
    }

    /// Outer product `self ⊗ other`, stored like `self`.
    pub fn outer(&self, other: &Vector) -> Matrix {
        let (lhs, rhs) = (self.dense(), other.dense());
        let product = &*lhs * rhs.transpose();
        Matrix::from_dense(product, self.density())
    }
}

impl Matrix {
    pub fn from_dense(data: DMatrix<f64>, density: Density) -> Self {
        match density {
            Density::Dense => Matrix::Dense(data),
            Density::Sparse => Matrix::Sparse(SparseMatrix::from_dense(&data)),
        }
    }

    /// Build from row-major rows of equal length
    pub fn from_rows(rows: &[Vec<f64>], density: Density) -> Result<Self, ContainerError> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(ContainerError::shape(
                format!("row of {} columns", cols),
                format!("row of {} columns", bad.len()),
            ));
        }
        let data = DMatrix::from_fn(rows.len(), cols, |i, j| rows[i][j]);
        Ok(Self::from_dense(data, density))
    }

    pub fn zeros(rows: usize, cols: usize, density: Density) -> Self {
        match density {
            Density::Dense => Matrix::Dense(DMatrix::zeros(rows, cols)),
            Density::Sparse => Matrix::Sparse(SparseMatrix::zeros(rows, cols)),
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.nrows(),
            Matrix::Sparse(m) => m.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.ncols(),
            Matrix::Sparse(m) => m.cols(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    pub fn density(&self) -> Density {
        match self {
            Matrix::Dense(_) => Density::Dense,
            Matrix::Sparse(_) => Density::Sparse,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        match self {
            Matrix::Dense(m) => m.get((row, col)).copied(),
            Matrix::Sparse(m) => m.get(row, col),
        }
    }

    /// Dense view, borrowing when the storage is already dense
    pub fn dense(&self) -> Cow<'_, DMatrix<f64>> {
        match self {
            Matrix::Dense(m) => Cow::Borrowed(m),
            Matrix::Sparse(m) => Cow::Owned(m.to_dense()),
        }
    }

    /// Row-major copy of the entries
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let m = self.dense();
        m.row_iter().map(|r| r.iter().copied().collect()).collect()
    }

    /// Number of nonzero entries in `row`
    pub fn row_cardinality(&self, row: usize) -> usize {
        match self {
            Matrix::Dense(m) => m.row(row).iter().filter(|&&x| x != 0.0).count(),
            Matrix::Sparse(m) => m.row_cardinality(row),
        }
    }

    pub fn row_sums(&self) -> Vec<f64> {
        match self {
            Matrix::Dense(m) => m.row_iter().map(|r| r.sum()).collect(),
            Matrix::Sparse(m) => (0..m.rows()).map(|i| m.row(i).map(|(_, v)| v).sum()).collect(),
        }
    }

    pub fn column_sums(&self) -> Vec<f64> {
        match self {
            Matrix::Dense(m) => m.column_iter().map(|c| c.sum()).collect(),
            Matrix::Sparse(m) => {
                let mut sums = vec![0.0; m.cols()];
                for i in 0..m.rows() {
                    for (j, v) in m.row(i) {
                        sums[j] += v;
                    }
                }
                sums
            }
        }
    }

    /// Replace every entry `x` with `f(x)`, zeros included.
    pub fn map_assign(&mut self, f: impl Fn(f64) -> f64) {
        match self {
            Matrix::Dense(m) => m.apply(|x| *x = f(*x)),
            Matrix::Sparse(m) => {
                let mut dense = m.to_dense();
                dense.apply(|x| *x = f(*x));
                *m = SparseMatrix::from_dense(&dense);
            }
        }
    }

    /// Replace every entry `x` with `f(x, y)` where `y` is the entry of
    /// `other` at the same position. Shapes must match.
    pub fn zip_assign(&mut self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Result<(), ContainerError> {
        if self.shape() != other.shape() {
            return Err(ContainerError::shape(self.shape_label(), other.shape_label()));
        }
        let rhs = other.dense();
        match self {
            Matrix::Dense(m) => m.zip_apply(&*rhs, |a, b| *a = f(*a, b)),
            Matrix::Sparse(m) => {
                let mut dense = m.to_dense();
                dense.zip_apply(&*rhs, |a, b| *a = f(*a, b));
                *m = SparseMatrix::from_dense(&dense);
            }
        }
        Ok(())
    }

    /// Matrix product `self · other`, stored like `self`.
    pub fn mul_matrix(&self, other: &Matrix) -> Result<Matrix, ContainerError> {
        if self.cols() != other.rows() {
            return Err(ContainerError::shape(self.shape_label(), other.shape_label()));
        }
        let (lhs, rhs) = (self.dense(), other.dense());
        let product = &*lhs * &*rhs;
        Ok(Matrix::from_dense(product, self.density()))
    }

    /// Matrix-vector product `self · v`, stored like `self`.
    pub fn mul_vector(&self, v: &Vector) -> Result<Vector, ContainerError> {
        if self.cols() != v.len() {
            return Err(ContainerError::shape(self.shape_label(), format!("vector({})", v.len())));
        }
        Ok(match self {
            Matrix::Dense(m) => Vector::Dense(m * &*v.dense()),
            Matrix::Sparse(m) => Vector::Sparse(SparseVector::from_slice(&m.spmv(&v.to_vec()))),
        })
    }

    /// Rows joined by `"; "`, fields by `","`. The output parses back into
    /// the same matrix.
    pub fn format_rows(&self) -> String {
        self.to_rows()
            .iter()
            .map(|r| r.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(","))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn shape_label(&self) -> String {
        format!("{}×{}", self.rows(), self.cols())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}]({})", self.rows(), self.cols(), self.format_rows())
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vals: Vec<String> = self.to_vec().iter().map(|x| x.to_string()).collect();
        write!(f, "[{}]({})", self.len(), vals.join(","))
    }
}
