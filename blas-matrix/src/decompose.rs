//! Singular value decomposition

use blas_plugin::prelude::*;
use nalgebra::{DMatrix, DVector};
use crate::helpers::{check_finite, extract_matrix};

pub(crate) const SINGULAR_VALUE: &str = "math/blas/matrix/singularvalue";

/// Iteration cap for the implicit-shift SVD
pub(crate) const MAX_SVD_ITERATIONS: usize = 10_000;

/// Thin SVD factors with singular values in decreasing order
#[derive(Debug, Clone)]
pub struct Svd {
    pub singular_values: DVector<f64>,
    pub u: DMatrix<f64>,
    pub v: DMatrix<f64>,
}

/// Decompose `m` as `U · diag(S) · Vᵀ`.
///
/// An empty matrix yields an empty `S` with `U` of shape m×0 and `V` of
/// shape n×0. Non-finite entries are rejected with `DOMAIN_ERROR`.
pub fn singular_value_decomposition(m: &Matrix) -> Result<Svd, BlasError> {
    let (rows, cols) = (m.rows(), m.cols());
    if rows == 0 || cols == 0 {
        return Ok(Svd {
            singular_values: DVector::zeros(0),
            u: DMatrix::zeros(rows, 0),
            v: DMatrix::zeros(cols, 0),
        });
    }
    check_finite(m, SINGULAR_VALUE)?;

    let svd = m
        .dense()
        .into_owned()
        .try_svd_unordered(true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
        .ok_or_else(|| BlasError::domain_error(format!("{}: SVD did not converge", SINGULAR_VALUE)))?;
    let u = svd.u.ok_or_else(|| BlasError::internal("SVD did not produce U"))?;
    let v_t = svd.v_t.ok_or_else(|| BlasError::internal("SVD did not produce Vᵀ"))?;
    let s = svd.singular_values;

    let mut order: Vec<usize> = (0..s.len()).collect();
    order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));

    Ok(Svd {
        singular_values: DVector::from_iterator(order.len(), order.iter().map(|&i| s[i])),
        u: u.select_columns(&order),
        v: v_t.transpose().select_columns(&order),
    })
}

// ============================================================================
// SINGULARVALUE - SVD
// ============================================================================

pub struct SingularValueFn;

static SINGULAR_VALUE_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "Matrices to decompose")];
static SINGULAR_VALUE_EXAMPLES: [&str; 1] = [
    "singularvalue([[2,2],[3,1]]) → S = [4.1306, 0.9684], U, V",
];
static SINGULAR_VALUE_RELATED: [&str; 1] = ["math/blas/matrix/rank"];

impl ActionPlugin for SingularValueFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: SINGULAR_VALUE,
            description: "Singular value decomposition; appends S (vector), U and V per matrix",
            usage: "singularvalue(matrix, ...)",
            args: &SINGULAR_VALUE_ARGS,
            min_args: 1,
            returns: "Vector, Matrix, Matrix per matrix",
            examples: &SINGULAR_VALUE_EXAMPLES,
            category: "blas/matrix",
            related: &SINGULAR_VALUE_RELATED,
        }
    }

    fn execute(&self, _parallel: bool, _ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        for v in Operands::flatten(args).iter() {
            let m = extract_matrix(v, SINGULAR_VALUE, "matrix")?;
            let svd = singular_value_decomposition(m)?;
            ret.push(Vector::from_dense(svd.singular_values, Density::Dense).into());
            ret.push(Matrix::from_dense(svd.u, Density::Dense).into());
            ret.push(Matrix::from_dense(svd.v, Density::Dense).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(rows: &[&[f64]]) -> Matrix {
        let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_rows(&rows, Density::Dense).unwrap()
    }

    #[test]
    fn test_singular_values() {
        let svd = singular_value_decomposition(&matrix(&[&[2.0, 2.0], &[3.0, 1.0]])).unwrap();
        assert_relative_eq!(svd.singular_values[0], 4.130648586880582, epsilon = 1e-10);
        assert_relative_eq!(svd.singular_values[1], 0.9683709267122025, epsilon = 1e-10);
    }

    #[test]
    fn test_factors_reconstruct() {
        let m = matrix(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        let svd = singular_value_decomposition(&m).unwrap();
        assert_eq!(svd.u.shape(), (3, 2));
        assert_eq!(svd.v.shape(), (2, 2));
        let rebuilt = &svd.u * DMatrix::from_diagonal(&svd.singular_values) * svd.v.transpose();
        assert_relative_eq!(rebuilt, m.dense().into_owned(), epsilon = 1e-10);
    }

    #[test]
    fn test_empty_matrix_has_empty_factors() {
        for (rows, cols) in [(0, 0), (0, 3), (3, 0)] {
            let svd = singular_value_decomposition(&Matrix::zeros(rows, cols, Density::Dense)).unwrap();
            assert_eq!(svd.singular_values.len(), 0);
            assert_eq!(svd.u.shape(), (rows, 0));
            assert_eq!(svd.v.shape(), (cols, 0));
        }
    }

    #[test]
    fn test_nan_entries_rejected() {
        let m = matrix(&[&[f64::NAN, 1.0], &[1.0, 1.0]]);
        let err = singular_value_decomposition(&m).unwrap_err();
        assert_eq!(err.code, codes::DOMAIN_ERROR);

        let args = vec![matrix(&[&[1.0]]).into(), Matrix::zeros(2, 2, Density::Sparse).into(), m.into()];
        let mut ret = Vec::new();
        let err = SingularValueFn.execute(false, &ExecContext::empty(), &args, &mut ret).unwrap_err();
        assert_eq!(err.code, codes::DOMAIN_ERROR);
        assert_eq!(ret.len(), 6);
    }

    #[test]
    fn test_action_appends_three_per_matrix() {
        let args = vec![
            matrix(&[&[2.0, 6.0], &[3.0, 8.0]]).into(),
            matrix(&[&[2.0, 2.0], &[3.0, 1.0]]).into(),
        ];
        let mut ret = Vec::new();
        SingularValueFn.execute(false, &ExecContext::empty(), &args, &mut ret).unwrap();
        assert_eq!(ret.len(), 6);
        assert!(ret[0].as_vector().is_some());
        assert!(ret[1].as_matrix().is_some());
        assert!(ret[5].as_matrix().is_some());
    }
}
