//! Structural algorithms: graph Laplacian and Perron–Frobenius power iteration

use blas_core::{ContainerError, SparseMatrix};
use blas_plugin::prelude::*;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dispatch::evaluate_ordered;
use crate::helpers::{check_square, extract_count, extract_matrix};

pub(crate) const GRAPH_LAPLACIAN: &str = "math/blas/matrix/graphlaplacian";
pub(crate) const PERRON_FROBENIUS: &str = "math/blas/matrix/perronfrobenius";

/// Laplacian `D - A` of the adjacency matrix `A`.
///
/// `D` is diagonal with `D[i,i]` the number of nonzero entries in row `i`
/// (not their sum). The result is sparse.
pub fn graph_laplacian(adjacency: &Matrix) -> Result<Matrix, ContainerError> {
    if !adjacency.is_square() {
        return Err(ContainerError::NotSquare { rows: adjacency.rows(), cols: adjacency.cols() });
    }
    let degrees: Vec<f64> = (0..adjacency.rows())
        .map(|i| adjacency.row_cardinality(i) as f64)
        .collect();
    let mut laplacian = Matrix::Sparse(SparseMatrix::from_diagonal(&degrees));
    laplacian.zip_assign(adjacency, |d, a| d - a)?;
    Ok(laplacian)
}

/// One power step: `e ← M·e / ‖M·e‖₂`
fn power_step(m: &Matrix, e: &mut DVector<f64>) {
    let next = match m {
        Matrix::Dense(d) => d * &*e,
        Matrix::Sparse(s) => DVector::from_vec(s.spmv(e.as_slice())),
    };
    // A zero product yields NaN entries
    let norm = next.norm();
    *e = next / norm;
}

/// Estimate the dominant eigenvector of each square matrix.
///
/// Every estimate starts from independent uniform entries in `[0, 1)` drawn
/// from `rng`. The loop is iteration-major: all estimates finish step `t`
/// before any starts step `t + 1`. When `parallel` is set the estimates of
/// one step are updated on the thread pool.
pub fn perron_frobenius<R: Rng>(
    iterations: usize,
    matrices: &[&Matrix],
    rng: &mut R,
    parallel: bool,
) -> Vec<Vector> {
    let mut estimates: Vec<DVector<f64>> = matrices
        .iter()
        .map(|m| DVector::from_fn(m.rows(), |_, _| rng.gen::<f64>()))
        .collect();

    for _ in 0..iterations {
        advance(matrices, &mut estimates, parallel);
    }

    estimates
        .into_iter()
        .map(|e| Vector::from_dense(e, Density::Dense))
        .collect()
}

#[cfg(feature = "rayon")]
fn advance(matrices: &[&Matrix], estimates: &mut [DVector<f64>], parallel: bool) {
    use rayon::prelude::*;

    if parallel {
        estimates
            .par_iter_mut()
            .zip(matrices.par_iter())
            .for_each(|(e, m)| power_step(m, e));
    } else {
        estimates.iter_mut().zip(matrices).for_each(|(e, m)| power_step(m, e));
    }
}

#[cfg(not(feature = "rayon"))]
fn advance(matrices: &[&Matrix], estimates: &mut [DVector<f64>], _parallel: bool) {
    estimates.iter_mut().zip(matrices).for_each(|(e, m)| power_step(m, e));
}

// ============ graphlaplacian ============

pub struct GraphLaplacianFn;

static GRAPH_LAPLACIAN_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("adjacency", "Matrix", "Square adjacency matrix, one Laplacian per argument"),
];

static GRAPH_LAPLACIAN_EXAMPLES: [&str; 1] = ["graphlaplacian([[0,1],[1,0]]) → [[1,-1],[-1,1]]"];
static GRAPH_LAPLACIAN_RELATED: [&str; 2] = [PERRON_FROBENIUS, "math/blas/matrix/rowsum"];

impl ActionPlugin for GraphLaplacianFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: GRAPH_LAPLACIAN,
            description: "Graph Laplacian D - A with D the row cardinalities of A",
            usage: "graphlaplacian(adjacency, ...)",
            args: &GRAPH_LAPLACIAN_ARGS,
            min_args: 1,
            returns: "Matrix (sparse) per adjacency matrix",
            examples: &GRAPH_LAPLACIAN_EXAMPLES,
            category: "blas/matrix",
            related: &GRAPH_LAPLACIAN_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        let operands = Operands::flatten(args);
        evaluate_ordered(GRAPH_LAPLACIAN, parallel, ctx, operands.as_slice(), |_, v| {
            let adjacency = extract_matrix(v, GRAPH_LAPLACIAN, "adjacency")?;
            Ok(graph_laplacian(adjacency)?.into())
        }, ret)
    }
}

// ============ perronfrobenius ============

pub struct PerronFrobeniusFn;

static PERRON_FROBENIUS_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("iterations", "Number", "Number of power iterations"),
    ArgMeta::required("matrix", "Matrix", "Square matrices, one eigenvector estimate each"),
];

static PERRON_FROBENIUS_EXAMPLES: [&str; 1] = [
    "perronfrobenius(5, m) → normalized dominant eigenvector estimate of m",
];
static PERRON_FROBENIUS_RELATED: [&str; 2] = [GRAPH_LAPLACIAN, "math/blas/matrix/singularvalue"];

impl ActionPlugin for PerronFrobeniusFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: PERRON_FROBENIUS,
            description: "Dominant eigenvector estimate by power iteration from a random start",
            usage: "perronfrobenius(iterations, matrix, ...)",
            args: &PERRON_FROBENIUS_ARGS,
            min_args: 2,
            returns: "Vector per matrix",
            examples: &PERRON_FROBENIUS_EXAMPLES,
            category: "blas/matrix",
            related: &PERRON_FROBENIUS_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        let operands = Operands::flatten(args);
        let Some((first, rest)) = operands.as_slice().split_first() else {
            return Err(BlasError::arg_count(PERRON_FROBENIUS, 2, 0));
        };
        let iterations = extract_count(first, PERRON_FROBENIUS, "iterations")?;

        let matrices = rest
            .iter()
            .map(|v| {
                let m = extract_matrix(v, PERRON_FROBENIUS, "matrix")?;
                check_square(m, PERRON_FROBENIUS)?;
                Ok(m)
            })
            .collect::<Result<Vec<&Matrix>, BlasError>>()?;

        let mut rng = match ctx.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let fan_out = ctx.fan_out(parallel, matrices.len());
        tracing::debug!(iterations, matrices = matrices.len(), parallel = fan_out, "power iteration");

        ret.extend(
            perron_frobenius(iterations, &matrices, &mut rng, fan_out)
                .into_iter()
                .map(Value::from),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn matrix(rows: &[&[f64]], density: Density) -> Matrix {
        let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_rows(&rows, density).unwrap()
    }

    fn adjacency(density: Density) -> Matrix {
        matrix(&[
            &[0.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            &[0.0, 1.0, 0.0, 1.0, 0.0, 0.0],
            &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
            &[1.0, 1.0, 0.0, 1.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        ], density)
    }

    #[test]
    fn test_laplacian_sums_vanish() {
        for density in [Density::Dense, Density::Sparse] {
            let l = graph_laplacian(&adjacency(density)).unwrap();
            assert_eq!(l.density(), Density::Sparse);
            assert!(l.row_sums().iter().all(|&s| s == 0.0));
            assert!(l.column_sums().iter().all(|&s| s == 0.0));
            assert_eq!(l.get(1, 1), Some(3.0));
            assert_eq!(l.get(1, 0), Some(-1.0));
        }
    }

    #[test]
    fn test_laplacian_counts_cardinality() {
        let l = graph_laplacian(&matrix(&[&[0.0, 2.0], &[0.5, 0.0]], Density::Dense)).unwrap();
        assert_eq!(l.to_rows(), vec![vec![1.0, -2.0], vec![-0.5, 1.0]]);
    }

    #[test]
    fn test_laplacian_requires_square() {
        let err = graph_laplacian(&matrix(&[&[0.0, 1.0]], Density::Dense)).unwrap_err();
        assert_eq!(err, ContainerError::NotSquare { rows: 1, cols: 2 });
    }

    fn positive() -> Matrix {
        matrix(&[&[0.1, 0.5, 0.3], &[0.5, 0.1, 0.3], &[0.3, 0.3, 0.1]], Density::Dense)
    }

    #[test]
    fn test_power_iteration_converges() {
        let expected = [0.614167, 0.613706, 0.496149];
        for seed in 0..8 {
            for parallel in [false, true] {
                let m = positive();
                let mut rng = StdRng::seed_from_u64(seed);
                let out = perron_frobenius(5, &[&m], &mut rng, parallel);
                let v = out[0].to_vec();
                assert_abs_diff_eq!(out[0].norm(), 1.0, epsilon = 1e-12);
                for (x, e) in v.iter().zip(expected) {
                    assert_abs_diff_eq!(x.abs(), e, epsilon = 0.1);
                }
            }
        }
    }

    #[test]
    fn test_power_iteration_diagonally_dominant() {
        let m = matrix(&[&[4.0, 1.0, 1.0], &[1.0, 3.0, 1.0], &[1.0, 1.0, 2.0]], Density::Sparse);
        let expected = [0.755789, 0.520657, 0.397113];
        for seed in [3, 11, 99, 1234] {
            let out = perron_frobenius(5, &[&m], &mut StdRng::seed_from_u64(seed), false);
            for (x, e) in out[0].to_vec().iter().zip(expected) {
                assert_abs_diff_eq!(x.abs(), e, epsilon = 0.1);
            }
        }
    }

    #[test]
    fn test_fractional_iterations_truncate() {
        let run = |k: f64| {
            let ctx = ExecContext::new().with_seed(5);
            let mut ret = Vec::new();
            PerronFrobeniusFn
                .execute(false, &ctx, &[Value::from(k), positive().into()], &mut ret)
                .unwrap();
            ret
        };
        assert_eq!(run(5.5), run(5.0));
        assert_ne!(run(2.0), run(5.0));
    }

    #[test]
    fn test_power_iteration_seeded_is_reproducible() {
        let dense = positive();
        let sparse = Matrix::from_dense(dense.dense().into_owned(), Density::Sparse);
        let a = perron_frobenius(3, &[&dense, &sparse], &mut StdRng::seed_from_u64(7), false);
        let b = perron_frobenius(3, &[&dense, &sparse], &mut StdRng::seed_from_u64(7), true);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| v.density() == Density::Dense));
    }

    #[test]
    fn test_zero_matrix_gives_nan() {
        let z = Matrix::zeros(2, 2, Density::Dense);
        let out = perron_frobenius(1, &[&z], &mut StdRng::seed_from_u64(1), false);
        assert!(out[0].to_vec().iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_action_rejects_non_square() {
        let args = vec![Value::from(3.0), matrix(&[&[1.0, 2.0]], Density::Dense).into()];
        let mut ret = Vec::new();
        let err = PerronFrobeniusFn.execute(false, &ExecContext::empty(), &args, &mut ret).unwrap_err();
        assert_eq!(err.code, codes::DOMAIN_ERROR);
        assert!(ret.is_empty());
    }
}
