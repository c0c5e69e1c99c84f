//! Small regularized least-squares fits.
//!
//! Local fits accumulate normal equations `A x = b` over a vertex
//! neighborhood and solve them with a Tikhonov-regularized Gauss-Seidel
//! iteration. Non-convergence is not an error: the estimate after the
//! iteration cap is returned as is.

use nalgebra::{SMatrix, SVector};
use tracing::trace;

/// Residual norm below which the iteration stops.
pub const RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Maximum number of Gauss-Seidel sweeps.
pub const MAX_SWEEPS: usize = 1000;

/// Fraction of `min |b_i|` added to every diagonal entry.
pub const REGULARIZATION: f64 = 0.1;

/// Normal equations for an `N`-parameter linear model.
#[derive(Debug, Clone)]
pub struct NormalEquations<const N: usize> {
    ata: SMatrix<f64, N, N>,
    atb: SVector<f64, N>,
}

impl<const N: usize> Default for NormalEquations<N> {
    fn default() -> Self {
        Self {
            ata: SMatrix::zeros(),
            atb: SVector::zeros(),
        }
    }
}

impl<const N: usize> NormalEquations<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation `row · x ≈ rhs`.
    #[inline]
    pub fn add_row(&mut self, row: SVector<f64, N>, rhs: f64) {
        self.ata += row * row.transpose();
        self.atb += row * rhs;
    }

    /// Solve the accumulated system.
    pub fn solve(&self) -> SVector<f64, N> {
        solve_regularized(self.ata, &self.atb)
    }
}

/// Solve `(A + λI) x = b` with `λ = 0.1 · min |b_i|` by Gauss-Seidel sweeps.
///
/// Rows with a vanishing diagonal are skipped, leaving that unknown at zero.
pub fn solve_regularized<const N: usize>(
    mut a: SMatrix<f64, N, N>,
    b: &SVector<f64, N>,
) -> SVector<f64, N> {
    let lambda = REGULARIZATION * b.iter().fold(f64::INFINITY, |m, v| m.min(v.abs()));
    if lambda.is_finite() {
        for i in 0..N {
            a[(i, i)] += lambda;
        }
    }

    let mut x = SVector::<f64, N>::zeros();
    let mut residual = f64::INFINITY;
    for sweep in 0..MAX_SWEEPS {
        for i in 0..N {
            let diag = a[(i, i)];
            if diag.abs() < f64::MIN_POSITIVE {
                continue;
            }
            let off: f64 = (0..N).filter(|&j| j != i).map(|j| a[(i, j)] * x[j]).sum();
            x[i] = (b[i] - off) / diag;
        }
        residual = (a * x - b).norm();
        if residual < RESIDUAL_TOLERANCE {
            return x;
        }
        if !residual.is_finite() {
            trace!(sweep, "Local fit diverged");
            break;
        }
    }

    trace!(residual, "Local fit stopped at sweep cap");
    x
}
