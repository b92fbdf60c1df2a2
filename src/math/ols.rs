//! Ordinary least squares solver.
//!
//! Each limb-darkening law is linear in its coefficients, so fitting is a
//! single problem of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T c)^2
//! ```
//!
//! Implementation choices:
//! - We solve via SVD so that tall systems (more mu samples than coefficients)
//!   and rank-deficient systems are both handled.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Singular values below `σ_max · ε · max(rows, cols)` are treated as zero,
//!   which yields the minimum-norm solution when columns are collinear (e.g. a
//!   design matrix whose only rows are at mu = 1, where every basis term
//!   vanishes).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the shapes disagree or the solution is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() == 0 || x.ncols() == 0 {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    if sigma_max == 0.0 {
        // Every column is zero: the minimum-norm solution is zero.
        return Some(DVector::zeros(x.ncols()));
    }

    let rcond = f64::EPSILON * x.nrows().max(x.ncols()) as f64;
    let beta = svd.solve(y, sigma_max * rcond).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}
