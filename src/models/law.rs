//! Basis terms and evaluation for the four limb-darkening laws.
//!
//! Every law has the form
//!
//! ```text
//! I(mu) / I(1) = 1 - Σ_k c_k g_k(mu)
//! ```
//!
//! with law-specific terms `g_k`:
//!
//! - linear: `1 - mu`
//! - quadratic: `1 - mu`, `(1 - mu)^2`
//! - threeparam_nonlin (Sing 2010): `1 - mu`, `1 - mu^1.5`, `1 - mu^2`
//! - fourparam_nonlin (Claret 2000): `1 - mu^0.5`, `1 - mu`, `1 - mu^1.5`, `1 - mu^2`
//!
//! The design matrix row is `-g_k(mu)`, so `model = 1 + Φ·c`.

use nalgebra::{DMatrix, DVector};

use crate::domain::LawKind;
use crate::error::LdError;

/// Fill the design row `Φ[mu, :]` for the given law.
///
/// # Panics
/// Panics if `out` does not have length `law.param_count()`.
pub fn fill_basis_row(law: LawKind, mu: f64, out: &mut [f64]) {
    assert_eq!(out.len(), law.param_count(), "basis row length mismatch for {law}");
    let one_minus = 1.0 - mu;
    match law {
        LawKind::Linear => {
            out[0] = -one_minus;
        }
        LawKind::Quadratic => {
            out[0] = -one_minus;
            out[1] = -(one_minus * one_minus);
        }
        LawKind::ThreeParamNonlin => {
            out[0] = -one_minus;
            out[1] = -(1.0 - mu.powf(1.5));
            out[2] = -(1.0 - mu * mu);
        }
        LawKind::FourParamNonlin => {
            out[0] = -(1.0 - mu.sqrt());
            out[1] = -one_minus;
            out[2] = -(1.0 - mu.powf(1.5));
            out[3] = -(1.0 - mu * mu);
        }
    }
}

/// Design matrix with one row per mu and one column per coefficient.
pub fn basis_matrix(law: LawKind, mu_values: &[f64]) -> DMatrix<f64> {
    let p = law.param_count();
    let mut phi = DMatrix::<f64>::zeros(mu_values.len(), p);
    let mut row = vec![0.0; p];
    for (i, &mu) in mu_values.iter().enumerate() {
        fill_basis_row(law, mu, &mut row);
        for (j, &v) in row.iter().enumerate() {
            phi[(i, j)] = v;
        }
    }
    phi
}

/// Evaluate `1 + Φ(mu)·c` at a single mu.
///
/// # Panics
/// Panics if `coeffs` does not have length `law.param_count()`; use
/// [`evaluate`] for checked evaluation.
pub fn evaluate_at(law: LawKind, mu: f64, coeffs: &[f64]) -> f64 {
    assert_eq!(coeffs.len(), law.param_count(), "coefficient count mismatch for {law}");
    let mut row = vec![0.0; law.param_count()];
    fill_basis_row(law, mu, &mut row);
    1.0 + row.iter().zip(coeffs.iter()).map(|(g, c)| g * c).sum::<f64>()
}

/// Evaluate the law with the given coefficients at every mu.
pub fn evaluate(law: LawKind, mu_values: &[f64], coeffs: &[f64]) -> Result<Vec<f64>, LdError> {
    check_coeffs(law, coeffs)?;
    Ok(mu_values.iter().map(|&mu| evaluate_at(law, mu, coeffs)).collect())
}

/// Matrix form of [`evaluate`]: `1 + Φ·c` for a precomputed design matrix.
pub fn evaluate_matrix(law: LawKind, phi: &DMatrix<f64>, coeffs: &[f64]) -> Result<DVector<f64>, LdError> {
    check_coeffs(law, coeffs)?;
    if phi.ncols() != coeffs.len() {
        return Err(LdError::shape(
            "law basis",
            format!("design matrix has {} columns, {law} has {}", phi.ncols(), coeffs.len()),
        ));
    }
    let c = DVector::from_column_slice(coeffs);
    Ok((phi * c).add_scalar(1.0))
}

fn check_coeffs(law: LawKind, coeffs: &[f64]) -> Result<(), LdError> {
    if coeffs.len() != law.param_count() {
        return Err(LdError::shape(
            "law basis",
            format!("{law} takes {} coefficient(s), got {}", law.param_count(), coeffs.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const MU: [f64; 6] = [1.0, 0.8, 0.5, 0.25, 0.05, 0.0];

    fn sample_coeffs(law: LawKind) -> Vec<f64> {
        [0.31, -0.12, 0.57, -0.21][..law.param_count()].to_vec()
    }

    #[test]
    fn matrix_and_direct_evaluation_agree() {
        for law in LawKind::ALL {
            let coeffs = sample_coeffs(law);
            let phi = basis_matrix(law, &MU);
            assert_eq!(phi.shape(), (MU.len(), law.param_count()));

            let via_matrix = evaluate_matrix(law, &phi, &coeffs).unwrap();
            let direct = evaluate(law, &MU, &coeffs).unwrap();
            for (a, b) in via_matrix.iter().zip(direct.iter()) {
                assert_relative_eq!(*a, *b, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn every_law_is_one_at_disk_centre() {
        for law in LawKind::ALL {
            let v = evaluate_at(law, 1.0, &sample_coeffs(law));
            assert_eq!(v, 1.0, "{law} at mu=1");
        }
    }

    #[test]
    fn basis_terms_match_closed_forms() {
        let mu: f64 = 0.25;
        let phi = basis_matrix(LawKind::FourParamNonlin, &[mu]);
        assert_relative_eq!(phi[(0, 0)], -(1.0 - 0.5));
        assert_relative_eq!(phi[(0, 1)], -0.75);
        assert_relative_eq!(phi[(0, 2)], -(1.0 - 0.125));
        assert_relative_eq!(phi[(0, 3)], -(1.0 - 0.0625));

        let phi = basis_matrix(LawKind::Quadratic, &[mu]);
        assert_relative_eq!(phi[(0, 1)], -0.5625);

        // Linear law at the limb: I(0) = 1 - u.
        assert_relative_eq!(evaluate_at(LawKind::Linear, 0.0, &[0.6]), 0.4);
    }

    #[test]
    fn wrong_coefficient_count_is_rejected() {
        let err = evaluate(LawKind::Quadratic, &MU, &[0.1]).unwrap_err();
        assert!(matches!(err, LdError::ShapeMismatch { stage: "law basis", .. }));
        let phi = basis_matrix(LawKind::Linear, &MU);
        assert!(evaluate_matrix(LawKind::Quadratic, &phi, &[0.1, 0.2]).is_err());
    }

    #[test]
    #[should_panic(expected = "coefficient count mismatch")]
    fn evaluate_at_panics_on_too_few_coefficients() {
        evaluate_at(LawKind::Quadratic, 0.5, &[0.1]);
    }

    #[test]
    #[should_panic(expected = "coefficient count mismatch")]
    fn evaluate_at_panics_on_extra_coefficients() {
        evaluate_at(LawKind::Linear, 0.5, &[0.1, 9.0, 9.0]);
    }
}
