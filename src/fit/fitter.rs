//! Least-squares fitting of every limb-darkening law.
//!
//! Given:
//! - mu samples `mu_i`
//! - passband-integrated intensities `y_i` (normalised to 1 at the reference mu)
//!
//! we solve, for each law:
//! - `Φ(mu) · c ≈ y - 1` over the law's admissible mu samples
//!
//! Near-limb samples are dropped for the one- to three-parameter laws, whose
//! fits degrade when forced through the steep intensity drop at the limb
//! (Sing 2010). The four-parameter law uses every sample with `mu >= 0`.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::DVector;

use crate::domain::{FitConfig, IntegratedIntensity, LawFit, LawKind, LdCoefficientFit};
use crate::error::LdError;
use crate::math::solve_least_squares;
use crate::models::basis_matrix;

const STAGE: &str = "fit";

/// Indices of the mu samples admissible for `law`.
pub fn admissible_indices(law: LawKind, mu_values: &[f64], config: &FitConfig) -> Vec<usize> {
    let threshold = config.mu_threshold(law);
    mu_values
        .iter()
        .enumerate()
        .filter(|(_, mu)| **mu >= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Fit a single law.
pub fn fit_law(law: LawKind, integrated: &IntegratedIntensity, config: &FitConfig) -> Result<LawFit, LdError> {
    if integrated.mu.len() != integrated.values.len() {
        return Err(LdError::shape(
            STAGE,
            format!(
                "{} mu values but {} integrated intensities",
                integrated.mu.len(),
                integrated.values.len()
            ),
        ));
    }

    let idx = admissible_indices(law, &integrated.mu, config);
    let required = law.param_count();
    if idx.len() < required {
        return Err(LdError::UnderdeterminedFit {
            law,
            admissible: idx.len(),
            required,
        });
    }

    let mu_used: Vec<f64> = idx.iter().map(|&i| integrated.mu[i]).collect();
    let phi = basis_matrix(law, &mu_used);
    let rhs = DVector::from_iterator(idx.len(), idx.iter().map(|&i| integrated.values[i] - 1.0));

    let coeffs = solve_least_squares(&phi, &rhs).ok_or(LdError::SolveFailed { law })?;
    let coefficients: Vec<f64> = coeffs.iter().copied().collect();

    let residual = &phi * &coeffs - &rhs;
    debug!(
        "{law}: {} mu sample(s), coefficients {:?}, rms residual {:.3e}",
        idx.len(),
        coefficients,
        (residual.norm_squared() / idx.len() as f64).sqrt()
    );

    Ok(LawFit { coefficients, mu_used })
}

/// Fit all four laws.
pub fn fit_all_laws(integrated: &IntegratedIntensity, config: &FitConfig) -> Result<LdCoefficientFit, LdError> {
    let mut laws = BTreeMap::new();
    for law in LawKind::ALL {
        laws.insert(law, fit_law(law, integrated, config)?);
    }
    Ok(LdCoefficientFit::from_map(laws))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::models::evaluate;

    fn synthetic(law: LawKind, coeffs: &[f64], mu: &[f64]) -> IntegratedIntensity {
        IntegratedIntensity {
            mu: mu.to_vec(),
            values: evaluate(law, mu, coeffs).unwrap(),
        }
    }

    const MU: [f64; 10] = [1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1];

    #[test]
    fn each_law_recovers_its_own_coefficients() {
        let truths: [(LawKind, &[f64]); 4] = [
            (LawKind::Linear, &[0.6]),
            (LawKind::Quadratic, &[0.4, 0.25]),
            (LawKind::ThreeParamNonlin, &[0.9, -0.7, 0.35]),
            (LawKind::FourParamNonlin, &[0.5, 0.2, 0.1, -0.05]),
        ];
        let config = FitConfig::default();
        for (law, truth) in truths {
            let fit = fit_law(law, &synthetic(law, truth, &MU), &config).unwrap();
            assert_eq!(fit.coefficients.len(), law.param_count());
            for (a, b) in fit.coefficients.iter().zip(truth.iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn admissible_sets_follow_thresholds() {
        let mu = [1.0, 0.5, 0.1, 0.05, 0.04, 0.0];
        let config = FitConfig::default();
        assert_eq!(admissible_indices(LawKind::FourParamNonlin, &mu, &config), vec![0, 1, 2, 3, 4, 5]);
        for law in [LawKind::Linear, LawKind::Quadratic, LawKind::ThreeParamNonlin] {
            let sub = admissible_indices(law, &mu, &config);
            assert_eq!(sub, vec![0, 1, 2, 3]);
            let four = admissible_indices(LawKind::FourParamNonlin, &mu, &config);
            assert!(sub.iter().all(|i| four.contains(i)));
        }
    }

    #[test]
    fn near_limb_samples_do_not_affect_low_order_laws() {
        let mut data = synthetic(LawKind::Linear, &[0.5], &MU);
        let base = fit_law(LawKind::Linear, &data, &FitConfig::default()).unwrap();

        data.mu.push(0.01);
        data.values.push(123.0);
        let perturbed = fit_law(LawKind::Linear, &data, &FitConfig::default()).unwrap();
        assert_eq!(base.coefficients, perturbed.coefficients);
        assert_eq!(perturbed.mu_used, MU.to_vec());
    }

    #[test]
    fn too_few_admissible_samples_is_underdetermined() {
        let data = synthetic(LawKind::Linear, &[0.5], &[1.0, 0.5, 0.02]);
        let err = fit_law(LawKind::ThreeParamNonlin, &data, &FitConfig::default()).unwrap_err();
        match err {
            LdError::UnderdeterminedFit {
                law,
                admissible,
                required,
            } => {
                assert_eq!(law, LawKind::ThreeParamNonlin);
                assert_eq!(admissible, 2);
                assert_eq!(required, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(fit_all_laws(&data, &FitConfig::default()).is_err());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let data = IntegratedIntensity {
            mu: vec![1.0, 0.5],
            values: vec![1.0],
        };
        assert!(matches!(
            fit_law(LawKind::Linear, &data, &FitConfig::default()),
            Err(LdError::ShapeMismatch { stage: "fit", .. })
        ));
    }

    #[test]
    fn fit_all_laws_fills_every_law() {
        let data = synthetic(LawKind::Quadratic, &[0.3, 0.2], &MU);
        let fit = fit_all_laws(&data, &FitConfig::default()).unwrap();
        assert_eq!(fit.len(), 4);
        for law in LawKind::ALL {
            assert_eq!(fit.coefficients(law).len(), law.param_count());
        }
        assert_abs_diff_eq!(fit.coefficients(LawKind::Quadratic)[0], 0.3, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefficients(LawKind::Quadratic)[1], 0.2, epsilon = 1e-10);
    }
}
