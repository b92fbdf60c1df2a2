//! Synthetic stellar intensity grids.
//!
//! Grids are built as `continuum(λ) · law(mu)`: a wavelength-dependent
//! continuum scaled by a limb-darkening profile. Because the profile does not
//! depend on wavelength, fitting the generating law to such a grid recovers
//! its coefficients for any passband. Useful for smoke tests and demos.

use nalgebra::DMatrix;

use crate::domain::{LawKind, StellarGrid};
use crate::error::LdError;
use crate::math::linspace;
use crate::models::evaluate;

/// Grid with the same intensity at every wavelength and mu.
pub fn flat_grid(mu_values: Vec<f64>, wavelength_nm: Vec<f64>, level: f64) -> Result<StellarGrid, LdError> {
    let intensity = DMatrix::from_element(wavelength_nm.len(), mu_values.len(), level);
    StellarGrid::new(mu_values, wavelength_nm, intensity)
}

/// Grid whose mu dependence follows `law` with `coeffs` and whose wavelength
/// dependence follows `continuum`.
pub fn law_grid(
    law: LawKind,
    coeffs: &[f64],
    mu_values: Vec<f64>,
    wavelength_nm: Vec<f64>,
    continuum: impl Fn(f64) -> f64,
) -> Result<StellarGrid, LdError> {
    let profile = evaluate(law, &mu_values, coeffs)?;
    let intensity = DMatrix::from_fn(wavelength_nm.len(), mu_values.len(), |r, c| {
        continuum(wavelength_nm[r]) * profile[c]
    });
    StellarGrid::new(mu_values, wavelength_nm, intensity)
}

/// Linear-law grid `I = 1 - u (1 - mu)` on an evenly spaced wavelength axis.
pub fn linear_grid(mu_values: Vec<f64>, wavl: f64, wavu: f64, n_wavelengths: usize, u: f64) -> Result<StellarGrid, LdError> {
    law_grid(
        LawKind::Linear,
        &[u],
        mu_values,
        linspace(wavl, wavu, n_wavelengths),
        |_| 1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_grid_is_constant() {
        let grid = flat_grid(vec![1.0, 0.5], vec![500.0, 510.0, 520.0], 2.5).unwrap();
        assert_eq!(grid.column(1), &[2.5, 2.5, 2.5]);
    }

    #[test]
    fn linear_grid_scales_with_mu() {
        let grid = linear_grid(vec![1.0, 0.5, 0.0], 400.0, 700.0, 4, 0.6).unwrap();
        assert_eq!(grid.n_wavelengths(), 4);
        assert_eq!(grid.column(0), &[1.0; 4]);
        assert!((grid.column(1)[2] - 0.7).abs() < 1e-12);
        assert!((grid.column(2)[3] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn law_grid_applies_continuum() {
        let grid = law_grid(LawKind::Quadratic, &[0.0, 0.0], vec![1.0], vec![500.0, 600.0], |w| w / 100.0).unwrap();
        assert_eq!(grid.column(0), &[5.0, 6.0]);
        assert!(law_grid(LawKind::Quadratic, &[0.1], vec![1.0], vec![500.0], |_| 1.0).is_err());
    }
}
