//! Passband integration of the resampled grid.
//!
//! For each mu we integrate `λ · mask(λ) · S(λ) · I(λ, mu)` over the resampled
//! axis, where `S` is the normalised passband interpolated onto the axis and
//! `mask` is 1 inside `[cuton, cutoff]`. The factor `λ` converts energy flux to
//! photon flux (photon-counting detectors).
//!
//! The result is divided by a normalisation integral of `λ · mask · S` and then
//! by the value at mu index 0, so that index 0 is exactly 1.
//!
//! The normalisation integral only covers the samples where `S > 0` plus one
//! neighbour on each side, while the per-mu integrals cover the whole axis.
//! Both integrands vanish outside the band, but the two ranges give Simpson's
//! rule different sample parity, so the ranges must stay as they are to keep
//! coefficients comparable with previously published tables.

use log::{debug, warn};
use rayon::prelude::*;

use crate::domain::{ChannelWindow, IntegratedIntensity, Passband, StellarGrid};
use crate::error::LdError;
use crate::math::{interp, simpson, simpson_at};

const STAGE: &str = "integrate";

/// Passband weighting on a resampled axis.
#[derive(Debug, Clone)]
pub struct PassbandWeights {
    /// Passband throughput interpolated onto the axis.
    pub sensitivity: Vec<f64>,
    /// `λ · mask · S` per axis sample.
    pub weights: Vec<f64>,
    /// Samples covered by the normalisation integral.
    pub norm_indices: Vec<usize>,
    pub normfactor: f64,
}

/// Indices with positive throughput, extended by one sample on each side
/// (clamped to the axis).
pub fn normalization_indices(sensitivity: &[f64]) -> Vec<usize> {
    let positive: Vec<usize> = sensitivity
        .iter()
        .enumerate()
        .filter(|(_, s)| **s > 0.0)
        .map(|(i, _)| i)
        .collect();
    let (Some(&first), Some(&last)) = (positive.first(), positive.last()) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(positive.len() + 2);
    if first > 0 {
        out.push(first - 1);
    }
    out.extend_from_slice(&positive);
    if last + 1 < sensitivity.len() {
        out.push(last + 1);
    }
    out
}

/// Interpolate the passband onto `axis`, apply the channel mask and compute
/// the normalisation integral.
pub fn passband_weights(axis: &[f64], passband: &Passband, window: &ChannelWindow) -> Result<PassbandWeights, LdError> {
    let sensitivity = interp(axis, passband.wavelength_nm(), passband.sensitivity());
    if sensitivity.len() != axis.len() {
        return Err(LdError::degenerate(STAGE, "passband has no samples"));
    }

    let weights: Vec<f64> = axis
        .iter()
        .zip(sensitivity.iter())
        .map(|(&w, &s)| {
            let mask = if window.contains(w) { 1.0 } else { 0.0 };
            w * mask * s
        })
        .collect();

    let norm_indices = normalization_indices(&sensitivity);
    if norm_indices.is_empty() {
        return Err(LdError::degenerate(
            STAGE,
            format!(
                "passband [{:.4}, {:.4}] nm has no positive throughput on the grid axis [{:.4}, {:.4}] nm",
                passband.wavelength_nm().first().copied().unwrap_or(f64::NAN),
                passband.wavelength_nm().last().copied().unwrap_or(f64::NAN),
                axis.first().copied().unwrap_or(f64::NAN),
                axis.last().copied().unwrap_or(f64::NAN),
            ),
        ));
    }

    let normfactor = simpson_at(&weights, axis, &norm_indices);
    if !normfactor.is_finite() || normfactor == 0.0 {
        return Err(LdError::degenerate(
            STAGE,
            format!(
                "normalisation integral is {normfactor}: passband does not overlap the channel [{}, {}] nm",
                window.cuton_nm(),
                window.cutoff_nm()
            ),
        ));
    }

    if let (Some(&p0), Some(&p1), Some(&a0), Some(&a1)) = (
        passband.wavelength_nm().first(),
        passband.wavelength_nm().last(),
        axis.first(),
        axis.last(),
    ) {
        if p0 < a0 || p1 > a1 {
            warn!(
                "passband [{p0:.4}, {p1:.4}] nm extends beyond the resampled grid [{a0:.4}, {a1:.4}] nm; throughput outside is ignored"
            );
        }
    }

    Ok(PassbandWeights {
        sensitivity,
        weights,
        norm_indices,
        normfactor,
    })
}

/// Passband-integrated intensity per mu, normalised to 1 at mu index 0.
///
/// `grid` is expected to be the output of `grid::restrict_and_resample`
/// (any grid with an ascending wavelength axis works).
pub fn integrate_passband(
    grid: &StellarGrid,
    passband: &Passband,
    window: &ChannelWindow,
) -> Result<IntegratedIntensity, LdError> {
    let axis = grid.wavelength_nm();
    let pw = passband_weights(axis, passband, window)?;

    let mut values: Vec<f64> = (0..grid.n_mu())
        .into_par_iter()
        .map(|j| {
            let integrand: Vec<f64> = pw
                .weights
                .iter()
                .zip(grid.column(j).iter())
                .map(|(&w, &i)| w * i)
                .collect();
            simpson(&integrand, axis) / pw.normfactor
        })
        .collect();

    let reference = values[0];
    if !reference.is_finite() || reference == 0.0 {
        return Err(LdError::degenerate(
            STAGE,
            format!(
                "integrated intensity at reference mu {} is {reference}",
                grid.mu_values()[0]
            ),
        ));
    }
    for v in &mut values {
        *v /= reference;
    }

    debug!(
        "integrated {} mu columns over {} samples (normalisation over {} samples, factor {:.6e})",
        values.len(),
        axis.len(),
        pw.norm_indices.len(),
        pw.normfactor
    );

    Ok(IntegratedIntensity {
        mu: grid.mu_values().to_vec(),
        values,
    })
}
