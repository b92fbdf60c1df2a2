//! Grid restriction and high-resolution resampling.
//!
//! Model grids are tabulated far more coarsely than narrow photometric channels
//! require. We keep only the rows inside a window slightly wider than the
//! channel, then resample every mu column onto one uniform axis so the
//! passband integration sees a dense, common wavelength sampling.
//!
//! The window is padded beyond the hard cuton/cutoff so that interpolation near
//! the band edges still has neighbouring grid samples on both sides.

use log::{debug, warn};
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{ChannelWindow, FitConfig, StellarGrid};
use crate::error::LdError;
use crate::math::{Stencil, linspace};

/// Row indices with wavelength in `[wavl, wavu]`, ordered by wavelength.
pub fn restrict_rows(wavelength_nm: &[f64], wavl: f64, wavu: f64) -> Vec<usize> {
    let mut rows: Vec<usize> = wavelength_nm
        .iter()
        .enumerate()
        .filter(|(_, w)| **w >= wavl && **w <= wavu)
        .map(|(i, _)| i)
        .collect();
    rows.sort_by(|&a, &b| wavelength_nm[a].total_cmp(&wavelength_nm[b]));
    rows
}

/// Restrict `grid` to the channel's padded window and resample it onto
/// `config.resolution` evenly spaced wavelengths spanning that window.
///
/// Columns are interpolated linearly with flat extrapolation beyond the
/// restricted rows. The returned grid has the same mu values as the input.
pub fn restrict_and_resample(
    grid: &StellarGrid,
    window: &ChannelWindow,
    config: &FitConfig,
) -> Result<StellarGrid, LdError> {
    if config.resolution < 2 {
        return Err(LdError::InvalidConfig {
            field: "resolution",
            reason: format!("need at least 2 points, got {}", config.resolution),
        });
    }

    let (wavl, wavu) = window.restriction_bounds(config.window_margin);
    let rows = restrict_rows(grid.wavelength_nm(), wavl, wavu);
    if rows.len() < 2 {
        return Err(LdError::InsufficientData {
            found: rows.len(),
            wavl,
            wavu,
        });
    }

    let xp: Vec<f64> = rows.iter().map(|&r| grid.wavelength_nm()[r]).collect();
    let duplicates = xp.windows(2).filter(|w| w[0] == w[1]).count();
    if duplicates > 0 {
        warn!("grid has {duplicates} duplicated wavelength sample(s) inside [{wavl:.4}, {wavu:.4}] nm");
    }

    let nf = config.resolution;
    let axis = linspace(wavl, wavu, nf);
    let stencil = Stencil::new(&axis, &xp).ok_or_else(|| LdError::InsufficientData {
        found: 0,
        wavl,
        wavu,
    })?;

    let nmu = grid.n_mu();
    let mut intensity = DMatrix::<f64>::zeros(nf, nmu);
    intensity
        .as_mut_slice()
        .par_chunks_mut(nf)
        .enumerate()
        .for_each(|(j, out)| {
            let column = grid.column(j);
            let fp: Vec<f64> = rows.iter().map(|&r| column[r]).collect();
            stencil.apply_into(&fp, out);
        });

    debug!(
        "grid restricted to {} of {} rows in [{wavl:.4}, {wavu:.4}] nm, resampled to {nf} points x {nmu} mu",
        rows.len(),
        grid.n_wavelengths()
    );

    Ok(StellarGrid::from_parts(grid.mu_values().to_vec(), axis, intensity))
}
