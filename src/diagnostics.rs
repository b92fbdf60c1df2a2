//! Optional diagnostic series emitted by the pipeline.
//!
//! The pipeline never renders anything itself. When the caller supplies a
//! [`DiagnosticsSink`], it receives two payloads:
//!
//! - [`SpectrumDiagnostics`]: mean stellar spectrum (peak-normalised) on the
//!   resampled axis together with the normalised passband
//! - [`FitDiagnostics`]: integrated intensity per mu and the fitted curve of
//!   each law on its admissible mu samples
//!
//! `plot::AsciiPlotter` is one consumer; [`RecordingSink`] just keeps the data.

use serde::{Deserialize, Serialize};

use crate::domain::{IntegratedIntensity, LawKind, LdCoefficientFit, Passband, StellarGrid};
use crate::models::evaluate_at;

/// Fraction of the spectrum peak used to pick the plotting range.
const PLOT_FLUX_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumDiagnostics {
    pub wavelength_nm: Vec<f64>,
    /// Mean intensity over all mu, divided by its maximum.
    pub mean_flux: Vec<f64>,
    pub passband_wavelength_nm: Vec<f64>,
    pub passband_throughput: Vec<f64>,
    /// Largest wavelength redward of the spectrum peak where the normalised
    /// flux is still above 5% of peak. `None` if no sample qualifies.
    pub plot_limit_nm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitCurve {
    pub law: LawKind,
    pub mu: Vec<f64>,
    pub fitted: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub mu: Vec<f64>,
    pub integrated: Vec<f64>,
    pub curves: Vec<FitCurve>,
}

/// Receiver for diagnostic series.
pub trait DiagnosticsSink {
    fn on_spectrum(&mut self, spectrum: SpectrumDiagnostics);
    fn on_fit(&mut self, fit: FitDiagnostics);
}

/// Sink that stores the last payload of each kind.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub spectrum: Option<SpectrumDiagnostics>,
    pub fit: Option<FitDiagnostics>,
}

impl DiagnosticsSink for RecordingSink {
    fn on_spectrum(&mut self, spectrum: SpectrumDiagnostics) {
        self.spectrum = Some(spectrum);
    }

    fn on_fit(&mut self, fit: FitDiagnostics) {
        self.fit = Some(fit);
    }
}

/// Build the spectrum payload from a (resampled) grid and normalised passband.
pub fn spectrum_diagnostics(grid: &StellarGrid, passband: &Passband) -> SpectrumDiagnostics {
    let nmu = grid.n_mu() as f64;
    let mut mean: Vec<f64> = vec![0.0; grid.n_wavelengths()];
    for j in 0..grid.n_mu() {
        for (m, v) in mean.iter_mut().zip(grid.column(j).iter()) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= nmu;
    }

    // First occurrence of the maximum.
    let (peak_idx, peak) = mean
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });

    let mean_flux: Vec<f64> = if peak > 0.0 {
        mean.iter().map(|v| v / peak).collect()
    } else {
        mean
    };

    let wavelength_nm = grid.wavelength_nm().to_vec();
    let plot_limit_nm = plot_limit(&wavelength_nm, &mean_flux, peak_idx);

    SpectrumDiagnostics {
        wavelength_nm,
        mean_flux,
        passband_wavelength_nm: passband.wavelength_nm().to_vec(),
        passband_throughput: passband.sensitivity().to_vec(),
        plot_limit_nm,
    }
}

fn plot_limit(wavelength_nm: &[f64], flux: &[f64], peak_idx: usize) -> Option<f64> {
    let peak_flux = flux.get(peak_idx).copied()?;
    let peak_wav = wavelength_nm[peak_idx];
    wavelength_nm
        .iter()
        .zip(flux.iter())
        .filter(|(w, f)| **f > PLOT_FLUX_FRACTION * peak_flux && **w > peak_wav)
        .map(|(w, _)| *w)
        .reduce(f64::max)
}

/// Build the fit payload: integrated intensities plus each law's fitted curve
/// on the mu samples it was fitted on.
pub fn fit_diagnostics(integrated: &IntegratedIntensity, fit: &LdCoefficientFit) -> FitDiagnostics {
    let curves = LawKind::ALL
        .into_iter()
        .filter_map(|law| {
            let law_fit = fit.get(law)?;
            let fitted = law_fit
                .mu_used
                .iter()
                .map(|&mu| evaluate_at(law, mu, &law_fit.coefficients))
                .collect();
            Some(FitCurve {
                law,
                mu: law_fit.mu_used.clone(),
                fitted,
            })
        })
        .collect();

    FitDiagnostics {
        mu: integrated.mu.clone(),
        integrated: integrated.values.clone(),
        curves,
    }
}
