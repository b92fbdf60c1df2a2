//! End-to-end limb-darkening coefficient pipeline.
//!
//! Keeping the workflow in one place means every caller runs the same stages
//! in the same order:
//! passband normalisation -> grid restriction/resampling -> passband
//! integration -> per-law least squares
//!
//! Callers that only want coefficients use [`fit_limb_darkening`]; callers that
//! want the intermediate values use [`run_stages`].

use log::debug;

use crate::diagnostics::{DiagnosticsSink, fit_diagnostics, spectrum_diagnostics};
use crate::domain::{
    ChannelWindow, FitConfig, FitRecord, IntegratedIntensity, LdCoefficientFit, Passband, RawPassband, StellarGrid,
};
use crate::error::LdError;
use crate::fit::fit_all_laws;
use crate::grid::restrict_and_resample;
use crate::integrate::integrate_passband;
use crate::passband::normalize_passband;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub passband: Passband,
    pub integrated: IntegratedIntensity,
    pub fit: LdCoefficientFit,
}

impl PipelineOutput {
    /// Bundle the outputs with the inputs that shaped them, ready for JSON export.
    pub fn to_record(&self, window: &ChannelWindow, config: &FitConfig) -> FitRecord {
        FitRecord {
            tool: env!("CARGO_PKG_NAME").to_string(),
            window: *window,
            config: config.clone(),
            integrated: self.integrated.clone(),
            coefficients: self.fit.clone(),
        }
    }
}

/// Run every stage and return the intermediate values.
///
/// When a sink is supplied it receives the spectrum payload after resampling
/// and the fit payload after fitting.
pub fn run_stages(
    grid: &StellarGrid,
    raw_passband: &RawPassband,
    window: &ChannelWindow,
    config: &FitConfig,
    mut sink: Option<&mut dyn DiagnosticsSink>,
) -> Result<PipelineOutput, LdError> {
    config.validate()?;

    let passband = normalize_passband(raw_passband, config.passband_pad_nm)?;
    let resampled = restrict_and_resample(grid, window, config)?;

    if let Some(s) = sink.as_deref_mut() {
        s.on_spectrum(spectrum_diagnostics(&resampled, &passband));
    }

    let integrated = integrate_passband(&resampled, &passband, window)?;
    let fit = fit_all_laws(&integrated, config)?;

    if let Some(s) = sink.as_deref_mut() {
        s.on_fit(fit_diagnostics(&integrated, &fit));
    }

    debug!(
        "fitted {} law(s) on {} mu value(s) for channel [{}, {}] nm",
        fit.len(),
        integrated.mu.len(),
        window.cuton_nm(),
        window.cutoff_nm()
    );

    Ok(PipelineOutput {
        passband,
        integrated,
        fit,
    })
}

/// Fit every limb-darkening law to `grid` as seen through the passband and
/// channel window.
pub fn fit_limb_darkening(
    grid: &StellarGrid,
    raw_passband: &RawPassband,
    window: &ChannelWindow,
    config: &FitConfig,
) -> Result<LdCoefficientFit, LdError> {
    Ok(run_stages(grid, raw_passband, window, config, None)?.fit)
}

/// Same as [`fit_limb_darkening`], additionally emitting diagnostics to `sink`.
pub fn fit_limb_darkening_with_diagnostics(
    grid: &StellarGrid,
    raw_passband: &RawPassband,
    window: &ChannelWindow,
    config: &FitConfig,
    sink: &mut dyn DiagnosticsSink,
) -> Result<LdCoefficientFit, LdError> {
    Ok(run_stages(grid, raw_passband, window, config, Some(sink))?.fit)
}
