//! Shared domain types.
//!
//! Inputs (`StellarGrid`, `RawPassband`, `ChannelWindow`) validate themselves on
//! construction so the numerical stages can assume consistent shapes. Outputs
//! (`IntegratedIntensity`, `LdCoefficientFit`) are serializable so they can be:
//!
//! - used in-memory by the caller
//! - exported to JSON
//! - reloaded later for plotting or comparisons

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::LdError;

/// Limb-darkening law kinds.
///
/// The set is closed: every match over it is exhaustive, and the basis terms
/// for each kind live in `models::law`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LawKind {
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "quadratic")]
    Quadratic,
    #[serde(rename = "threeparam_nonlin")]
    ThreeParamNonlin,
    #[serde(rename = "fourparam_nonlin")]
    FourParamNonlin,
}

impl LawKind {
    /// All laws, in the order the fitter processes them.
    pub const ALL: [LawKind; 4] = [
        LawKind::FourParamNonlin,
        LawKind::ThreeParamNonlin,
        LawKind::Quadratic,
        LawKind::Linear,
    ];

    /// Stable identifier (also the JSON key).
    pub fn name(self) -> &'static str {
        match self {
            LawKind::Linear => "linear",
            LawKind::Quadratic => "quadratic",
            LawKind::ThreeParamNonlin => "threeparam_nonlin",
            LawKind::FourParamNonlin => "fourparam_nonlin",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            LawKind::Linear => "Linear",
            LawKind::Quadratic => "Quadratic",
            LawKind::ThreeParamNonlin => "Nonlinear (3-param)",
            LawKind::FourParamNonlin => "Nonlinear (4-param)",
        }
    }

    /// Number of free coefficients.
    pub fn param_count(self) -> usize {
        match self {
            LawKind::Linear => 1,
            LawKind::Quadratic => 2,
            LawKind::ThreeParamNonlin => 3,
            LawKind::FourParamNonlin => 4,
        }
    }

    pub fn from_name(name: &str) -> Option<LawKind> {
        LawKind::ALL.into_iter().find(|law| law.name() == name)
    }
}

impl fmt::Display for LawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tabulated model-atmosphere intensities.
///
/// `intensity` has one row per wavelength and one column per mu value. The
/// matrix is column-major, so each mu column is a contiguous slice.
///
/// The intensity at mu index 0 is the normalisation reference for the
/// integrated intensities; grids conventionally list mu = 1 (disk centre)
/// first.
#[derive(Debug, Clone)]
pub struct StellarGrid {
    mu_values: Vec<f64>,
    wavelength_nm: Vec<f64>,
    intensity: DMatrix<f64>,
}

impl StellarGrid {
    /// Build a grid from an intensity matrix of shape (wavelengths, mu).
    pub fn new(mu_values: Vec<f64>, wavelength_nm: Vec<f64>, intensity: DMatrix<f64>) -> Result<Self, LdError> {
        if mu_values.is_empty() {
            return Err(LdError::shape("grid", "no mu values"));
        }
        if intensity.nrows() != wavelength_nm.len() || intensity.ncols() != mu_values.len() {
            return Err(LdError::shape(
                "grid",
                format!(
                    "intensity is {}x{}, expected {}x{} (wavelengths x mu)",
                    intensity.nrows(),
                    intensity.ncols(),
                    wavelength_nm.len(),
                    mu_values.len()
                ),
            ));
        }
        validate_mu(&mu_values)?;
        if let Some(i) = wavelength_nm.iter().position(|w| !w.is_finite()) {
            return Err(LdError::invalid("grid", format!("wavelength at row {i} is not finite")));
        }
        if let Some(i) = intensity.iter().position(|v| !v.is_finite()) {
            let (row, col) = (i % intensity.nrows(), i / intensity.nrows());
            return Err(LdError::invalid(
                "grid",
                format!("intensity at row {row}, mu index {col} is not finite"),
            ));
        }

        Ok(Self {
            mu_values,
            wavelength_nm,
            intensity,
        })
    }

    /// Build a grid from row-major data: `rows[wavelength_index][mu_index]`.
    pub fn from_rows(mu_values: Vec<f64>, wavelength_nm: Vec<f64>, rows: &[Vec<f64>]) -> Result<Self, LdError> {
        let nmu = mu_values.len();
        if rows.len() != wavelength_nm.len() {
            return Err(LdError::shape(
                "grid",
                format!("{} intensity rows for {} wavelengths", rows.len(), wavelength_nm.len()),
            ));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != nmu) {
            return Err(LdError::shape(
                "grid",
                format!("intensity row {i} has {} columns, expected {nmu}", row.len()),
            ));
        }
        let intensity = DMatrix::from_fn(rows.len(), nmu, |r, c| rows[r][c]);
        Self::new(mu_values, wavelength_nm, intensity)
    }

    /// Construct without validation. Used by stages whose output shape is
    /// correct by construction.
    pub(crate) fn from_parts(mu_values: Vec<f64>, wavelength_nm: Vec<f64>, intensity: DMatrix<f64>) -> Self {
        debug_assert_eq!(intensity.nrows(), wavelength_nm.len());
        debug_assert_eq!(intensity.ncols(), mu_values.len());
        Self {
            mu_values,
            wavelength_nm,
            intensity,
        }
    }

    pub fn mu_values(&self) -> &[f64] {
        &self.mu_values
    }

    pub fn wavelength_nm(&self) -> &[f64] {
        &self.wavelength_nm
    }

    pub fn intensity(&self) -> &DMatrix<f64> {
        &self.intensity
    }

    /// Intensity column for one mu index (contiguous).
    pub fn column(&self, mu_index: usize) -> &[f64] {
        let n = self.intensity.nrows();
        &self.intensity.as_slice()[mu_index * n..(mu_index + 1) * n]
    }

    pub fn n_mu(&self) -> usize {
        self.mu_values.len()
    }

    pub fn n_wavelengths(&self) -> usize {
        self.wavelength_nm.len()
    }
}

fn validate_mu(mu_values: &[f64]) -> Result<(), LdError> {
    for (i, &mu) in mu_values.iter().enumerate() {
        if !mu.is_finite() || !(0.0..=1.0).contains(&mu) {
            return Err(LdError::invalid("grid", format!("mu[{i}] = {mu} is outside [0, 1]")));
        }
    }
    let mut sorted = mu_values.to_vec();
    sorted.sort_by(f64::total_cmp);
    if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(LdError::invalid("grid", format!("mu value {} appears more than once", w[0])));
    }
    Ok(())
}

/// Passband as supplied by the caller: any order, any scale.
///
/// `sensitivity = None` means "no transmission curve": a boxcar of unit
/// throughput over the supplied wavelengths is substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPassband {
    pub wavelength_nm: Vec<f64>,
    pub sensitivity: Option<Vec<f64>>,
}

impl RawPassband {
    pub fn new(wavelength_nm: Vec<f64>, sensitivity: Vec<f64>) -> Self {
        Self {
            wavelength_nm,
            sensitivity: Some(sensitivity),
        }
    }

    pub fn boxcar(wavelength_nm: Vec<f64>) -> Self {
        Self {
            wavelength_nm,
            sensitivity: None,
        }
    }
}

/// Sorted, zero-padded, peak-normalised passband.
///
/// Only `passband::normalize_passband` constructs this, so the invariants hold
/// for every value in circulation:
///
/// - wavelengths ascending
/// - first and last sensitivity are exactly 0.0
/// - peak sensitivity is exactly 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passband {
    wavelength_nm: Vec<f64>,
    sensitivity: Vec<f64>,
}

impl Passband {
    pub(crate) fn from_parts(wavelength_nm: Vec<f64>, sensitivity: Vec<f64>) -> Self {
        debug_assert_eq!(wavelength_nm.len(), sensitivity.len());
        Self {
            wavelength_nm,
            sensitivity,
        }
    }

    pub fn wavelength_nm(&self) -> &[f64] {
        &self.wavelength_nm
    }

    pub fn sensitivity(&self) -> &[f64] {
        &self.sensitivity
    }

    pub fn len(&self) -> usize {
        self.wavelength_nm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength_nm.is_empty()
    }
}

/// Hard band edges of the photometric channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelWindow {
    cuton_nm: f64,
    cutoff_nm: f64,
}

impl ChannelWindow {
    pub fn new(cuton_nm: f64, cutoff_nm: f64) -> Result<Self, LdError> {
        if !(cuton_nm.is_finite() && cutoff_nm.is_finite()) || cuton_nm >= cutoff_nm {
            return Err(LdError::InvalidWindow {
                cuton: cuton_nm,
                cutoff: cutoff_nm,
            });
        }
        Ok(Self { cuton_nm, cutoff_nm })
    }

    pub fn cuton_nm(&self) -> f64 {
        self.cuton_nm
    }

    pub fn cutoff_nm(&self) -> f64 {
        self.cutoff_nm
    }

    pub fn width_nm(&self) -> f64 {
        self.cutoff_nm - self.cuton_nm
    }

    /// Grid restriction window `(wavl, wavu)`: the channel widened by
    /// `margin * width` on each side.
    pub fn restriction_bounds(&self, margin: f64) -> (f64, f64) {
        let dwav = self.width_nm();
        (self.cuton_nm - margin * dwav, self.cutoff_nm + margin * dwav)
    }

    /// Inclusive test against the hard band edges.
    pub fn contains(&self, wavelength_nm: f64) -> bool {
        wavelength_nm >= self.cuton_nm && wavelength_nm <= self.cutoff_nm
    }
}

/// Run configuration for one pipeline invocation.
///
/// The defaults reproduce the reference behaviour; lowering `resolution`
/// trades accuracy on narrow channels for speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Number of points on the common resampled wavelength axis.
    pub resolution: usize,
    /// Fraction of the channel width added on each side of the channel when
    /// restricting the grid.
    pub window_margin: f64,
    /// Offset (nm) of the zero-throughput points added outside the passband.
    pub passband_pad_nm: f64,
    /// Smallest admissible mu for the linear, quadratic and three-parameter
    /// laws. Near-limb points are excluded for these laws (Sing 2010).
    pub mu_min: f64,
    /// Smallest admissible mu for the four-parameter law.
    pub mu_min_fourparam: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            resolution: 1_000_000,
            window_margin: 0.1,
            passband_pad_nm: 1e-2,
            mu_min: 0.05,
            mu_min_fourparam: 0.0,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<(), LdError> {
        if self.resolution < 2 {
            return Err(LdError::InvalidConfig {
                field: "resolution",
                reason: format!("need at least 2 points, got {}", self.resolution),
            });
        }
        if !self.window_margin.is_finite() || self.window_margin < 0.0 {
            return Err(LdError::InvalidConfig {
                field: "window_margin",
                reason: format!("must be a non-negative number, got {}", self.window_margin),
            });
        }
        if !self.passband_pad_nm.is_finite() || self.passband_pad_nm <= 0.0 {
            return Err(LdError::InvalidConfig {
                field: "passband_pad_nm",
                reason: format!("must be positive, got {}", self.passband_pad_nm),
            });
        }
        for (field, value) in [("mu_min", self.mu_min), ("mu_min_fourparam", self.mu_min_fourparam)] {
            if !value.is_finite() {
                return Err(LdError::InvalidConfig {
                    field,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Admissibility threshold on mu for the given law.
    pub fn mu_threshold(&self, law: LawKind) -> f64 {
        match law {
            LawKind::FourParamNonlin => self.mu_min_fourparam,
            LawKind::Linear | LawKind::Quadratic | LawKind::ThreeParamNonlin => self.mu_min,
        }
    }
}

/// Passband-integrated, photon-weighted intensity per mu.
///
/// `values[0]` is exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedIntensity {
    pub mu: Vec<f64>,
    pub values: Vec<f64>,
}

/// Coefficients for one law and the mu values they were fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawFit {
    pub coefficients: Vec<f64>,
    pub mu_used: Vec<f64>,
}

/// Fitted coefficients for every law, keyed by law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LdCoefficientFit {
    laws: BTreeMap<LawKind, LawFit>,
}

impl LdCoefficientFit {
    pub(crate) fn from_map(laws: BTreeMap<LawKind, LawFit>) -> Self {
        Self { laws }
    }

    pub fn get(&self, law: LawKind) -> Option<&LawFit> {
        self.laws.get(&law)
    }

    /// Coefficients for `law` (empty if the law was not fitted).
    pub fn coefficients(&self, law: LawKind) -> &[f64] {
        self.laws.get(&law).map(|f| f.coefficients.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (LawKind, &LawFit)> {
        self.laws.iter().map(|(&law, fit)| (law, fit))
    }

    pub fn len(&self) -> usize {
        self.laws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }
}

/// Portable JSON record of one run: inputs that shaped the result plus the
/// integrated intensities and fitted coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRecord {
    pub tool: String,
    pub window: ChannelWindow,
    pub config: FitConfig,
    pub integrated: IntegratedIntensity,
    pub coefficients: LdCoefficientFit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn law_names_round_trip_and_param_counts() {
        for law in LawKind::ALL {
            assert_eq!(LawKind::from_name(law.name()), Some(law));
        }
        assert_eq!(LawKind::from_name("cubic"), None);
        let counts: Vec<usize> = LawKind::ALL.iter().map(|l| l.param_count()).collect();
        assert_eq!(counts, vec![4, 3, 2, 1]);
        assert_eq!(
            serde_json::to_string(&LawKind::ThreeParamNonlin).unwrap(),
            "\"threeparam_nonlin\""
        );
    }

    #[test]
    fn grid_rejects_inconsistent_shapes() {
        let err = StellarGrid::from_rows(vec![1.0, 0.5], vec![500.0, 510.0], &[vec![1.0, 0.9], vec![1.0]])
            .unwrap_err();
        assert!(matches!(err, LdError::ShapeMismatch { stage: "grid", .. }));

        let err = StellarGrid::new(vec![1.0], vec![500.0, 510.0], DMatrix::zeros(3, 1)).unwrap_err();
        assert!(matches!(err, LdError::ShapeMismatch { .. }));
    }

    #[test]
    fn grid_rejects_bad_mu() {
        let rows = vec![vec![1.0, 1.0]; 2];
        let err = StellarGrid::from_rows(vec![1.0, 1.0], vec![500.0, 510.0], &rows).unwrap_err();
        assert!(matches!(err, LdError::InvalidInput { .. }));
        let err = StellarGrid::from_rows(vec![1.2, 0.5], vec![500.0, 510.0], &rows).unwrap_err();
        assert!(matches!(err, LdError::InvalidInput { .. }));
    }

    #[test]
    fn grid_columns_are_contiguous_mu_slices() {
        let rows = vec![vec![1.0, 0.5], vec![2.0, 1.5], vec![3.0, 2.5]];
        let grid = StellarGrid::from_rows(vec![1.0, 0.2], vec![500.0, 510.0, 520.0], &rows).unwrap();
        assert_eq!(grid.column(0), &[1.0, 2.0, 3.0]);
        assert_eq!(grid.column(1), &[0.5, 1.5, 2.5]);
    }

    #[test]
    fn window_bounds_widen_by_margin() {
        let w = ChannelWindow::new(500.0, 600.0).unwrap();
        let (wavl, wavu) = w.restriction_bounds(0.1);
        assert!((wavl - 490.0).abs() < 1e-12);
        assert!((wavu - 610.0).abs() < 1e-12);
        assert!(w.contains(500.0) && w.contains(600.0) && !w.contains(600.0001));
        assert!(ChannelWindow::new(600.0, 500.0).is_err());
        assert!(ChannelWindow::new(f64::NAN, 500.0).is_err());
    }

    #[test]
    fn config_defaults_and_thresholds() {
        let cfg = FitConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.resolution, 1_000_000);
        assert_eq!(cfg.mu_threshold(LawKind::FourParamNonlin), 0.0);
        assert_eq!(cfg.mu_threshold(LawKind::Linear), 0.05);

        let partial: FitConfig = serde_json::from_str(r#"{"resolution": 2000}"#).unwrap();
        assert_eq!(partial.resolution, 2000);
        assert_eq!(partial.window_margin, 0.1);

        let bad = FitConfig {
            resolution: 1,
            ..FitConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(LdError::InvalidConfig { field: "resolution", .. })
        ));
    }
}
