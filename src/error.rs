//! Error taxonomy for the limb-darkening pipeline.
//!
//! Every stage fails synchronously with one of these variants. Messages carry
//! the stage name and the offending shapes/ranges so a caller can tell which
//! input was bad without re-running anything.

use thiserror::Error;

use crate::domain::LawKind;

#[derive(Debug, Error)]
pub enum LdError {
    /// Fewer than two grid rows fell inside the restriction window.
    #[error("insufficient grid data: {found} wavelength sample(s) in [{wavl:.4}, {wavu:.4}] nm, need at least 2")]
    InsufficientData { found: usize, wavl: f64, wavu: f64 },

    /// The passband cannot be normalised or integrated.
    #[error("degenerate passband in {stage}: {reason}")]
    DegenerateBand { stage: &'static str, reason: String },

    /// Not enough admissible mu samples to determine a law's coefficients.
    #[error("underdetermined fit for {law}: {admissible} admissible mu value(s), need at least {required}")]
    UnderdeterminedFit {
        law: LawKind,
        admissible: usize,
        required: usize,
    },

    #[error("shape mismatch in {stage}: {detail}")]
    ShapeMismatch { stage: &'static str, detail: String },

    #[error("invalid channel window: cuton={cuton} nm, cutoff={cutoff} nm")]
    InvalidWindow { cuton: f64, cutoff: f64 },

    /// Values that are out of domain: NaN/inf samples, mu outside [0, 1],
    /// duplicated mu values.
    #[error("invalid input in {stage}: {detail}")]
    InvalidInput { stage: &'static str, detail: String },

    #[error("least-squares solve failed for {law}")]
    SolveFailed { law: LawKind },

    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("i/o error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fit JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl LdError {
    pub(crate) fn shape(stage: &'static str, detail: impl Into<String>) -> Self {
        LdError::ShapeMismatch {
            stage,
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid(stage: &'static str, detail: impl Into<String>) -> Self {
        LdError::InvalidInput {
            stage,
            detail: detail.into(),
        }
    }

    pub(crate) fn degenerate(stage: &'static str, reason: impl Into<String>) -> Self {
        LdError::DegenerateBand {
            stage,
            reason: reason.into(),
        }
    }
}
