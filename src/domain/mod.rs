//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the stellar model grid and raw/normalised passbands (inputs)
//! - the channel window and the run configuration (`FitConfig`)
//! - the limb-darkening law kinds and the fitted coefficient map (outputs)

pub mod types;

pub use types::*;
