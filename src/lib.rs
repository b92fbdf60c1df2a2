//! `limb-darkening` library crate.
//!
//! Computes limb-darkening coefficients for a photometric channel from a
//! tabulated stellar intensity grid `I(λ, mu)`:
//!
//! - normalise and zero-pad the passband (`passband`)
//! - restrict the grid around the channel and resample it (`grid`)
//! - integrate photon-weighted intensity through the passband per mu (`integrate`)
//! - least-squares fit the linear, quadratic, three- and four-parameter laws (`fit`)
//!
//! `pipeline` chains the stages. Everything else is support: diagnostics and
//! their terminal rendering, JSON export, text summaries and synthetic grids.

pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod fit;
pub mod grid;
pub mod integrate;
pub mod io;
pub mod math;
pub mod models;
pub mod passband;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod synthetic;

pub use domain::{ChannelWindow, FitConfig, LawKind, LdCoefficientFit, RawPassband, StellarGrid};
pub use error::LdError;
pub use pipeline::{fit_limb_darkening, fit_limb_darkening_with_diagnostics, run_stages};
