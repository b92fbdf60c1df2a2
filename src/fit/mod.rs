//! Limb-darkening law fitting.
//!
//! Responsibilities:
//!
//! - select the admissible mu samples for each law
//! - build the law's design matrix on those samples
//! - solve the linear least-squares problem for the coefficients

pub mod fitter;

pub use fitter::*;
