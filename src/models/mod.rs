//! Limb-darkening law implementations.
//!
//! Laws are implemented as small, pure functions over one shared basis-term
//! definition so that the fitter and any diagnostic evaluation stay in sync.

pub mod law;

pub use law::*;
