//! Numerical building blocks: resampling, quadrature and least squares.

pub mod interp;
pub mod ols;
pub mod simpson;

pub use interp::*;
pub use ols::*;
pub use simpson::*;
