//! Terminal rendering of pipeline diagnostics.

pub mod ascii;

pub use ascii::*;
