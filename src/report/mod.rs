//! Reporting utilities: per-law fit quality and formatted terminal output.

pub mod format;

pub use format::*;
