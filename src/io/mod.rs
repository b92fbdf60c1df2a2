//! Input/output helpers.
//!
//! - fit record JSON read/write (`fit_json`)

pub mod fit_json;

pub use fit_json::*;
