//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit each family (linear / quadratic / log) by OLS
//! - score candidates with AIC
//! - select the best family with a deterministic tie-break

pub mod fitter;
pub mod selection;

pub use fitter::*;
pub use selection::*;
