//! Mathematical utilities: least squares and bridge interpolation.

pub mod interp;
pub mod ols;

pub use interp::*;
pub use ols::*;
