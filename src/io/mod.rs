//! Input/output helpers.
//!
//! - CSV ingest of the rating tables (`ingest`)
//! - regressions document read/write (`document`)

pub mod document;
pub mod ingest;

pub use document::*;
pub use ingest::*;
