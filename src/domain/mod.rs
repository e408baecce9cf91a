//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the closed set of curve families (`FamilyKind`) and categories (`Category`)
//! - fitting inputs and intermediates (`Sample`, `CandidateModel`)
//! - persisted outputs (`FittedRegression`, `RegressionDocument`)

pub mod types;

pub use types::*;
