//! `rating-bridge` library crate.
//!
//! Fits rating-conversion curves between two chess platforms. For each game
//! category the linear, quadratic and logarithmic families are fitted by
//! least squares and the one with the lowest AIC is kept. The results are
//! written as a flat JSON document keyed by category.
//!
//! The binary (`rb`) is a thin wrapper around this library so that core logic
//! is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
