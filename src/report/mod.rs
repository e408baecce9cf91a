//! Reporting utilities: consumer-side conversions and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Category, FittedRegression};

/// A platform-1 rating converted with a fitted regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub category: Category,
    pub rating: f64,
    /// Raw curve value, possibly negative or fractional.
    pub raw: f64,
    /// What the rating display shows: rounded, never below zero.
    pub display: i64,
}

/// Convert a rating the way the rating display does.
///
/// The fitted curve is evaluated as-is; rounding and the clamp at zero happen
/// here, on the consumer side, never inside the pipeline.
pub fn convert_rating(category: Category, regression: &FittedRegression, rating: f64) -> Conversion {
    let raw = regression.evaluate(rating);
    Conversion {
        category,
        rating,
        raw,
        display: display_rating(raw),
    }
}

/// Round to the nearest integer and clamp negatives to zero.
///
/// Non-finite values (e.g. a log curve evaluated at a non-positive rating) show as zero.
pub fn display_rating(raw: f64) -> i64 {
    if !raw.is_finite() {
        return 0;
    }
    (raw.round() as i64).max(0)
}
