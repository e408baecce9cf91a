//! Model evaluation for the linear / quadratic / log families.
//!
//! The fitter relies on two primitive operations:
//! - transform a raw rating into the family's regression input
//! - predict y(x) given document-ordered params (for residuals and consumers)
//!
//! These are implemented here for each family kind.

use crate::domain::FamilyKind;
use crate::error::{RegressionError, Result};

/// Map a raw `x` into the input the family is polynomial in.
///
/// Linear and quadratic families regress on `x` itself, the log family on `ln(x)`.
pub fn transform_input(model: FamilyKind, x: f64) -> Result<f64> {
    match model {
        FamilyKind::Linear | FamilyKind::Quadratic => Ok(x),
        FamilyKind::Log => {
            if x > 0.0 {
                Ok(x.ln())
            } else {
                Err(RegressionError::Domain { value: x })
            }
        }
    }
}

/// Predict `y(x)` for the given family.
///
/// `params` are in document order (highest-degree coefficient first).
///
/// # Panics
/// Panics if `params` is shorter than `model.param_count()`.
pub fn predict(model: FamilyKind, x: f64, params: &[f64]) -> f64 {
    match model {
        FamilyKind::Linear => params[0] * x + params[1],
        FamilyKind::Quadratic => params[0] * x * x + params[1] * x + params[2],
        FamilyKind::Log => params[0] * x.ln() + params[1],
    }
}
