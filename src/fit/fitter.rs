//! Low-level fitting routine for a single family.
//!
//! Given a sample `(x_i, y_i)` and a family kind we:
//! - transform `x` into the family's regression input (`x` or `ln x`)
//! - solve an OLS polynomial of the family's degree
//! - reorder coefficients into document order (highest degree first)
//! - compute the mean squared residual and the AIC score

use tracing::debug;

use crate::domain::{CandidateModel, FamilyKind, Sample};
use crate::error::{RegressionError, Result};
use crate::fit::selection::calculate_aic;
use crate::math::fit_polynomial;
use crate::models::{predict, transform_input};

/// Residuals below this fraction of the sample's magnitude count as an exact fit.
///
/// Floating-point round-off leaves a tiny non-zero MSE even when a family
/// describes the data exactly; snapping it to zero lets such fits score `-inf`.
const EXACT_FIT_REL_TOL: f64 = 1e-9;

/// Minimum sample size for any family.
pub const MIN_FIT_ROWS: usize = 2;

/// Fit one family to the sample and score it.
pub fn fit_family(kind: FamilyKind, sample: &Sample) -> Result<CandidateModel> {
    let n = sample.len();
    if n < MIN_FIT_ROWS {
        return Err(RegressionError::InsufficientData {
            needed: MIN_FIT_ROWS,
            actual: n,
        });
    }

    let t = sample
        .x()
        .iter()
        .map(|&x| transform_input(kind, x))
        .collect::<Result<Vec<f64>>>()?;

    let ascending = fit_polynomial(&t, sample.y(), kind.degree())
        .ok_or(RegressionError::Solve { family: kind })?;
    let params: Vec<f64> = ascending.into_iter().rev().collect();

    let mse = snap_exact_fit(mean_squared_error(kind, sample, &params), sample.y());
    let aic = calculate_aic(n, mse, kind.param_count());

    debug!(family = %kind, n, mse, aic, ?params, "fitted candidate");

    Ok(CandidateModel {
        kind,
        params,
        mse,
        aic,
    })
}

/// Mean squared residual of the curve against the sample.
pub fn mean_squared_error(kind: FamilyKind, sample: &Sample, params: &[f64]) -> f64 {
    let sse: f64 = sample
        .x()
        .iter()
        .zip(sample.y())
        .map(|(&x, &y)| {
            let r = y - predict(kind, x, params);
            r * r
        })
        .sum();
    sse / sample.len() as f64
}

fn snap_exact_fit(mse: f64, y: &[f64]) -> f64 {
    let magnitude = y.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1.0);
    let floor = (EXACT_FIT_REL_TOL * magnitude).powi(2);
    if mse <= floor { 0.0 } else { mse }
}
