//! Model selection (linear vs quadratic vs log) using AIC.
//!
//! The tool fits each family and computes:
//! - MSE of the fitted curve against `y`
//! - AIC = n * ln(MSE) + 2k, with AIC = -inf for an exact fit
//!
//! Selection rules:
//! 1. Every family is attempted; any failure (e.g. log on x <= 0) aborts the fit
//! 2. Choose the family with minimum AIC
//! 3. Ties keep the earlier family in the order linear -> quadratic -> log

use crate::domain::{CandidateModel, FamilyKind, FittedRegression, Sample};
use crate::error::{RegressionError, Result};
use crate::fit::fitter::fit_family;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: CandidateModel,
    /// Every candidate, in evaluation order.
    pub candidates: Vec<CandidateModel>,
}

impl FitSelection {
    pub fn regression(&self) -> FittedRegression {
        self.best.clone().into()
    }
}

/// Akaike Information Criterion for a least-squares fit.
pub fn calculate_aic(n: usize, mse: f64, k: usize) -> f64 {
    if mse == 0.0 {
        return f64::NEG_INFINITY;
    }
    n as f64 * mse.ln() + 2.0 * k as f64
}

/// Fit every family and select the best by AIC.
pub fn fit_and_select(sample: &Sample) -> Result<FitSelection> {
    let candidates = FamilyKind::ALL
        .iter()
        .map(|&kind| fit_family(kind, sample))
        .collect::<Result<Vec<_>>>()?;

    let best = select_by_aic(&candidates)
        .cloned()
        .ok_or(RegressionError::InsufficientData {
            needed: 2,
            actual: sample.len(),
        })?;

    Ok(FitSelection { best, candidates })
}

/// Fit every family and return the winner in its portable form.
pub fn fit_best(sample: &Sample) -> Result<FittedRegression> {
    Ok(fit_and_select(sample)?.regression())
}

/// First candidate with the minimum AIC.
pub fn select_by_aic(candidates: &[CandidateModel]) -> Option<&CandidateModel> {
    let mut iter = candidates.iter();
    let mut best = iter.next()?;
    for c in iter {
        if c.aic < best.aic {
            best = c;
        }
    }
    Some(best)
}
