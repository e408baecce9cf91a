//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - written to the regressions document
//! - reloaded later by the `convert` command

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};

/// Functional family of a candidate curve.
///
/// Declaration order is the tie-break order used during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    Linear,
    Quadratic,
    Log,
}

impl FamilyKind {
    /// Every family, in evaluation (and tie-break) order.
    pub const ALL: [FamilyKind; 3] = [FamilyKind::Linear, FamilyKind::Quadratic, FamilyKind::Log];

    /// Tag used in the regressions document.
    pub fn as_str(self) -> &'static str {
        match self {
            FamilyKind::Linear => "linear",
            FamilyKind::Quadratic => "quadratic",
            FamilyKind::Log => "log",
        }
    }

    /// Number of free parameters (the `k` in AIC).
    pub fn param_count(self) -> usize {
        match self {
            FamilyKind::Linear => 2,
            FamilyKind::Quadratic => 3,
            FamilyKind::Log => 2,
        }
    }

    /// Polynomial degree in the transformed input.
    pub fn degree(self) -> usize {
        self.param_count() - 1
    }
}

impl std::fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rating-pair relationship being modeled.
///
/// Declaration order is the order categories appear in the output document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Blitz,
    Bullet,
    Rapid,
    Classical,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Blitz,
        Category::Bullet,
        Category::Rapid,
        Category::Classical,
    ];

    /// Key used in the regressions document.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Blitz => "BLITZ",
            Category::Bullet => "BULLET",
            Category::Rapid => "RAPID",
            Category::Classical => "CLASSICAL",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two aligned numeric sequences ready for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Sample {
    /// Build a sample; `x` and `y` must have equal length and hold only finite values.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(RegressionError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.is_empty() {
            return Err(RegressionError::InsufficientData { needed: 1, actual: 0 });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(RegressionError::NonFinite);
        }
        Ok(Self { x, y })
    }

    /// Build a sample from `(x, y)` pairs, dropping pairs with a missing side.
    pub fn from_optional_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
    {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs
            .into_iter()
            .filter_map(|(x, y)| Some((x?, y?)))
            .unzip();
        Self::new(x, y)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// One fitted candidate, scored but not yet selected.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateModel {
    pub kind: FamilyKind,
    /// Coefficients in document order (see [`FittedRegression`]).
    pub params: Vec<f64>,
    pub mse: f64,
    pub aic: f64,
}

/// The persisted result of model selection for one category.
///
/// Parameter order per type:
/// - `linear`: `[a, b]` for `a*x + b`
/// - `quadratic`: `[a, b, c]` for `a*x^2 + b*x + c`
/// - `log`: `[a, b]` for `a*ln(x) + b`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRegression {
    #[serde(rename = "type")]
    pub kind: FamilyKind,
    pub params: Vec<f64>,
}

impl FittedRegression {
    /// Evaluate the curve at `x`. The result is not clamped.
    pub fn evaluate(&self, x: f64) -> f64 {
        crate::models::predict(self.kind, x, &self.params)
    }

    /// Check the parameter count matches the type.
    pub fn validate(&self) -> Result<()> {
        let expected = self.kind.param_count();
        if self.params.len() != expected {
            return Err(RegressionError::InvalidDocument(format!(
                "{} regression needs {expected} params, found {}",
                self.kind,
                self.params.len()
            )));
        }
        if self.params.iter().any(|p| !p.is_finite()) {
            return Err(RegressionError::InvalidDocument(format!(
                "{} regression has non-finite params",
                self.kind
            )));
        }
        Ok(())
    }
}

impl From<CandidateModel> for FittedRegression {
    fn from(candidate: CandidateModel) -> Self {
        Self {
            kind: candidate.kind,
            params: candidate.params,
        }
    }
}

/// The full output document: one regression per category, in category order.
pub type RegressionDocument = BTreeMap<Category, FittedRegression>;

/// A resolved `rb fit` configuration as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Platform-1 vs platform-2 rating pairs.
    pub cross_table: PathBuf,
    /// Platform-2 internal rating pairs (holds the bridge column).
    pub internal_table: PathBuf,
    pub output: PathBuf,
    /// Print the run summary to stdout.
    pub summary: bool,
}
