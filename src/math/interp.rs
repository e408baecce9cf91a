//! Piecewise-linear lookup through a bridge column.
//!
//! A bridge table maps one rating scale onto another using rows where both were
//! observed. Queries between two breakpoints are linearly weighted; queries
//! outside the tabulated range clamp to the nearest endpoint (no extrapolation).
//!
//! Invariants:
//! - breakpoints are strictly increasing after construction
//! - duplicate bridge values collapse into one breakpoint carrying the mean target
//! - a query equal to a breakpoint returns that breakpoint's target exactly

use std::cmp::Ordering;

use crate::error::{RegressionError, Result};

/// Which side of the bridge range a query fell off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampSide {
    Below,
    Above,
}

/// Count of queries that were clamped instead of interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeClamps {
    pub below: usize,
    pub above: usize,
}

impl RangeClamps {
    pub fn total(&self) -> usize {
        self.below + self.above
    }

    fn record(&mut self, side: Option<ClampSide>) {
        match side {
            Some(ClampSide::Below) => self.below += 1,
            Some(ClampSide::Above) => self.above += 1,
            None => {}
        }
    }
}

/// Sorted breakpoints for interpolating `target` as a function of `bridge`.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeTable {
    bridge: Vec<f64>,
    target: Vec<f64>,
}

impl BridgeTable {
    /// Build a bridge table from aligned, complete columns.
    ///
    /// Rows need not be sorted. Non-finite rows are rejected.
    pub fn new(bridge: &[f64], target: &[f64]) -> Result<Self> {
        if bridge.len() != target.len() {
            return Err(RegressionError::LengthMismatch {
                x_len: bridge.len(),
                y_len: target.len(),
            });
        }
        if bridge.is_empty() {
            return Err(RegressionError::InsufficientData { needed: 1, actual: 0 });
        }
        if bridge.iter().chain(target).any(|v| !v.is_finite()) {
            return Err(RegressionError::NonFinite);
        }

        let mut rows: Vec<(f64, f64)> = bridge.iter().copied().zip(target.iter().copied()).collect();
        rows.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut knots_x = Vec::with_capacity(rows.len());
        let mut knots_y = Vec::with_capacity(rows.len());
        let mut i = 0;
        while i < rows.len() {
            let x = rows[i].0;
            let mut sum = 0.0;
            let mut count = 0usize;
            while i < rows.len() && rows[i].0 == x {
                sum += rows[i].1;
                count += 1;
                i += 1;
            }
            knots_x.push(x);
            knots_y.push(sum / count as f64);
        }

        Ok(Self {
            bridge: knots_x,
            target: knots_y,
        })
    }

    /// Number of distinct breakpoints.
    pub fn len(&self) -> usize {
        self.bridge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridge.is_empty()
    }

    /// Tabulated bridge range `(min, max)`.
    pub fn range(&self) -> (f64, f64) {
        (self.bridge[0], self.bridge[self.bridge.len() - 1])
    }

    /// Interpolate a single query, reporting whether it was clamped.
    pub fn interpolate(&self, query: f64) -> (f64, Option<ClampSide>) {
        let last = self.bridge.len() - 1;
        if query < self.bridge[0] {
            return (self.target[0], Some(ClampSide::Below));
        }
        if query > self.bridge[last] {
            return (self.target[last], Some(ClampSide::Above));
        }

        // First breakpoint strictly greater than the query.
        let hi = self.bridge.partition_point(|&b| b <= query);
        if hi == 0 {
            return (self.target[0], None);
        }
        let lo = hi - 1;
        if self.bridge[lo] == query || hi > last {
            return (self.target[lo], None);
        }

        let (x0, x1) = (self.bridge[lo], self.bridge[hi]);
        let (y0, y1) = (self.target[lo], self.target[hi]);
        let alpha = (query - x0) / (x1 - x0);
        (y0 + alpha * (y1 - y0), None)
    }

    /// Interpolate every query, counting clamped ones.
    pub fn interpolate_all(&self, queries: &[f64]) -> (Vec<f64>, RangeClamps) {
        let mut clamps = RangeClamps::default();
        let values = queries
            .iter()
            .map(|&q| {
                let (value, side) = self.interpolate(q);
                clamps.record(side);
                value
            })
            .collect();
        (values, clamps)
    }
}
