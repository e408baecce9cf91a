//! Ordinary least squares for low-degree polynomials.
//!
//! Every family we fit is a polynomial in some transformed input `t`:
//!
//! ```text
//! minimize Σ (y_i - Σ_j β_j t_i^j)^2
//! ```
//!
//! Implementation choices:
//! - Ratings sit in the low thousands, so a raw `{1, t, t²}` basis is badly
//!   conditioned. We center and scale `t` first, solve in the standardized
//!   basis, then expand the coefficients back to powers of the raw `t`.
//! - We solve with SVD, which handles tall design matrices and rank-deficient
//!   systems (e.g. a quadratic through two points) by returning the
//!   minimum-norm solution.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Affine map `z = (t - center) / scale` used to condition the design matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardization {
    pub center: f64,
    pub scale: f64,
}

impl Standardization {
    /// Mean and population standard deviation of `t`.
    ///
    /// A constant (or empty) input gets unit scale so the map stays invertible.
    pub fn fit(t: &[f64]) -> Self {
        if t.is_empty() {
            return Self { center: 0.0, scale: 1.0 };
        }
        let n = t.len() as f64;
        let center = t.iter().sum::<f64>() / n;
        let var = t.iter().map(|v| (v - center).powi(2)).sum::<f64>() / n;
        let scale = var.sqrt();
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self { center, scale }
    }

    pub fn apply(&self, t: f64) -> f64 {
        (t - self.center) / self.scale
    }

    /// Rewrite `Σ c_j z^j` as `Σ b_i t^i` (both ascending powers).
    pub fn unscale_polynomial(&self, coeffs_z: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; coeffs_z.len()];
        for (j, &c) in coeffs_z.iter().enumerate() {
            // ((t - m) / s)^j = s^-j Σ_i C(j, i) t^i (-m)^(j - i)
            let factor = c / self.scale.powi(j as i32);
            for (i, slot) in out.iter_mut().enumerate().take(j + 1) {
                *slot += factor * binomial(j, i) * (-self.center).powi((j - i) as i32);
            }
        }
        out
    }
}

/// Build the `n x (degree + 1)` design matrix with columns `1, z, z², ...`.
pub fn polynomial_design(z: &[f64], degree: usize) -> DMatrix<f64> {
    DMatrix::from_fn(z.len(), degree + 1, |row, col| z[row].powi(col as i32))
}

/// Least-squares polynomial of the given degree through `(t, y)`.
///
/// Returns ascending-power coefficients in the raw `t` domain.
pub fn fit_polynomial(t: &[f64], y: &[f64], degree: usize) -> Option<Vec<f64>> {
    if t.len() != y.len() || t.is_empty() {
        return None;
    }

    let standardization = Standardization::fit(t);
    let z: Vec<f64> = t.iter().map(|&v| standardization.apply(v)).collect();

    let design = polynomial_design(&z, degree);
    let rhs = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &rhs)?;

    let coeffs = standardization.unscale_polynomial(beta.as_slice());
    coeffs.iter().all(|v| v.is_finite()).then_some(coeffs)
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn unscale_round_trips_through_standardized_basis() {
        let s = Standardization { center: 1500.0, scale: 300.0 };
        // y = 2 + 0.5 z + 4 z^2 evaluated in raw t must match the expansion.
        let coeffs = s.unscale_polynomial(&[2.0, 0.5, 4.0]);
        for &t in &[900.0, 1500.0, 2300.0] {
            let z = s.apply(t);
            let expected = 2.0 + 0.5 * z + 4.0 * z * z;
            let got = coeffs[0] + coeffs[1] * t + coeffs[2] * t * t;
            assert_relative_eq!(got, expected, max_relative = 1e-9);
        }
    }

    #[test]
    fn quadratic_recovered_at_rating_scale() {
        let t: Vec<f64> = (0..6).map(|i| 1000.0 + 200.0 * i as f64).collect();
        let y: Vec<f64> = t.iter().map(|&v| 0.001 * v * v + v + 100.0).collect();

        let coeffs = fit_polynomial(&t, &y, 2).unwrap();
        assert_relative_eq!(coeffs[2], 0.001, max_relative = 1e-8);
        assert_relative_eq!(coeffs[1], 1.0, max_relative = 1e-7);
        assert_relative_eq!(coeffs[0], 100.0, epsilon = 1e-4);
    }

    #[test]
    fn constant_input_does_not_blow_up() {
        let coeffs = fit_polynomial(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0], 1).unwrap();
        // Slope is unidentifiable; the minimum-norm solution puts everything in the mean.
        assert_relative_eq!(coeffs[0] + coeffs[1] * 5.0, 2.0, epsilon = 1e-9);
    }
}
