//! Ordinary least squares linear regression

use crate::error::{PricingError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Relative pivot size below which a column counts as linearly dependent
const RANK_TOLERANCE: f64 = 1e-10;

/// Solve the symmetric positive semi-definite system `A x = b` by Cholesky
/// decomposition.
///
/// A pivot whose residual falls below `RANK_TOLERANCE` of its original
/// diagonal marks a column that is a linear combination of earlier ones; it
/// is dropped from the factorization and its solution entry is fixed to 0.
/// This gives a deterministic basic solution for rank-deficient designs
/// (e.g. one-hot groups that sum to one).
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // Cholesky decomposition: A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    let mut active = vec![true; n];

    for i in 0..n {
        for j in 0..=i {
            if !active[j] {
                continue;
            }
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= RANK_TOLERANCE * a[[i, i]].abs() || diag <= 0.0 {
                    active[i] = false;
                    for k in 0..i {
                        l[[i, k]] = 0.0;
                    }
                } else {
                    l[[i, i]] = diag.sqrt();
                }
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in (0..n).filter(|&i| active[i]) {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev().filter(|&i| active[i]) {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Solve least squares via normal equations: (X^T X) w = X^T y
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    cholesky_solve(&xtx, &xty)
}

/// Fitted linear regression model (OLS with intercept, no regularization)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    coefficients: Array1<f64>,
    /// Fitted intercept (bias)
    intercept: f64,
}

impl LinearRegression {
    /// Fit the model to training data
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(PricingError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PricingError::DataError(
                "cannot fit a linear model on zero samples".to_string(),
            ));
        }

        // Center data so the intercept drops out of the normal equations
        let x_mean = x.mean_axis(Axis(0)).ok_or_else(|| {
            PricingError::ComputationError("failed to compute feature means".to_string())
        })?;
        let y_mean = y.mean().unwrap_or(0.0);

        let x_centered = x - &x_mean.view().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let coefficients = solve_least_squares(&x_centered, &y_centered).ok_or_else(|| {
            PricingError::ComputationError(
                "normal equations could not be solved".to_string(),
            )
        })?;

        let intercept = y_mean - coefficients.dot(&x_mean);

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            return Err(PricingError::ShapeError {
                expected: format!("{} columns", self.coefficients.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        Ok(x.dot(&self.coefficients) + self.intercept)
    }

    /// Get R² score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;

        let y_mean = y.mean().unwrap_or(0.0);
        let ss_res = (&y_pred - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - y_mean) * (v - y_mean)).sum();

        if ss_tot == 0.0 {
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }

        Ok(1.0 - ss_res / ss_tot)
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}
