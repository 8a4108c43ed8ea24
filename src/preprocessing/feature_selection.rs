//! Univariate feature selection
//!
//! Scores each transformed column independently against the target with the
//! F-statistic of a single-regressor linear model and keeps the best K.

use crate::error::{PricingError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// F-statistic of each column of `x` against `y`.
///
/// `F = r² / (1 - r²) * (n - 2)` where `r` is the Pearson correlation.
/// Zero-variance columns score 0; a perfect correlation scores infinity.
pub fn f_regression(x: &Array2<f64>, y: &Array1<f64>) -> Result<Vec<f64>> {
    if x.nrows() != y.len() {
        return Err(PricingError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }

    let n = x.nrows();
    Ok(x.columns()
        .into_iter()
        .map(|col| {
            if n <= 2 {
                return 0.0;
            }
            let r = pearson_correlation(col, y.view());
            let r2 = r * r;
            if r2 >= 1.0 {
                f64::INFINITY
            } else {
                r2 / (1.0 - r2) * (n - 2) as f64
            }
        })
        .collect())
}

// Pearson correlation (accepts views, no allocation)
fn pearson_correlation(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len() as f64;
    if n < 2.0 {
        return 0.0;
    }

    let x_mean = x.mean().unwrap_or(0.0);
    let y_mean = y.mean().unwrap_or(0.0);

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denom = (sum_x2 * sum_y2).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        sum_xy / denom
    }
}

/// Fitted top-K selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSelector {
    k: usize,
    n_features_in: usize,
    scores: Vec<f64>,
    /// Column indices ordered best first; equal scores keep index order
    ranking: Vec<usize>,
    /// Top-K columns in ascending column order
    selected: Vec<usize>,
}

impl FeatureSelector {
    /// Score every column and keep the `k` best
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, k: usize) -> Result<Self> {
        let n_features = x.ncols();
        if k == 0 || k > n_features {
            return Err(PricingError::ConfigError(format!(
                "k = {} is outside the valid range [1, {}]",
                k, n_features
            )));
        }

        let scores = f_regression(x, y)?;

        let mut ranking: Vec<usize> = (0..n_features).collect();
        // stable sort: ties stay in column order
        ranking.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut selected: Vec<usize> = ranking.iter().take(k).copied().collect();
        selected.sort_unstable();

        Ok(Self {
            k,
            n_features_in: n_features,
            scores,
            ranking,
            selected,
        })
    }

    /// Keep the selected columns of `x`
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features_in {
            return Err(PricingError::ShapeError {
                expected: format!("{} columns", self.n_features_in),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut result = Array2::zeros((x.nrows(), self.selected.len()));
        for (new_idx, &old_idx) in self.selected.iter().enumerate() {
            result.column_mut(new_idx).assign(&x.column(old_idx));
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(x: &Array2<f64>, y: &Array1<f64>, k: usize) -> Result<(Self, Array2<f64>)> {
        let selector = Self::fit(x, y, k)?;
        let selected = selector.transform(x)?;
        Ok((selector, selected))
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn ranking(&self) -> &[usize] {
        &self.ranking
    }

    pub fn selected_indices(&self) -> &[usize] {
        &self.selected
    }
}
