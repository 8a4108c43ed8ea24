//! Min-max feature scaling

use super::numeric_values;
use crate::error::Result;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Learned value range of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    /// Scale a value into `[0, 1]` relative to the fitted range.
    ///
    /// A zero-width range maps every value to 0.
    pub fn scale(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            0.0
        } else {
            (value - self.min) / range
        }
    }
}

/// Fitted min-max scaler: `(x - min) / (max - min)` per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    ranges: Vec<ColumnRange>,
}

impl MinMaxScaler {
    /// Learn per-column min/max from `df`
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let ranges = columns
            .iter()
            .map(|name| {
                let values = numeric_values(df, name)?;
                let (min, max) = values
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                // Empty columns collapse to a zero-width range
                let (min, max) = if values.is_empty() { (0.0, 0.0) } else { (min, max) };
                Ok(ColumnRange {
                    name: name.clone(),
                    min,
                    max,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { ranges })
    }

    /// Scale the fitted columns of `df`, in fit order
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();
        let scaled: Vec<Vec<f64>> = self
            .ranges
            .iter()
            .map(|range| {
                let values = numeric_values(df, &range.name)?;
                Ok(values.into_iter().map(|v| range.scale(v)).collect())
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        Ok(Array2::from_shape_fn((n_rows, self.ranges.len()), |(r, c)| {
            scaled[c][r]
        }))
    }

    /// Learned ranges, in column order
    pub fn ranges(&self) -> &[ColumnRange] {
        &self.ranges
    }

    pub fn n_features(&self) -> usize {
        self.ranges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_minmax_scaler() {
        let df = df!("a" => &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let scaler = MinMaxScaler::fit(&df, &columns(&["a"])).unwrap();
        let result = scaler.transform(&df).unwrap();

        let col = result.column(0);
        assert!((col[0] - 0.0).abs() < 1e-10);
        assert!((col[2] - 0.5).abs() < 1e-10);
        assert!((col[4] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let df = df!("owner" => &[0i64, 0, 0, 0]).unwrap();

        let scaler = MinMaxScaler::fit(&df, &columns(&["owner"])).unwrap();
        let result = scaler.transform(&df).unwrap();

        assert!(result.iter().all(|&v| v == 0.0));
        assert!(result.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_out_of_range_values_not_clipped() {
        let train = df!("a" => &[10.0, 20.0]).unwrap();
        let test = df!("a" => &[30.0, 5.0]).unwrap();

        let scaler = MinMaxScaler::fit(&train, &columns(&["a"])).unwrap();
        let result = scaler.transform(&test).unwrap();

        assert!((result[[0, 0]] - 2.0).abs() < 1e-10);
        assert!((result[[1, 0]] + 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_missing_column() {
        let train = df!("a" => &[1.0, 2.0]).unwrap();
        let test = df!("b" => &[1.0, 2.0]).unwrap();

        let scaler = MinMaxScaler::fit(&train, &columns(&["a"])).unwrap();
        let err = scaler.transform(&test).unwrap_err();
        assert!(matches!(err, PricingError::SchemaError(_)));
    }
}
