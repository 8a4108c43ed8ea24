//! Regression quality metrics for the fitted pipeline

use super::pipeline::FittedPipeline;
use crate::error::{PricingError, Result};
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Dataset a metrics record was computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

/// Record kind tag; always serialized as `"metrics"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Metrics,
}

/// One line of the metrics output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(rename = "dataset")]
    pub split: Split,
    pub r2: f64,
    pub mse: f64,
    pub mad: f64,
}

impl MetricsRecord {
    /// Build a record from unrounded metrics, rounding each to 3 decimals
    pub fn new(split: Split, metrics: &RegressionMetrics) -> Self {
        Self {
            kind: RecordKind::Metrics,
            split,
            r2: round3(metrics.r2),
            mse: round3(metrics.mse),
            mad: round3(metrics.median_absolute_error),
        }
    }
}

/// Unrounded regression metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination
    pub r2: f64,
    /// Mean squared error
    pub mse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Median absolute error
    pub median_absolute_error: f64,
    pub n_samples: usize,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Mean absolute error between targets and predictions
pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    Ok((y_true - y_pred).mapv(f64::abs).sum() / y_true.len() as f64)
}

/// Compute regression metrics
pub fn regression_metrics(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<RegressionMetrics> {
    check_lengths(y_true, y_pred)?;
    let n_samples = y_true.len();
    if n_samples == 0 {
        return Err(PricingError::DataError(
            "cannot compute metrics on an empty dataset".to_string(),
        ));
    }

    let n = n_samples as f64;
    let errors: Vec<f64> = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| t - p)
        .collect();

    let ss_res: f64 = errors.iter().map(|e| e * e).sum();
    let mse = ss_res / n;
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

    let mut abs_errors: Vec<f64> = errors.iter().map(|e| e.abs()).collect();
    let median_absolute_error = median(&mut abs_errors);

    let y_mean = y_true.mean().unwrap_or(0.0);
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();
    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(RegressionMetrics {
        r2,
        mse,
        mae,
        median_absolute_error,
        n_samples,
    })
}

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(PricingError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    Ok(())
}

/// Computes train/test metrics records for a fitted pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsReporter;

impl MetricsReporter {
    /// Metrics record for one split
    pub fn evaluate(
        pipeline: &FittedPipeline,
        split: Split,
        x: &DataFrame,
        y: &Array1<f64>,
    ) -> Result<MetricsRecord> {
        let y_pred = pipeline.predict(x)?;
        let metrics = regression_metrics(y, &y_pred)?;
        let record = MetricsRecord::new(split, &metrics);

        info!(
            dataset = ?record.split,
            r2 = record.r2,
            mse = record.mse,
            mad = record.mad,
            "Computed metrics"
        );
        Ok(record)
    }

    /// Train and test records, in that order
    pub fn report(
        pipeline: &FittedPipeline,
        x_train: &DataFrame,
        y_train: &Array1<f64>,
        x_test: &DataFrame,
        y_test: &Array1<f64>,
    ) -> Result<(MetricsRecord, MetricsRecord)> {
        let train = Self::evaluate(pipeline, Split::Train, x_train, y_train)?;
        let test = Self::evaluate(pipeline, Split::Test, x_test, y_test)?;
        Ok((train, test))
    }
}
