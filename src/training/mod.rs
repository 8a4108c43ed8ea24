//! Model training module
//!
//! Provides the estimator and the pieces built around it:
//! - Ordinary least squares linear regression
//! - The transform → select → regress pipeline
//! - K-fold cross-validation splitting
//! - Regression metrics and the train/test metrics report

pub mod cross_validation;
pub mod linear_models;
pub mod metrics;
pub mod pipeline;

pub use cross_validation::{CrossValidator, CVStrategy, CVSplit, CVResults};
pub use linear_models::LinearRegression;
pub use metrics::{
    mean_absolute_error, regression_metrics, MetricsRecord, MetricsReporter, RecordKind,
    RegressionMetrics, Split,
};
pub use pipeline::{FittedPipeline, Pipeline, PipelineStep};
