//! Used-car pricing - cross-validated regression pipeline
//!
//! Predicts a used vehicle's present price from tabular attributes. The
//! model is a fixed pipeline (min-max scaling and one-hot encoding, top-K
//! F-test feature selection, ordinary least squares) whose K is tuned by
//! cross-validated grid search.
//!
//! # Modules
//!
//! - [`preprocessing`] - Age derivation, column transform, feature selection
//! - [`training`] - Linear regression, pipeline, cross-validation, metrics
//! - [`optimizer`] - Grid search over K
//! - [`export`] - Model persistence
//! - [`utils`] - Data loading and metrics output
//! - [`runner`] - End-to-end training session
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod optimizer;

// Persistence and I/O
pub mod export;
pub mod utils;

pub mod runner;
pub mod cli;

pub use error::{PricingError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::TrainingRunConfig;
    pub use crate::error::{PricingError, Result};
    pub use crate::export::{ModelStore, StoredModel};
    pub use crate::optimizer::{GridSearch, Scoring, SearchConfig, SearchResult};
    pub use crate::preprocessing::{
        ColumnTransform, FeatureConfig, FeatureSchema, FeatureSelector, FeatureSplitter,
    };
    pub use crate::runner::{run_training, train_frames, TrainingOutcome};
    pub use crate::training::{
        CVStrategy, FittedPipeline, LinearRegression, MetricsRecord, MetricsReporter, Pipeline,
    };
    pub use crate::utils::{load_frame, write_metrics_jsonl};
}
