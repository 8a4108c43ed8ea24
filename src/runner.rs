//! End-to-end training session: load, split, search, persist, report

use crate::config::TrainingRunConfig;
use crate::error::Result;
use crate::export::ModelStore;
use crate::optimizer::{GridSearch, SearchResult};
use crate::preprocessing::FeatureSplitter;
use crate::training::{MetricsRecord, MetricsReporter, Pipeline};
use crate::utils::{load_frame, write_metrics_jsonl};
use ndarray::Array1;
use polars::prelude::DataFrame;
use std::time::{Duration, Instant};
use tracing::info;

/// What a completed training session produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub result: SearchResult,
    pub train_metrics: MetricsRecord,
    pub test_metrics: MetricsRecord,
    pub search_duration: Duration,
}

impl TrainingOutcome {
    pub fn metrics(&self) -> [&MetricsRecord; 2] {
        [&self.train_metrics, &self.test_metrics]
    }
}

/// Train on already-loaded frames without touching the filesystem
pub fn train_frames(
    config: &TrainingRunConfig,
    train: &DataFrame,
    test: &DataFrame,
) -> Result<TrainingOutcome> {
    config.validate()?;

    let splitter = FeatureSplitter::new(config.features.clone());
    let (x_train, y_train) = splitter.prepare(train)?;
    let (x_test, y_test) = splitter.prepare(test)?;

    let pipeline = Pipeline::from_frame(&x_train, &config.features, 1)?;

    let start = Instant::now();
    let result = GridSearch::new(config.search.clone()).search(&pipeline, &x_train, &y_train)?;
    let search_duration = start.elapsed();

    info!(
        best_k = result.best_k,
        elapsed_secs = search_duration.as_secs_f64(),
        "Time to optimize hyperparameters"
    );

    let (train_metrics, test_metrics) =
        MetricsReporter::report(&result.best_pipeline, &x_train, &y_train, &x_test, &y_test)?;

    Ok(TrainingOutcome {
        result,
        train_metrics,
        test_metrics,
        search_duration,
    })
}

/// Full session driven by the paths in `config`: the fitted model and the
/// metrics file are written to their configured locations
pub fn run_training(config: &TrainingRunConfig) -> Result<TrainingOutcome> {
    config.validate()?;

    let train = load_frame(&config.train_path)?;
    let test = load_frame(&config.test_path)?;

    let outcome = train_frames(config, &train, &test)?;

    ModelStore::new(&config.model_path).save(&outcome.result, &config.features)?;
    write_metrics_jsonl(
        &config.metrics_path,
        &[outcome.train_metrics.clone(), outcome.test_metrics.clone()],
    )?;

    Ok(outcome)
}

/// Predict prices for raw records (with `Year`, optionally `Car_Name` and
/// the target) using a stored search result
pub fn predict_raw(
    result: &SearchResult,
    splitter: &FeatureSplitter,
    raw: &DataFrame,
) -> Result<Array1<f64>> {
    let mut features = splitter.derive_age(raw)?;
    let target = &splitter.config().target_column;
    if features.column(target).is_ok() {
        features = features.drop(target)?;
    }
    result.predict(&features)
}
