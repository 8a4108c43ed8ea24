//! Cross-validated grid search over the number of selected features

use super::config::{Scoring, SearchConfig};
use crate::error::{PricingError, Result};
use crate::preprocessing::ColumnTransform;
use crate::training::{
    mean_absolute_error, regression_metrics, CVResults, CVSplit, CrossValidator, FittedPipeline,
    Pipeline,
};
use ndarray::{Array1, Axis};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cross-validation outcome for one grid candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub k: usize,
    pub fold_scores: Vec<f64>,
    pub mean_test_score: f64,
    pub std_test_score: f64,
    /// 1 for the best candidate
    pub rank: usize,
}

/// Outcome of a grid search, including the winner refit on all data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_k: usize,
    pub best_index: usize,
    pub best_score: f64,
    pub scoring: Scoring,
    pub n_splits: usize,
    /// One entry per candidate, in grid order
    pub cv_results: Vec<CandidateResult>,
    pub best_pipeline: FittedPipeline,
    pub search_time_secs: f64,
}

impl SearchResult {
    /// Predict with the refit winner
    pub fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        self.best_pipeline.predict(x)
    }

    pub fn best_candidate(&self) -> &CandidateResult {
        &self.cv_results[self.best_index]
    }
}

/// Row subsets of one fold, shared by every candidate
struct FoldData {
    fold_idx: usize,
    x_train: DataFrame,
    y_train: Array1<f64>,
    x_test: DataFrame,
    y_test: Array1<f64>,
}

impl FoldData {
    fn from_split(split: &CVSplit, x: &DataFrame, y: &Array1<f64>) -> Result<Self> {
        Ok(Self {
            fold_idx: split.fold_idx,
            x_train: take_rows(x, &split.train_indices)?,
            y_train: y.select(Axis(0), &split.train_indices),
            x_test: take_rows(x, &split.test_indices)?,
            y_test: y.select(Axis(0), &split.test_indices),
        })
    }
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}

/// Exhaustive search over `SearchConfig::k_grid`
#[derive(Debug, Clone, Default)]
pub struct GridSearch {
    config: SearchConfig,
}

impl GridSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Score every candidate by cross-validation, pick the best and refit it
    /// on the whole of `x`/`y`.
    pub fn search(&self, pipeline: &Pipeline, x: &DataFrame, y: &Array1<f64>) -> Result<SearchResult> {
        let start = Instant::now();
        self.config.validate()?;

        if x.height() != y.len() {
            return Err(PricingError::DataError(format!(
                "feature frame has {} rows but target has {} values",
                x.height(),
                y.len()
            )));
        }

        let full_width = ColumnTransform::fit(pipeline.schema(), x)?.n_features_out();
        if let Some(&k) = self.config.k_grid.iter().find(|&&k| k > full_width) {
            return Err(PricingError::ConfigError(format!(
                "k = {} exceeds the {} transformed features",
                k, full_width
            )));
        }

        let mut validator = CrossValidator::new(self.config.cv);
        if let Some(seed) = self.config.random_state {
            validator = validator.with_random_state(seed);
        }
        let splits = validator.split(x.height())?;
        let folds = splits
            .iter()
            .map(|split| FoldData::from_split(split, x, y))
            .collect::<Result<Vec<_>>>()?;

        info!(
            candidates = self.config.k_grid.len(),
            folds = folds.len(),
            scoring = self.config.scoring.name(),
            "Starting grid search"
        );

        let tasks: Vec<(usize, usize)> = (0..self.config.k_grid.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        let run = || -> Result<Vec<f64>> {
            tasks
                .par_iter()
                .map(|&(c, f)| self.evaluate_or_nan(pipeline, self.config.k_grid[c], &folds[f]))
                .collect::<Result<Vec<_>>>()
        };

        let scores = match self.config.n_jobs {
            Some(n_jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n_jobs)
                    .build()
                    .map_err(|e| PricingError::ThreadPoolError(e.to_string()))?;
                pool.install(run)?
            }
            None => run()?,
        };

        let mut cv_results: Vec<CandidateResult> = self
            .config
            .k_grid
            .iter()
            .enumerate()
            .map(|(c, &k)| {
                let fold_scores = scores[c * folds.len()..(c + 1) * folds.len()].to_vec();
                let summary = CVResults::from_scores(fold_scores);
                CandidateResult {
                    k,
                    fold_scores: summary.scores,
                    mean_test_score: summary.mean_score,
                    std_test_score: summary.std_score,
                    rank: 0,
                }
            })
            .collect();

        // stable sort: equal means keep grid order, NaN means go last
        let mut order: Vec<usize> = (0..cv_results.len()).collect();
        order.sort_by(|&a, &b| {
            let (score_a, score_b) = (cv_results[a].mean_test_score, cv_results[b].mean_test_score);
            match (score_a.is_nan(), score_b.is_nan()) {
                (false, false) => score_b.total_cmp(&score_a),
                (nan_a, nan_b) => nan_a.cmp(&nan_b),
            }
        });
        for (position, &c) in order.iter().enumerate() {
            cv_results[c].rank = position + 1;
        }

        for candidate in &cv_results {
            info!(
                k = candidate.k,
                mean_score = candidate.mean_test_score,
                std_score = candidate.std_test_score,
                rank = candidate.rank,
                "Candidate evaluated"
            );
        }

        let best_index = order[0];
        let best_k = cv_results[best_index].k;
        let best_score = cv_results[best_index].mean_test_score;
        if best_score.is_nan() {
            return Err(PricingError::ComputationError(
                "every candidate failed on at least one fold".to_string(),
            ));
        }

        let best_pipeline = pipeline.with_k(best_k).fit(x, y)?;
        let search_time_secs = start.elapsed().as_secs_f64();

        info!(
            best_k,
            best_score,
            elapsed_secs = search_time_secs,
            "Grid search complete"
        );

        Ok(SearchResult {
            best_k,
            best_index,
            best_score,
            scoring: self.config.scoring,
            n_splits: folds.len(),
            cv_results,
            best_pipeline,
            search_time_secs,
        })
    }

    /// A candidate that cannot be fitted on a fold (K wider than the fold's
    /// transformed features when a category is absent from its training
    /// rows) scores NaN there instead of aborting the search
    fn evaluate_or_nan(&self, pipeline: &Pipeline, k: usize, fold: &FoldData) -> Result<f64> {
        match self.evaluate(pipeline, k, fold) {
            Err(PricingError::ConfigError(reason)) => {
                warn!(k, fold = fold.fold_idx, %reason, "Fold failed, scoring NaN");
                Ok(f64::NAN)
            }
            other => other,
        }
    }

    fn evaluate(&self, pipeline: &Pipeline, k: usize, fold: &FoldData) -> Result<f64> {
        let fitted = pipeline.with_k(k).fit(&fold.x_train, &fold.y_train)?;
        let y_pred = fitted.predict(&fold.x_test)?;

        let score = match self.config.scoring {
            Scoring::NegMeanAbsoluteError => -mean_absolute_error(&fold.y_test, &y_pred)?,
            Scoring::NegMeanSquaredError => -regression_metrics(&fold.y_test, &y_pred)?.mse,
            Scoring::R2 => regression_metrics(&fold.y_test, &y_pred)?.r2,
        };

        debug!(k, fold = fold.fold_idx, score, "Fold evaluated");
        Ok(score)
    }
}
