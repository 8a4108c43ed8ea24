//! Search configuration

use crate::error::{PricingError, Result};
use crate::training::CVStrategy;
use serde::{Deserialize, Serialize};

/// Metric used to score a candidate on a held-out fold.
/// Scores are maximized, so error metrics are negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scoring {
    #[default]
    NegMeanAbsoluteError,
    NegMeanSquaredError,
    R2,
}

impl Scoring {
    pub fn name(&self) -> &'static str {
        match self {
            Scoring::NegMeanAbsoluteError => "neg_mean_absolute_error",
            Scoring::NegMeanSquaredError => "neg_mean_squared_error",
            Scoring::R2 => "r2",
        }
    }
}

/// Configuration for the K grid search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidate numbers of selected features, in evaluation order
    pub k_grid: Vec<usize>,

    /// Fold layout
    pub cv: CVStrategy,

    /// Fold score
    pub scoring: Scoring,

    /// Worker threads; `None` uses the global rayon pool
    pub n_jobs: Option<usize>,

    /// Seed for fold shuffling
    pub random_state: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            k_grid: (1..=11).collect(),
            cv: CVStrategy::default(),
            scoring: Scoring::default(),
            n_jobs: None,
            random_state: Some(42),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_k_grid(mut self, grid: impl IntoIterator<Item = usize>) -> Self {
        self.k_grid = grid.into_iter().collect();
        self
    }

    pub fn with_cv(mut self, cv: CVStrategy) -> Self {
        self.cv = cv;
        self
    }

    /// Builder method to set the fold count, keeping the shuffle setting
    pub fn with_n_splits(mut self, n: usize) -> Self {
        self.cv = self.cv.with_n_splits(n);
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    /// Builder method to enable parallel execution on a dedicated pool
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = Some(n);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Checks that do not depend on the data
    pub fn validate(&self) -> Result<()> {
        if self.k_grid.is_empty() {
            return Err(PricingError::ConfigError("k_grid is empty".to_string()));
        }
        if self.k_grid.contains(&0) {
            return Err(PricingError::ConfigError(
                "k_grid values must be at least 1".to_string(),
            ));
        }
        if self.cv.n_splits() < 2 {
            return Err(PricingError::ConfigError(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.cv.n_splits()
            )));
        }
        if self.n_jobs == Some(0) {
            return Err(PricingError::ConfigError(
                "n_jobs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.k_grid, (1..=11).collect::<Vec<_>>());
        assert_eq!(config.cv, CVStrategy::KFold { n_splits: 10, shuffle: false });
        assert_eq!(config.scoring, Scoring::NegMeanAbsoluteError);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SearchConfig::new()
            .with_k_grid([1, 3, 5])
            .with_n_splits(5)
            .with_n_jobs(2);

        assert_eq!(config.k_grid, vec![1, 3, 5]);
        assert_eq!(config.cv.n_splits(), 5);
        assert_eq!(config.n_jobs, Some(2));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SearchConfig::new().with_k_grid(Vec::new()).validate().is_err());
        assert!(SearchConfig::new().with_k_grid([0, 1]).validate().is_err());
        assert!(SearchConfig::new().with_n_splits(1).validate().is_err());
    }

    #[test]
    fn test_scoring_serde() {
        let json = serde_json::to_string(&Scoring::NegMeanAbsoluteError).unwrap();
        assert_eq!(json, "\"NegMeanAbsoluteError\"");
        assert_eq!(Scoring::NegMeanAbsoluteError.name(), "neg_mean_absolute_error");
    }
}
