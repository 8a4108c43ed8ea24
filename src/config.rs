//! Run configuration for a full training session

use crate::error::{PricingError, Result};
use crate::optimizer::SearchConfig;
use crate::preprocessing::FeatureConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a training run needs: feature handling, search settings and
/// the input/output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingRunConfig {
    pub features: FeatureConfig,
    pub search: SearchConfig,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
}

impl Default for TrainingRunConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            search: SearchConfig::default(),
            train_path: PathBuf::from("files/input/train_data.csv"),
            test_path: PathBuf::from("files/input/test_data.csv"),
            model_path: PathBuf::from("files/models/model.bin.gz"),
            metrics_path: PathBuf::from("files/output/metrics.json"),
        }
    }
}

impl TrainingRunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn with_data(mut self, train: impl Into<PathBuf>, test: impl Into<PathBuf>) -> Self {
        self.train_path = train.into();
        self.test_path = test.into();
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_metrics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metrics_path = path.into();
        self
    }

    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Reject configurations that cannot produce a valid run
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;

        if self.features.is_categorical(&self.features.target_column) {
            return Err(PricingError::ConfigError(format!(
                "target column '{}' is also listed as categorical",
                self.features.target_column
            )));
        }
        Ok(())
    }
}
