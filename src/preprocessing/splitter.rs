//! Feature/target splitting with age derivation

use super::{numeric_values, FeatureConfig};
use crate::error::{PricingError, Result};
use ndarray::Array1;
use polars::prelude::*;
use tracing::debug;

/// Separates raw vehicle records into a feature frame and a target vector
#[derive(Debug, Clone, Default)]
pub struct FeatureSplitter {
    config: FeatureConfig,
}

impl FeatureSplitter {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Add the age column (`reference_year - year`) and drop the year and
    /// name columns. The input frame is left untouched.
    pub fn derive_age(&self, df: &DataFrame) -> Result<DataFrame> {
        let years = numeric_values(df, &self.config.year_column)?;
        let reference = self.config.reference_year as f64;
        let ages: Vec<f64> = years.iter().map(|year| reference - year).collect();

        let mut result = df.drop(&self.config.year_column)?;
        if result.column(&self.config.name_column).is_ok() {
            result = result.drop(&self.config.name_column)?;
        }
        result.with_column(Column::new(self.config.age_column.as_str().into(), ages))?;

        debug!(
            rows = result.height(),
            reference_year = self.config.reference_year,
            "Derived age column"
        );
        Ok(result)
    }

    /// Split `df` into features (every column but the target) and target
    pub fn split(&self, df: &DataFrame, target_column: &str) -> Result<(DataFrame, Array1<f64>)> {
        if df.column(target_column).is_err() {
            return Err(PricingError::missing_column(target_column));
        }

        let y = Array1::from_vec(numeric_values(df, target_column)?);
        let x = df.drop(target_column)?;
        Ok((x, y))
    }

    /// Age derivation followed by a split on the configured target
    pub fn prepare(&self, df: &DataFrame) -> Result<(DataFrame, Array1<f64>)> {
        let with_age = self.derive_age(df)?;
        self.split(&with_age, &self.config.target_column)
    }
}
