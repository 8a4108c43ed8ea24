//! Feature preparation configuration

use serde::{Deserialize, Serialize};

/// Configuration for turning raw vehicle records into model features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Year that vehicle age is measured against
    pub reference_year: i64,

    /// Column holding the regression target
    pub target_column: String,

    /// Manufacture year column; replaced by the derived age
    pub year_column: String,

    /// Identifying column dropped before modelling
    pub name_column: String,

    /// Name of the derived age column
    pub age_column: String,

    /// Columns one-hot encoded by the column transform.
    /// Every other feature column is treated as numeric.
    pub categorical_columns: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            reference_year: 2021,
            target_column: "Present_Price".to_string(),
            year_column: "Year".to_string(),
            name_column: "Car_Name".to_string(),
            age_column: "Age".to_string(),
            categorical_columns: vec![
                "Fuel_Type".to_string(),
                "Selling_type".to_string(),
                "Transmission".to_string(),
            ],
        }
    }
}

impl FeatureConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the reference year
    pub fn with_reference_year(mut self, year: i64) -> Self {
        self.reference_year = year;
        self
    }

    /// Builder method to set the target column
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    /// Builder method to set the categorical columns
    pub fn with_categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `name` is configured as categorical
    pub fn is_categorical(&self, name: &str) -> bool {
        self.categorical_columns.iter().any(|c| c == name)
    }
}
