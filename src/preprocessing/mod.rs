//! Data preprocessing module
//!
//! Turns raw vehicle records into the numeric matrix consumed by the model:
//! - Age derivation and feature/target splitting
//! - Min-max scaling of numeric columns
//! - One-hot encoding of categorical columns (unknown categories ignored)
//! - Univariate F-test feature selection (top-K)

mod config;
mod scaler;
mod encoder;
pub mod splitter;
pub mod column_transform;
pub mod feature_selection;

pub use config::FeatureConfig;
pub use scaler::{MinMaxScaler, ColumnRange};
pub use encoder::{OneHotEncoder, CategoryVocabulary};
pub use splitter::FeatureSplitter;
pub use column_transform::ColumnTransform;
pub use feature_selection::{FeatureSelector, f_regression};

use crate::error::{PricingError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column data type for preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}

/// Which feature columns are numeric and which are categorical.
///
/// Computed once from the training features and reused unchanged for test
/// data and later predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema from explicit column lists
    pub fn new(numeric_columns: Vec<String>, categorical_columns: Vec<String>) -> Self {
        Self {
            numeric_columns,
            categorical_columns,
        }
    }

    /// Derive the schema from a feature frame.
    ///
    /// Categorical columns come from the configuration (in configuration
    /// order) and must all be present; every other column is numeric, in
    /// frame order.
    pub fn from_frame(df: &DataFrame, config: &FeatureConfig) -> Result<Self> {
        for name in &config.categorical_columns {
            if df.column(name).is_err() {
                return Err(PricingError::missing_column(name));
            }
        }

        let numeric_columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| !config.is_categorical(name))
            .collect();

        Ok(Self {
            numeric_columns,
            categorical_columns: config.categorical_columns.clone(),
        })
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Type of a column, if the schema knows it
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        if self.numeric_columns.iter().any(|c| c == name) {
            Some(ColumnType::Numeric)
        } else if self.categorical_columns.iter().any(|c| c == name) {
            Some(ColumnType::Categorical)
        } else {
            None
        }
    }

    /// Fail with a schema error if any schema column is missing from `df`
    pub fn check_frame(&self, df: &DataFrame) -> Result<()> {
        self.numeric_columns
            .iter()
            .chain(self.categorical_columns.iter())
            .try_for_each(|name| {
                df.column(name)
                    .map(|_| ())
                    .map_err(|_| PricingError::missing_column(name))
            })
    }
}

/// Read a column as `f64` values, casting integer columns.
/// Nulls are rejected: numeric features and targets must be complete.
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PricingError::missing_column(name))?;
    let casted = column.cast(&DataType::Float64)?;
    let ca = casted.f64()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                PricingError::DataError(format!("null value in column '{}' at row {}", name, row))
            })
        })
        .collect()
}

/// Read a column as optional strings, casting non-string columns
pub(crate) fn category_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PricingError::missing_column(name))?;
    let casted = column.cast(&DataType::String)?;
    let ca = casted.str()?;

    Ok(ca.into_iter().map(|v| v.map(|s| s.to_string())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_features() -> DataFrame {
        df!(
            "Selling_Price" => &[3.35, 4.75, 7.25],
            "Driven_Kms" => &[27000i64, 43000, 6900],
            "Fuel_Type" => &["Petrol", "Diesel", "Petrol"],
            "Selling_type" => &["Dealer", "Dealer", "Individual"],
            "Transmission" => &["Manual", "Manual", "Automatic"],
            "Owner" => &[0i64, 0, 1],
            "Age" => &[7.0, 8.0, 4.0]
        )
        .unwrap()
    }

    #[test]
    fn test_schema_from_frame() {
        let schema = FeatureSchema::from_frame(&sample_features(), &FeatureConfig::default()).unwrap();

        assert_eq!(
            schema.numeric_columns(),
            &["Selling_Price", "Driven_Kms", "Owner", "Age"]
        );
        assert_eq!(
            schema.categorical_columns(),
            &["Fuel_Type", "Selling_type", "Transmission"]
        );
        assert_eq!(schema.column_type("Owner"), Some(ColumnType::Numeric));
        assert_eq!(schema.column_type("Fuel_Type"), Some(ColumnType::Categorical));
        assert_eq!(schema.column_type("Car_Name"), None);
    }

    #[test]
    fn test_schema_missing_categorical() {
        let df = sample_features().drop("Transmission").unwrap();
        let err = FeatureSchema::from_frame(&df, &FeatureConfig::default()).unwrap_err();
        assert!(matches!(err, PricingError::SchemaError(_)));
    }

    #[test]
    fn test_numeric_values_casts_integers() {
        let values = numeric_values(&sample_features(), "Driven_Kms").unwrap();
        assert_eq!(values, vec![27000.0, 43000.0, 6900.0]);
    }

    #[test]
    fn test_numeric_values_rejects_nulls() {
        let df = df!("x" => &[Some(1.0), None, Some(3.0)]).unwrap();
        let err = numeric_values(&df, "x").unwrap_err();
        assert!(matches!(err, PricingError::DataError(_)));
    }
}
