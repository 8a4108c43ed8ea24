//! Per-column-group transformation into one numeric matrix

use super::{FeatureSchema, MinMaxScaler, OneHotEncoder};
use crate::error::Result;
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted column transform.
///
/// Output layout is fixed at fit time: scaled numeric columns in schema
/// order, then one-hot indicator groups in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransform {
    schema: FeatureSchema,
    scaler: MinMaxScaler,
    encoder: OneHotEncoder,
}

impl ColumnTransform {
    /// Learn numeric ranges and categorical vocabularies from `df`
    pub fn fit(schema: &FeatureSchema, df: &DataFrame) -> Result<Self> {
        schema.check_frame(df)?;

        let scaler = MinMaxScaler::fit(df, schema.numeric_columns())?;
        let encoder = OneHotEncoder::fit(df, schema.categorical_columns())?;

        Ok(Self {
            schema: schema.clone(),
            scaler,
            encoder,
        })
    }

    /// Apply the fitted transformation.
    /// Every column present at fit time must be present in `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        self.schema.check_frame(df)?;

        let numeric = self.scaler.transform(df)?;
        let indicators = self.encoder.transform(df)?;

        Ok(concatenate(Axis(1), &[numeric.view(), indicators.view()])?)
    }

    /// Fit and transform in one step
    pub fn fit_transform(schema: &FeatureSchema, df: &DataFrame) -> Result<(Self, Array2<f64>)> {
        let fitted = Self::fit(schema, df)?;
        let transformed = fitted.transform(df)?;
        Ok((fitted, transformed))
    }

    /// Names of the output columns, in output order
    pub fn feature_names(&self) -> Vec<String> {
        self.scaler
            .ranges()
            .iter()
            .map(|r| r.name.clone())
            .chain(self.encoder.feature_names())
            .collect()
    }

    /// Width of the transformed matrix
    pub fn n_features_out(&self) -> usize {
        self.scaler.n_features() + self.encoder.n_features()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::preprocessing::FeatureConfig;

    fn create_features() -> DataFrame {
        df!(
            "Selling_Price" => &[3.35, 4.75, 7.25, 2.85, 4.6],
            "Driven_Kms" => &[27000i64, 43000, 6900, 5200, 42450],
            "Fuel_Type" => &["Petrol", "Diesel", "Petrol", "Petrol", "Diesel"],
            "Selling_type" => &["Dealer", "Dealer", "Dealer", "Individual", "Dealer"],
            "Transmission" => &["Manual", "Manual", "Manual", "Manual", "Automatic"],
            "Owner" => &[0i64, 0, 0, 0, 0],
            "Age" => &[7i64, 8, 4, 10, 7]
        )
        .unwrap()
    }

    fn fit_default(df: &DataFrame) -> (ColumnTransform, Array2<f64>) {
        let schema = FeatureSchema::from_frame(df, &FeatureConfig::default()).unwrap();
        ColumnTransform::fit_transform(&schema, df).unwrap()
    }

    #[test]
    fn test_output_layout() {
        let (transform, x) = fit_default(&create_features());

        assert_eq!(transform.n_features_out(), 4 + 2 + 2 + 2);
        assert_eq!(x.ncols(), transform.n_features_out());
        assert_eq!(
            transform.feature_names(),
            vec![
                "Selling_Price", "Driven_Kms", "Owner", "Age",
                "Fuel_Type_Petrol", "Fuel_Type_Diesel",
                "Selling_type_Dealer", "Selling_type_Individual",
                "Transmission_Manual", "Transmission_Automatic",
            ]
        );
    }

    #[test]
    fn test_fit_data_round_trip() {
        let (_, x) = fit_default(&create_features());

        for row in x.rows() {
            // numeric block within [0, 1]
            assert!(row.iter().take(4).all(|&v| (0.0..=1.0).contains(&v)));
            // one hot per categorical group
            assert_eq!(row[4] + row[5], 1.0);
            assert_eq!(row[6] + row[7], 1.0);
            assert_eq!(row[8] + row[9], 1.0);
        }
        // Owner is constant: degenerate column scales to zero
        assert!(x.column(2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unseen_category_keeps_width() {
        let (transform, _) = fit_default(&create_features());
        let new_rows = df!(
            "Selling_Price" => &[5.0],
            "Driven_Kms" => &[10000i64],
            "Fuel_Type" => &["CNG"],
            "Selling_type" => &["Dealer"],
            "Transmission" => &["Manual"],
            "Owner" => &[1i64],
            "Age" => &[3i64]
        )
        .unwrap();

        let x = transform.transform(&new_rows).unwrap();
        assert_eq!(x.ncols(), 10);
        assert_eq!(x[[0, 4]], 0.0);
        assert_eq!(x[[0, 5]], 0.0);
        assert_eq!(x[[0, 6]], 1.0);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let (transform, _) = fit_default(&create_features());
        let df = create_features().drop("Driven_Kms").unwrap();

        let err = transform.transform(&df).unwrap_err();
        assert!(matches!(err, PricingError::SchemaError(_)));
    }
}
