//! Transform → select → regress pipeline
//!
//! [`Pipeline`] is an unfitted template (column schema plus the number of
//! features to keep). Fitting produces a [`FittedPipeline`] that owns the
//! learned state of every stage and replays it on new frames.

use super::linear_models::LinearRegression;
use crate::error::{PricingError, Result};
use crate::preprocessing::{ColumnTransform, FeatureConfig, FeatureSchema, FeatureSelector};
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Stages of the pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStep {
    ColumnTransform,
    FeatureSelection,
    Regression,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 3] = [
        PipelineStep::ColumnTransform,
        PipelineStep::FeatureSelection,
        PipelineStep::Regression,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStep::ColumnTransform => "column_transform",
            PipelineStep::FeatureSelection => "feature_selection",
            PipelineStep::Regression => "regression",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unfitted pipeline template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    schema: FeatureSchema,
    k: usize,
}

impl Pipeline {
    pub fn new(schema: FeatureSchema, k: usize) -> Self {
        Self { schema, k }
    }

    /// Build a template whose schema is inferred from a feature frame
    pub fn from_frame(df: &DataFrame, config: &FeatureConfig, k: usize) -> Result<Self> {
        Ok(Self::new(FeatureSchema::from_frame(df, config)?, k))
    }

    /// Same template with a different number of selected features
    pub fn with_k(&self, k: usize) -> Self {
        Self {
            schema: self.schema.clone(),
            k,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Fit every stage in order on `x`/`y`
    pub fn fit(&self, x: &DataFrame, y: &Array1<f64>) -> Result<FittedPipeline> {
        if x.height() != y.len() {
            return Err(PricingError::DataError(format!(
                "feature frame has {} rows but target has {} values",
                x.height(),
                y.len()
            )));
        }

        let (transform, transformed) = ColumnTransform::fit_transform(&self.schema, x)?;
        let (selector, selected) = FeatureSelector::fit_transform(&transformed, y, self.k)?;
        let estimator = LinearRegression::fit(&selected, y)?;

        debug!(
            k = self.k,
            rows = x.height(),
            transformed_width = transformed.ncols(),
            "Fitted pipeline"
        );

        Ok(FittedPipeline {
            transform,
            selector,
            estimator,
        })
    }
}

/// Pipeline with fitted state for every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    transform: ColumnTransform,
    selector: FeatureSelector,
    estimator: LinearRegression,
}

impl FittedPipeline {
    /// Transformed and selected design matrix for `x`
    pub fn transform_selected(&self, x: &DataFrame) -> Result<Array2<f64>> {
        let transformed = self.transform.transform(x)?;
        self.selector.transform(&transformed)
    }

    /// Predict prices for the rows of `x`
    pub fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        let selected = self.transform_selected(x)?;
        self.estimator.predict(&selected)
    }

    /// Names of the transformed columns kept by the selector
    pub fn selected_feature_names(&self) -> Vec<String> {
        let names = self.transform.feature_names();
        self.selector
            .selected_indices()
            .iter()
            .filter_map(|&i| names.get(i).cloned())
            .collect()
    }

    pub fn k(&self) -> usize {
        self.selector.k()
    }

    pub fn steps(&self) -> &'static [PipelineStep] {
        &PipelineStep::ALL
    }

    pub fn column_transform(&self) -> &ColumnTransform {
        &self.transform
    }

    pub fn selector(&self) -> &FeatureSelector {
        &self.selector
    }

    pub fn estimator(&self) -> &LinearRegression {
        &self.estimator
    }
}
