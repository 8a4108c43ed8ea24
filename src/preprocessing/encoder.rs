//! One-hot categorical encoding

use super::category_values;
use crate::error::Result;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Categories learned for one source column, in first-seen order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub column: String,
    pub categories: Vec<String>,
}

impl CategoryVocabulary {
    fn build(column: &str, values: &[Option<String>]) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for value in values.iter().flatten() {
            if !categories.contains(value) {
                categories.push(value.clone());
            }
        }

        Self {
            column: column.to_string(),
            categories,
        }
    }

    /// Indicator position of `value`, or `None` when it was never seen
    fn position_map(&self) -> HashMap<&str, usize> {
        self.categories
            .iter()
            .enumerate()
            .map(|(idx, cat)| (cat.as_str(), idx))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Fitted one-hot encoder.
///
/// Values not seen during fit (and nulls) produce an all-zero indicator
/// group; they never raise and never add columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    vocabularies: Vec<CategoryVocabulary>,
}

impl OneHotEncoder {
    /// Learn the vocabulary of each column
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let vocabularies = columns
            .iter()
            .map(|name| {
                let values = category_values(df, name)?;
                Ok(CategoryVocabulary::build(name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { vocabularies })
    }

    /// Encode the fitted columns of `df` into indicator columns, grouped by
    /// source column in fit order
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();
        let mut result = Array2::zeros((n_rows, self.n_features()));

        let mut offset = 0;
        for vocab in &self.vocabularies {
            let values = category_values(df, &vocab.column)?;
            let positions = vocab.position_map();

            for (row, value) in values.iter().enumerate() {
                if let Some(&pos) = value.as_deref().and_then(|v| positions.get(v)) {
                    result[[row, offset + pos]] = 1.0;
                }
            }
            offset += vocab.len();
        }

        Ok(result)
    }

    /// Output column names, `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|vocab| {
                vocab
                    .categories
                    .iter()
                    .map(move |cat| format!("{}_{}", vocab.column, cat))
            })
            .collect()
    }

    pub fn vocabularies(&self) -> &[CategoryVocabulary] {
        &self.vocabularies
    }

    /// Total number of indicator columns
    pub fn n_features(&self) -> usize {
        self.vocabularies.iter().map(CategoryVocabulary::len).sum()
    }
}
