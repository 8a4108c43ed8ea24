//! Persistence of the fitted search result
//!
//! Artifacts are bincode-encoded and gzip-compressed. A small header carries
//! the artifact format version; loading rejects any other version. The
//! feature configuration used for training travels with the result so raw
//! records are prepared the same way at prediction time.

use crate::error::{PricingError, Result};
use crate::optimizer::SearchResult;
use crate::preprocessing::{FeatureConfig, FeatureSplitter};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Current artifact layout
pub const FORMAT_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactHeader {
    format_version: u32,
    crate_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelArtifact {
    header: ArtifactHeader,
    features: FeatureConfig,
    result: SearchResult,
}

/// A loaded artifact
#[derive(Debug, Clone, PartialEq)]
pub struct StoredModel {
    pub result: SearchResult,
    /// Feature configuration the result was trained with
    pub features: FeatureConfig,
}

impl StoredModel {
    /// Splitter that prepares raw records exactly as during training
    pub fn splitter(&self) -> FeatureSplitter {
        FeatureSplitter::new(self.features.clone())
    }
}

/// Reads and writes a [`SearchResult`] at a fixed path
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `result` together with `features`, creating parent
    /// directories as needed
    pub fn save(&self, result: &SearchResult, features: &FeatureConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let artifact = ModelArtifact {
            header: ArtifactHeader {
                format_version: FORMAT_VERSION,
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            features: features.clone(),
            result: result.clone(),
        };

        let file = File::create(&self.path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        bincode::serialize_into(&mut encoder, &artifact)?;
        encoder.finish()?.flush()?;

        info!(
            path = %self.path.display(),
            best_k = result.best_k,
            "Saved model"
        );
        Ok(())
    }

    /// Read back a previously saved result and its feature configuration
    pub fn load(&self) -> Result<StoredModel> {
        let file = File::open(&self.path)?;
        let decoder = GzDecoder::new(BufReader::new(file));
        let artifact: ModelArtifact = bincode::deserialize_from(decoder)?;

        if artifact.header.format_version != FORMAT_VERSION {
            return Err(PricingError::SerializationError(format!(
                "unsupported model format version {} (expected {})",
                artifact.header.format_version, FORMAT_VERSION
            )));
        }

        info!(
            path = %self.path.display(),
            written_by = %artifact.header.crate_version,
            best_k = artifact.result.best_k,
            reference_year = artifact.features.reference_year,
            "Loaded model"
        );
        Ok(StoredModel {
            result: artifact.result,
            features: artifact.features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{GridSearch, SearchConfig};
    use crate::preprocessing::FeatureConfig;
    use crate::training::Pipeline;
    use ndarray::Array1;
    use polars::prelude::*;
    use tempfile::TempDir;

    fn fitted_result() -> (SearchResult, DataFrame) {
        let x = df!(
            "Driven_Kms" => &[27000i64, 43000, 6900, 52000, 42450, 12000, 80000, 20000, 31000],
            "Fuel_Type" => &["Petrol", "Diesel", "Petrol", "CNG", "Diesel", "Petrol", "Diesel", "CNG", "Petrol"],
            "Selling_type" => &["Dealer", "Individual", "Dealer", "Individual", "Dealer", "Individual", "Dealer", "Individual", "Dealer"],
            "Transmission" => &["Manual", "Automatic", "Manual", "Automatic", "Manual", "Automatic", "Manual", "Automatic", "Manual"],
            "Age" => &[7i64, 8, 4, 10, 7, 2, 9, 5, 3]
        )
        .unwrap();
        let y = Array1::from_vec(vec![5.6, 9.5, 9.9, 4.2, 6.9, 8.8, 3.1, 8.2, 7.4]);

        let pipeline = Pipeline::from_frame(&x, &FeatureConfig::default(), 1).unwrap();
        let config = SearchConfig::new().with_k_grid([1, 2]).with_n_splits(3);
        let result = GridSearch::new(config).search(&pipeline, &x, &y).unwrap();
        (result, x)
    }

    #[test]
    fn test_round_trip_predicts_identically() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path().join("models").join("model.bin.gz"));
        let (result, x) = fitted_result();

        store.save(&result, &FeatureConfig::default()).unwrap();
        assert!(store.path().exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.result.best_k, result.best_k);
        assert_eq!(loaded.result.predict(&x).unwrap(), result.predict(&x).unwrap());
    }

    #[test]
    fn test_round_trip_keeps_feature_config() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path().join("model.bin.gz"));
        let (result, _) = fitted_result();
        let features = FeatureConfig::default().with_reference_year(2020);

        store.save(&result, &features).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.features, features);
        assert_eq!(loaded.splitter().config().reference_year, 2020);
    }

    #[test]
    fn test_load_rejects_other_format_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.bin.gz");
        let (result, _) = fitted_result();
        let artifact = ModelArtifact {
            header: ArtifactHeader {
                format_version: FORMAT_VERSION - 1,
                crate_version: "0.0.0".to_string(),
            },
            features: FeatureConfig::default(),
            result,
        };
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        bincode::serialize_into(&mut encoder, &artifact).unwrap();
        encoder.finish().unwrap();

        let err = ModelStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PricingError::SerializationError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path().join("missing.bin.gz"));
        assert!(matches!(store.load(), Err(PricingError::IoError(_))));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.bin.gz");
        fs::write(&path, b"not a model").unwrap();

        assert!(ModelStore::new(&path).load().is_err());
    }
}
