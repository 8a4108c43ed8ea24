//! Data loading and saving utilities

use crate::error::{PricingError, Result};
use crate::training::MetricsRecord;
use flate2::read::GzDecoder;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Input file format, detected from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    CsvGz,
    Json,
    JsonLines,
    Parquet,
}

impl FileFormat {
    /// Detect the format of `path`; unknown extensions fall back to CSV
    pub fn from_path(path: &Path) -> Self {
        let lower = path.to_string_lossy().to_lowercase();
        if lower.ends_with(".csv.gz") {
            FileFormat::CsvGz
        } else if lower.ends_with(".parquet") || lower.ends_with(".pq") {
            FileFormat::Parquet
        } else if lower.ends_with(".jsonl") || lower.ends_with(".ndjson") {
            FileFormat::JsonLines
        } else if lower.ends_with(".json") {
            FileFormat::Json
        } else {
            FileFormat::Csv
        }
    }
}

/// Data loader for the supported file formats
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer CSV column types
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(1000),
        }
    }

    /// Set the number of rows used for CSV schema inference (`None` = all)
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file);

        Ok(reader.finish()?)
    }

    /// Load a gzip-compressed CSV file
    pub fn load_csv_gz(&self, path: &Path) -> Result<DataFrame> {
        let mut decoder = GzDecoder::new(File::open(path)?);
        let mut bytes = Vec::new();
        decoder.read_to_end(&mut bytes)?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(Cursor::new(bytes));

        Ok(reader.finish()?)
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        Ok(ParquetReader::new(file).finish()?)
    }

    /// Load a JSON file (array of records or line-delimited)
    pub fn load_json(&self, path: &Path, format: JsonFormat) -> Result<DataFrame> {
        let file = File::open(path)?;
        Ok(JsonReader::new(file).with_json_format(format).finish()?)
    }

    /// Detect file format from extension and load
    pub fn load(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(PricingError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }

        let start = Instant::now();
        let format = FileFormat::from_path(path);
        let df = match format {
            FileFormat::Csv => self.load_csv(path)?,
            FileFormat::CsvGz => self.load_csv_gz(path)?,
            FileFormat::Parquet => self.load_parquet(path)?,
            FileFormat::Json => self.load_json(path, JsonFormat::Json)?,
            FileFormat::JsonLines => self.load_json(path, JsonFormat::JsonLines)?,
        };

        info!(
            path = %path.display(),
            format = ?format,
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded data"
        );
        Ok(df)
    }
}

/// Load a frame with the default loader
pub fn load_frame(path: impl AsRef<Path>) -> Result<DataFrame> {
    DataLoader::new().load(path.as_ref())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save DataFrame to disk
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV, creating parent directories
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file).finish(df)?;
        Ok(())
    }
}

/// Write metrics records as JSON lines, one object per line, creating parent
/// directories. An existing file is overwritten.
pub fn write_metrics_jsonl(path: impl AsRef<Path>, records: &[MetricsRecord]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(path = %path.display(), records = records.len(), "Wrote metrics");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{MetricsRecord, RegressionMetrics, Split};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    const CSV: &str = "Car_Name,Year,Present_Price,Fuel_Type\nritz,2014,5.59,Petrol\nsx4,2013,9.54,Diesel\nciaz,2017,9.85,Petrol\n";

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path(Path::new("car data.csv")), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("a/train.CSV.GZ")), FileFormat::CsvGz);
        assert_eq!(FileFormat::from_path(Path::new("x.parquet")), FileFormat::Parquet);
        assert_eq!(FileFormat::from_path(Path::new("x.jsonl")), FileFormat::JsonLines);
        assert_eq!(FileFormat::from_path(Path::new("x.json")), FileFormat::Json);
    }

    #[test]
    fn test_load_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.csv");
        fs::write(&path, CSV).unwrap();

        let df = load_frame(&path).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 4);
    }

    #[test]
    fn test_load_csv_gz() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(CSV.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let df = load_frame(&path).unwrap();
        assert_eq!(df.height(), 3);
        assert!(df.column("Present_Price").is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = load_frame("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, PricingError::IoError(_)));
    }

    #[test]
    fn test_save_csv_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("pred.csv");
        let mut df = df!("prediction" => &[1.5, 2.5]).unwrap();

        DataSaver::save_csv(&mut df, &path).unwrap();
        let loaded = load_frame(&path).unwrap();
        assert_eq!(loaded.height(), 2);
    }

    #[test]
    fn test_write_metrics_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output").join("metrics.json");
        let metrics = RegressionMetrics {
            r2: 1.0,
            mse: 0.0,
            mae: 0.0,
            median_absolute_error: 0.0,
            n_samples: 3,
        };
        let records = vec![
            MetricsRecord::new(Split::Train, &metrics),
            MetricsRecord::new(Split::Test, &metrics),
        ];

        write_metrics_jsonl(&path, &records).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"dataset\":\"train\""));
        assert!(lines[1].contains("\"dataset\":\"test\""));
    }
}
