//! Utility functions and types

pub mod data_loader;

pub use data_loader::{load_frame, write_metrics_jsonl, DataLoader, DataSaver, FileFormat};
