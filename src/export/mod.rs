//! Model persistence module

pub mod model_store;

pub use model_store::{ModelStore, StoredModel, FORMAT_VERSION};
