//! Hyperparameter search module
//!
//! Tunes the number of selected features by exhaustive, cross-validated
//! grid search and refits the winning pipeline on the full training set.

mod config;
pub mod grid_search;

pub use config::{Scoring, SearchConfig};
pub use grid_search::{CandidateResult, GridSearch, SearchResult};
