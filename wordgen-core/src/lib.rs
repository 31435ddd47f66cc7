//! Backoff n-gram word generation library.
//!
//! This crate provides a word-level n-gram model including:
//! - Next-word counting per preceding context, with shorter-context fan-out
//! - Backoff lookup from long contexts to short ones, with tie-aware ranking
//! - Seed phrase extension with a pluggable random source
//! - Text normalization, training from files and model persistence

/// Errors shared by every module.
pub mod error;

/// Core n-gram store and generation logic.
pub mod model;

/// Text normalization and sliding-window n-gram extraction.
pub mod text;

/// File helpers: corpus reading, named corpora, model save/load/delete.
pub mod io;

pub use error::{ModelError, Result};
pub use model::context_counter::WordLikelihood;
pub use model::generator::Generator;
pub use model::prediction_input::PredictionInput;
