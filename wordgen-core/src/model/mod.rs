//! Top-level module for the word model.
//!
//! Composed bottom-up:
//! - Per-context next-word counts (`ContextCounter`)
//! - The context → counter store (`NgramStore`)
//! - Candidate selection parameters (`PredictionInput`)
//! - The high-level backoff generator (`Generator`)

/// Backoff candidate selection, seed extension, training and encoding.
pub mod generator;

/// Mapping from every observed context to its counter.
///
/// Handles batch ingestion, shorter-context fan-out, exact lookups,
/// merging and parallel construction from a word stream.
pub mod ngram_store;

/// Next-word counts for a single context and their ranking.
pub mod context_counter;

/// Structural context key (ordered preceding words).
pub mod context_key;

/// Candidate selection and extension parameters.
pub mod prediction_input;
