use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::context_key::ContextKey;
use crate::error::{ModelError, Result};

/// A candidate next word together with its relative frequency.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WordLikelihood {
	pub word: String,
	/// `count / total` for the owning context, in `(0, 1]`.
	pub probability: f64,
}

/// Next-word counts observed after one fixed context.
///
/// Conceptually a node of the backoff model: every word seen right after
/// `context` is an outgoing edge weighted by its number of observations.
///
/// ## Responsibilities:
/// - Accumulate next-word observations during training
/// - Rank observed words by relative frequency
/// - Merge with another counter of the same context (parallel training)
///
/// ## Invariants
/// - `total_observations` equals the sum of `next_word_counts`
/// - Each count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ContextCounter {
	/// Context these observations follow. Kept for diagnostics and merge checks.
	context: ContextKey,
	/// Example: { "three" => 2, "nine" => 1 }
	next_word_counts: HashMap<String, usize>,
	total_observations: usize,
}

impl ContextCounter {
	/// Creates an empty counter for the given context.
	pub fn new(context: ContextKey) -> Self {
		Self {
			context,
			next_word_counts: HashMap::new(),
			total_observations: 0,
		}
	}

	pub fn context(&self) -> &ContextKey {
		&self.context
	}

	pub fn total_observations(&self) -> usize {
		self.total_observations
	}

	/// Number of times `word` followed this context.
	pub fn count_of(&self, word: &str) -> usize {
		self.next_word_counts.get(word).copied().unwrap_or(0)
	}

	/// Records one occurrence of `word` after this context.
	pub fn observe(&mut self, word: &str) {
		match self.next_word_counts.get_mut(word) {
			Some(count) => *count += 1,
			None => {
				self.next_word_counts.insert(word.to_owned(), 1);
			}
		}
		self.total_observations += 1;
	}

	/// Every observed word with its probability, most likely first.
	///
	/// Words with equal counts are ordered lexically so the ranking is
	/// reproducible. Returns an empty vector if nothing was observed.
	pub fn ranked_likelihoods(&self) -> Vec<WordLikelihood> {
		if self.total_observations == 0 {
			return Vec::new();
		}

		let mut ranked: Vec<(&String, usize)> =
			self.next_word_counts.iter().map(|(word, count)| (word, *count)).collect();
		// Sorting on the integer counts keeps ties exact.
		ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

		let total = self.total_observations as f64;
		ranked
			.into_iter()
			.map(|(word, count)| WordLikelihood {
				word: word.clone(),
				probability: count as f64 / total,
			})
			.collect()
	}

	/// Merges another counter into this one, summing counts.
	///
	/// # Errors
	/// Returns `ContextMismatch` if the contexts differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.context != other.context {
			return Err(ModelError::ContextMismatch);
		}

		for (word, count) in &other.next_word_counts {
			*self.next_word_counts.entry(word.clone()).or_insert(0) += *count;
		}
		self.total_observations += other.total_observations;

		Ok(())
	}
}
