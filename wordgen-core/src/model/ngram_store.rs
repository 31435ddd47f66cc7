use std::collections::HashMap;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};

use super::context_counter::{ContextCounter, WordLikelihood};
use super::context_key::ContextKey;
use crate::error::{ModelError, Result};

/// Windows handed to each training thread are never smaller than this.
const MIN_CHUNK_WINDOWS: usize = 4096;

/// Word-level n-gram store.
///
/// Maps every observed context (one or more preceding words) to the counter
/// of words that followed it.
///
/// # Responsibilities
/// - Ingest batches of n-grams, optionally fanning each one out into all of
///   its shorter contexts
/// - Answer exact-match "what follows this context?" lookups
/// - Merge with another store (parallel training, combining corpora)
///
/// # Invariants
/// - Each key is unique and was derived from at least one ingested n-gram
/// - Keys may have different lengths when fan-out is enabled
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct NgramStore {
	counters: HashMap<ContextKey, ContextCounter>,
}

impl NgramStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.counters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counters.is_empty()
	}

	/// Iterates over every stored counter, in no particular order.
	pub fn contexts(&self) -> impl Iterator<Item = &ContextCounter> {
		self.counters.values()
	}

	/// Returns the counter for an exact context, if observed.
	pub fn counter<S: AsRef<str>>(&self, context: &[S]) -> Option<&ContextCounter> {
		self.counters.get(&ContextKey::new(context))
	}

	/// Adds a batch of n-grams to the store.
	///
	/// The last word of each n-gram is the observed next word, the words
	/// before it form the context. With `include_shorter_contexts`, the
	/// observation is also registered under every non-empty prefix of the
	/// context, so `[a, b, c] -> d` also counts for `[a, b]` and `[a]`.
	///
	/// The batch is all-or-nothing: it is validated before the store is
	/// touched.
	///
	/// Returns the number of n-grams ingested.
	///
	/// # Errors
	/// Returns `NgramTooShort` if any n-gram has fewer than 2 words.
	pub fn ingest<I, G, S>(&mut self, ngrams: I, include_shorter_contexts: bool) -> Result<usize>
	where
		I: IntoIterator<Item = G>,
		G: AsRef<[S]>,
		S: AsRef<str>,
	{
		let batch: Vec<G> = ngrams.into_iter().collect();
		for (index, gram) in batch.iter().enumerate() {
			let len = gram.as_ref().len();
			if len < 2 {
				return Err(ModelError::NgramTooShort { index, len });
			}
		}

		for gram in &batch {
			self.observe(gram.as_ref(), include_shorter_contexts);
		}

		Ok(batch.len())
	}

	/// Registers one validated n-gram (length >= 2).
	fn observe<S: AsRef<str>>(&mut self, gram: &[S], include_shorter_contexts: bool) {
		let (observed, context) = match gram.split_last() {
			Some(split) => split,
			None => return,
		};
		let observed = observed.as_ref();

		let shortest = if include_shorter_contexts { 1 } else { context.len() };
		for len in shortest..=context.len() {
			let key = ContextKey::new(&context[..len]);
			self.counters
				.entry(key)
				.or_insert_with_key(|key| ContextCounter::new(key.clone()))
				.observe(observed);
		}
	}

	/// Ranked next-word likelihoods for an exact context.
	///
	/// No backoff happens here: `Ok(None)` means this exact context was
	/// never observed.
	///
	/// # Errors
	/// Returns `EmptyContext` if `context` has no words.
	pub fn likelihood_for<S: AsRef<str>>(&self, context: &[S]) -> Result<Option<Vec<WordLikelihood>>> {
		if context.is_empty() {
			return Err(ModelError::EmptyContext);
		}
		Ok(self.counter(context).map(ContextCounter::ranked_likelihoods))
	}

	/// Merges another store into this one.
	///
	/// Counters present in both are summed, the others are cloned.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		for (key, counter) in &other.counters {
			if let Some(existing) = self.counters.get_mut(key) {
				existing.merge(counter)?;
			} else {
				self.counters.insert(key.clone(), counter.clone());
			}
		}
		Ok(())
	}

	/// Builds a store from a flat word stream using windows of `n` words.
	///
	/// The windows are split into ranges, each range is ingested into a
	/// partial store on its own thread, and the partial stores are merged.
	/// Ranges overlap by `n - 1` words so every window is counted exactly once.
	///
	/// # Errors
	/// Returns `InvalidNgramSize` if `n < 2`, `WorkerPanicked` if a training
	/// thread died before delivering its partial store.
	pub fn from_words(words: &[String], n: usize, include_shorter_contexts: bool) -> Result<Self> {
		if n < 2 {
			return Err(ModelError::InvalidNgramSize(n));
		}
		if words.len() < n {
			log::warn!("only {} word(s) available, no {}-gram can be built", words.len(), n);
			return Ok(Self::new());
		}

		let windows = words.len() - n + 1;
		let chunks = num_cpus::get() * 8;
		let chunk_size = windows.div_ceil(chunks).max(MIN_CHUNK_WINDOWS);

		let (tx, rx) = mpsc::channel();
		let mut handles = Vec::new();
		let mut start = 0;
		while start < windows {
			let end = (start + chunk_size).min(windows);
			let tx = tx.clone();
			// Window i spans words[i..i + n].
			let chunk: Vec<String> = words[start..end + n - 1].to_vec();

			handles.push(thread::spawn(move || {
				let mut partial = NgramStore::new();
				for gram in chunk.windows(n) {
					partial.observe(gram, include_shorter_contexts);
				}
				// The receiver only goes away if the merge below already failed.
				let _ = tx.send(partial);
			}));
			start = end;
		}
		drop(tx);

		let mut store = NgramStore::new();
		for partial in rx.iter() {
			store.merge(&partial)?;
		}
		join_workers(handles)?;

		log::debug!("built {} contexts from {} {}-grams", store.len(), windows, n);
		Ok(store)
	}
}

/// Waits for every training thread and reports the first panic.
fn join_workers(handles: Vec<JoinHandle<()>>) -> Result<()> {
	let mut failure = None;
	for handle in handles {
		if let Err(payload) = handle.join() {
			let message = payload
				.downcast_ref::<&str>()
				.map(|s| (*s).to_owned())
				.or_else(|| payload.downcast_ref::<String>().cloned())
				.unwrap_or_else(|| "unknown panic".to_owned());
			failure.get_or_insert(message);
		}
	}

	match failure {
		Some(message) => Err(ModelError::WorkerPanicked(message)),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::text::{ngrams, normalize};

	fn words(s: &str) -> Vec<String> {
		normalize(s)
	}

	fn store_from(text: &str, n: usize, include_shorter: bool) -> NgramStore {
		let w = words(text);
		let mut store = NgramStore::new();
		store.ingest(ngrams(&w, n).unwrap(), include_shorter).unwrap();
		store
	}

	fn ranked_words(ranked: &[WordLikelihood]) -> Vec<&str> {
		ranked.iter().map(|l| l.word.as_str()).collect()
	}

	#[test]
	fn likelihood_of_observed_context() {
		let store = store_from("one two three one two three one two nine a b c b c d", 3, true);

		let ranked = store.likelihood_for(&["one", "two"]).unwrap().unwrap();
		assert_eq!(ranked.len(), 2);
		assert_eq!(ranked[0].word, "three");
		assert_eq!(ranked[0].probability, 2.0 / 3.0);
		assert_eq!(ranked[1].word, "nine");
		assert_eq!(ranked[1].probability, 1.0 / 3.0);

		assert!(store.likelihood_for(&["one", "two", "three"]).unwrap().is_none());
		assert!(store.likelihood_for(&["one", "three"]).unwrap().is_none());
	}

	#[test]
	fn empty_context_is_rejected() {
		let store = store_from("one two three", 3, true);
		let empty: [&str; 0] = [];
		assert!(matches!(store.likelihood_for(&empty), Err(ModelError::EmptyContext)));
	}

	#[test]
	fn fan_out_registers_every_prefix() {
		let mut store = NgramStore::new();
		store.ingest([["a", "b", "c", "d"]], true).unwrap();

		for context in [&["a", "b", "c"][..], &["a", "b"][..], &["a"][..]] {
			let ranked = store.likelihood_for(context).unwrap().unwrap();
			assert_eq!(ranked_words(&ranked), vec!["d"]);
		}
		assert_eq!(store.len(), 3);
		// Suffixes are not prefixes.
		assert!(store.likelihood_for(&["b", "c"]).unwrap().is_none());
	}

	#[test]
	fn without_fan_out_only_full_context_is_stored() {
		let mut store = NgramStore::new();
		store.ingest([["a", "b", "c", "d"]], false).unwrap();

		assert!(store.likelihood_for(&["a", "b", "c"]).unwrap().is_some());
		assert!(store.likelihood_for(&["a", "b"]).unwrap().is_none());
		assert!(store.likelihood_for(&["a"]).unwrap().is_none());
		assert_eq!(store.len(), 1);
	}

	#[test]
	fn short_ngram_fails_whole_batch() {
		let mut store = NgramStore::new();
		let batch: Vec<Vec<&str>> = vec![vec!["a", "b"], vec!["c"], vec!["d", "e"]];

		match store.ingest(batch, true) {
			Err(ModelError::NgramTooShort { index, len }) => {
				assert_eq!(index, 1);
				assert_eq!(len, 1);
			}
			other => panic!("expected NgramTooShort, got {:?}", other),
		}
		// Nothing from the rejected batch was committed.
		assert!(store.is_empty());
	}

	#[test]
	fn unigrams_are_rejected() {
		let w = words("one two three");
		let mut store = NgramStore::new();
		assert!(store.ingest(ngrams(&w, 1).unwrap(), true).is_err());
		assert!(store.is_empty());
	}

	#[test]
	fn ingest_reports_count() {
		let w = words("a b c d e");
		let mut store = NgramStore::new();
		assert_eq!(store.ingest(ngrams(&w, 2).unwrap(), true).unwrap(), 4);
		let none: Vec<[&str; 2]> = Vec::new();
		assert_eq!(store.ingest(none, true).unwrap(), 0);
	}

	#[test]
	fn separator_characters_do_not_collide() {
		let mut store = NgramStore::new();
		store.ingest([["a_b", "c", "x"], ["a", "b_c", "y"]], false).unwrap();
		let first = store.likelihood_for(&["a_b", "c"]).unwrap().unwrap();
		let second = store.likelihood_for(&["a", "b_c"]).unwrap().unwrap();
		assert_eq!(ranked_words(&first), vec!["x"]);
		assert_eq!(ranked_words(&second), vec!["y"]);
	}

	#[test]
	fn merge_sums_and_adds_contexts() {
		let mut a = store_from("one two three", 3, true);
		let b = store_from("one two nine red fish", 3, true);
		a.merge(&b).unwrap();

		let ranked = a.likelihood_for(&["one", "two"]).unwrap().unwrap();
		assert_eq!(ranked_words(&ranked), vec!["nine", "three"]);
		assert!(a.likelihood_for(&["nine", "red"]).unwrap().is_some());
	}

	#[test]
	fn from_words_matches_sequential_ingest() {
		let text = "the cat sat on the mat and the cat ate the rat ".repeat(2000);
		let w = words(&text);

		let parallel = NgramStore::from_words(&w, 3, true).unwrap();
		let sequential = store_from(&text, 3, true);

		assert_eq!(parallel.len(), sequential.len());
		for counter in sequential.contexts() {
			let other = parallel.counter(counter.context().words()).unwrap();
			assert_eq!(other.total_observations(), counter.total_observations());
			assert_eq!(other.ranked_likelihoods(), counter.ranked_likelihoods());
		}
	}

	#[test]
	fn panicking_worker_is_reported() {
		let handles = vec![
			thread::spawn(|| {}),
			thread::spawn(|| panic!("worker ran out of words")),
			thread::spawn(|| {}),
		];
		match join_workers(handles) {
			Err(ModelError::WorkerPanicked(message)) => {
				assert_eq!(message, "worker ran out of words")
			}
			other => panic!("expected WorkerPanicked, got {:?}", other),
		}
	}

	#[test]
	fn finished_workers_join_cleanly() {
		let handles = (0..4).map(|_| thread::spawn(|| {})).collect();
		assert!(join_workers(handles).is_ok());
	}

	#[test]
	fn from_words_edge_cases() {
		let w = words("just two");
		assert!(matches!(NgramStore::from_words(&w, 1, true), Err(ModelError::InvalidNgramSize(1))));
		assert!(NgramStore::from_words(&w, 3, true).unwrap().is_empty());
		assert_eq!(NgramStore::from_words(&w, 2, true).unwrap().len(), 1);
	}
}
