use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::io;
use crate::model::context_counter::WordLikelihood;
use crate::model::ngram_store::NgramStore;
use crate::model::prediction_input::PredictionInput;
use crate::text;

/// Leading bytes of a saved model.
const MAGIC: [u8; 4] = *b"WGEN";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

/// High-level word generator backed by one n-gram store.
///
/// # Responsibilities
/// - Train from text, files, or ready-made n-gram batches, accumulating
///   every source into the same store
/// - Select next-word candidates with backoff and tie-aware ranking
/// - Extend a seed phrase word by word
/// - Encode/decode itself for persistence
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Generator {
	store: NgramStore,
}

impl Generator {
	/// Creates a generator with an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a generator from a first batch of n-grams.
	pub fn from_ngrams<I, G, S>(ngrams: I, include_shorter_contexts: bool) -> Result<Self>
	where
		I: IntoIterator<Item = G>,
		G: AsRef<[S]>,
		S: AsRef<str>,
	{
		let mut generator = Self::new();
		generator.merge_source(ngrams, include_shorter_contexts)?;
		Ok(generator)
	}

	/// Normalizes `text` and trains a new generator on its `ngram_size`-grams,
	/// with shorter contexts included.
	pub fn train_on_text(text: &str, ngram_size: usize) -> Result<Self> {
		let mut generator = Self::new();
		generator.add_words(&text::normalize(text), ngram_size, true)?;
		Ok(generator)
	}

	/// Read-only access to the underlying store.
	pub fn store(&self) -> &NgramStore {
		&self.store
	}

	/// Adds another batch of n-grams to this generator's store.
	///
	/// Returns the number of n-grams ingested.
	///
	/// # Errors
	/// Returns `NgramTooShort` if any n-gram has fewer than 2 words; the
	/// store is left untouched in that case.
	pub fn merge_source<I, G, S>(&mut self, ngrams: I, include_shorter_contexts: bool) -> Result<usize>
	where
		I: IntoIterator<Item = G>,
		G: AsRef<[S]>,
		S: AsRef<str>,
	{
		self.store.ingest(ngrams, include_shorter_contexts)
	}

	/// Adds every `ngram_size`-gram of an already normalized word stream.
	///
	/// Returns the number of n-grams ingested.
	///
	/// # Errors
	/// Returns `InvalidNgramSize` if `ngram_size < 2`.
	pub fn add_words(
		&mut self,
		words: &[String],
		ngram_size: usize,
		include_shorter_contexts: bool,
	) -> Result<usize> {
		let partial = NgramStore::from_words(words, ngram_size, include_shorter_contexts)?;
		self.store.merge(&partial)?;
		Ok((words.len() + 1).saturating_sub(ngram_size))
	}

	/// Reads a plain text file and adds its `ngram_size`-grams.
	///
	/// The whole file is one word stream: n-grams span line breaks.
	pub fn add_file<P: AsRef<Path>>(
		&mut self,
		filepath: P,
		ngram_size: usize,
		include_shorter_contexts: bool,
	) -> Result<usize> {
		let words = io::read_words(&filepath)?;
		let count = self.add_words(&words, ngram_size, include_shorter_contexts)?;
		log::info!(
			"trained on {}: {} {}-grams, {} contexts in model",
			filepath.as_ref().display(),
			count,
			ngram_size,
			self.store.len()
		);
		Ok(count)
	}

	/// Merges another generator into this one, summing counts.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		self.store.merge(&other.store)
	}

	/// Returns the most likely next words after `context`.
	///
	/// # Behavior
	/// - Looks up the full context first. On a miss, drops the oldest word and
	///   retries until a match is found or the context would become shorter
	///   than `input.min_preceding_match` (or empty when unset).
	/// - Keeps the `input.num_to_return()` best entries, then every following
	///   entry with the same probability as the last kept one. Ties are never
	///   split.
	///
	/// Returns `Ok(None)` when no suffix of the context was ever observed.
	///
	/// # Errors
	/// Returns `EmptyContext` if `context` has no words.
	pub fn candidates_for<S: AsRef<str>>(
		&self,
		context: &[S],
		input: &PredictionInput,
	) -> Result<Option<Vec<WordLikelihood>>> {
		if context.is_empty() {
			return Err(ModelError::EmptyContext);
		}

		let shortest = input.shortest_context();
		let mut start = 0;
		let mut ranked = loop {
			let window = &context[start..];
			if window.len() < shortest {
				log::debug!("no context of at least {} word(s) matched", shortest);
				return Ok(None);
			}
			if let Some(ranked) = self.store.likelihood_for(window)? {
				if start > 0 {
					log::debug!("backed off {} word(s) to a {}-word context", start, window.len());
				}
				break ranked;
			}
			start += 1;
		};

		let mut end = input.num_to_return().min(ranked.len());
		if end > 0 {
			let cutoff = ranked[end - 1].probability;
			while end < ranked.len() && ranked[end].probability == cutoff {
				end += 1;
			}
		}
		ranked.truncate(end);

		Ok(Some(ranked))
	}

	/// Extends `seed` by up to `input.max_words` words using the thread RNG.
	///
	/// See [`Generator::extend_with_rng`].
	pub fn extend(&self, seed: &str, input: &PredictionInput) -> Result<String> {
		self.extend_with_rng(seed, input, &mut rand::rng())
	}

	/// Extends `seed` by up to `input.max_words` words.
	///
	/// # Behavior
	/// - Normalizes the seed into words.
	/// - At each step, asks for the best candidates given every word so far
	///   and appends one of them chosen uniformly with `rng`.
	/// - Stops early when no candidate exists.
	///
	/// Only the single best word (or every word tied for best) is ever a
	/// candidate: `input.num_to_return()` is ignored here, while
	/// `input.min_preceding_match` still bounds the backoff.
	///
	/// Returns the normalized seed and the appended words, space-separated.
	/// A seed without any word yields an empty string.
	pub fn extend_with_rng<R: Rng>(
		&self,
		seed: &str,
		input: &PredictionInput,
		rng: &mut R,
	) -> Result<String> {
		let mut words = text::normalize(seed);
		if words.is_empty() {
			log::warn!("seed '{}' contains no words, nothing to extend", seed);
			return Ok(String::new());
		}

		let best_only = input.clone().with_num_to_return(1);
		for step in 0..input.max_words {
			let candidates = match self.candidates_for(&words, &best_only)? {
				Some(candidates) if !candidates.is_empty() => candidates,
				_ => {
					log::debug!("stopped after {} word(s): no candidate", step);
					break;
				}
			};

			let chosen = &candidates[rng.random_range(0..candidates.len())];
			log::debug!("picked '{}' among {} candidate(s)", chosen.word, candidates.len());
			words.push(chosen.word.clone());
		}

		Ok(words.join(" "))
	}

	/// Encodes the generator into a self-describing byte buffer.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut bytes = Vec::with_capacity(HEADER_LEN);
		bytes.extend_from_slice(&MAGIC);
		bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
		bytes.extend(postcard::to_stdvec(self)?);
		Ok(bytes)
	}

	/// Decodes a generator produced by [`Generator::to_bytes`].
	///
	/// # Errors
	/// Returns `Format` on a missing or unknown header, `Encoding` on a
	/// corrupt body.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		if bytes.len() < HEADER_LEN || bytes[..4] != MAGIC {
			return Err(ModelError::Format("missing model header".to_owned()));
		}

		let mut version = [0u8; 4];
		version.copy_from_slice(&bytes[4..HEADER_LEN]);
		let version = u32::from_le_bytes(version);
		if version != FORMAT_VERSION {
			return Err(ModelError::Format(format!(
				"unsupported version {}, expected {}",
				version, FORMAT_VERSION
			)));
		}

		Ok(postcard::from_bytes(&bytes[HEADER_LEN..])?)
	}
}
