/// Default number of words appended by `Generator::extend`.
pub const DEFAULT_MAX_WORDS: usize = 20;

/// Parameters controlling candidate selection and sentence extension.
///
/// # Responsibilities
/// - Track how much of the context must match (`min_preceding_match`)
/// - Track how many ranked candidates are requested (`num_to_return`)
/// - Track the extension length limit (`max_words`)
///
/// # Invariants
/// - `num_to_return` is always >= 1
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionInput {
	/// Shortest context the backoff may shrink to. `None` allows backing off
	/// down to a single word.
	pub min_preceding_match: Option<usize>,

	/// Number of top-ranked candidates to return before tie extension.
	num_to_return: usize,

	/// Maximum number of words `extend` appends to the seed.
	pub max_words: usize,
}

impl Default for PredictionInput {
	fn default() -> Self {
		Self {
			min_preceding_match: None,
			num_to_return: 1,
			max_words: DEFAULT_MAX_WORDS,
		}
	}
}

impl PredictionInput {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of requested candidates (never 0).
	pub fn num_to_return(&self) -> usize {
		self.num_to_return
	}

	/// Sets the number of requested candidates.
	///
	/// Values below 1 (including negative ones) are clamped to 1.
	pub fn set_num_to_return(&mut self, num_to_return: i64) {
		self.num_to_return = usize::try_from(num_to_return).unwrap_or(1).max(1);
	}

	pub fn with_num_to_return(mut self, num_to_return: i64) -> Self {
		self.set_num_to_return(num_to_return);
		self
	}

	/// A minimum of 0 behaves like no minimum.
	pub fn with_min_preceding_match(mut self, min_preceding_match: usize) -> Self {
		self.min_preceding_match = Some(min_preceding_match);
		self
	}

	pub fn with_max_words(mut self, max_words: usize) -> Self {
		self.max_words = max_words;
		self
	}

	/// Shortest context length the backoff loop may try.
	pub(crate) fn shortest_context(&self) -> usize {
		self.min_preceding_match.unwrap_or(1).max(1)
	}
}
