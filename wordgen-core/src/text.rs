use std::slice::Windows;

use crate::error::{ModelError, Result};

/// Splits raw text into lowercase alphabetic words.
///
/// - Converts everything to lowercase
/// - Every character that is neither alphabetic nor whitespace acts as a separator
/// - Collapses runs of whitespace
///
/// Example: `"Hello, World!  It's"` → `["hello", "world", "it", "s"]`
pub fn normalize(text: &str) -> Vec<String> {
	let cleaned: String = text
		.chars()
		.flat_map(char::to_lowercase)
		.map(|c| if c.is_alphabetic() || c.is_whitespace() { c } else { ' ' })
		.collect();

	cleaned.split_whitespace().map(str::to_owned).collect()
}

/// Sliding windows of `n` consecutive words (stride 1).
///
/// Yields nothing when there are fewer than `n` words.
///
/// # Errors
/// Returns `InvalidNgramSize` if `n == 0`.
pub fn ngrams<S>(words: &[S], n: usize) -> Result<Windows<'_, S>> {
	if n == 0 {
		return Err(ModelError::InvalidNgramSize(n));
	}
	Ok(words.windows(n))
}
