use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised by the word model, its training helpers and its persistence.
///
/// Lookup misses are not errors: they surface as `Ok(None)`.
#[derive(Debug)]
pub enum ModelError {
	/// An n-gram with fewer than two words was handed to `ingest`.
	/// `index` is its position in the rejected batch.
	NgramTooShort { index: usize, len: usize },

	/// A lookup was attempted with no preceding words.
	EmptyContext,

	/// A window or model size that cannot produce usable n-grams.
	InvalidNgramSize(usize),

	/// Two counters for different contexts were merged.
	ContextMismatch,

	/// A training worker thread panicked; its share of the counts is lost.
	WorkerPanicked(String),

	/// A named corpus has no matching file in the corpus directory.
	UnknownCorpus { name: String, dir: PathBuf },

	/// A saved model does not carry the expected header.
	Format(String),

	/// Underlying file system failure.
	Io(io::Error),

	/// Model (de)serialization failure.
	Encoding(postcard::Error),
}

impl fmt::Display for ModelError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ModelError::NgramTooShort { index, len } => {
				write!(f, "n-gram #{} has {} word(s), at least 2 are required", index, len)
			}
			ModelError::EmptyContext => write!(f, "context must contain at least one word"),
			ModelError::InvalidNgramSize(n) => write!(f, "invalid n-gram size: {}", n),
			ModelError::ContextMismatch => write!(f, "cannot merge counters of different contexts"),
			ModelError::WorkerPanicked(s) => write!(f, "training worker panicked: {}", s),
			ModelError::UnknownCorpus { name, dir } => {
				write!(f, "corpus '{}' does not exist in {}", name, dir.display())
			}
			ModelError::Format(s) => write!(f, "invalid model file: {}", s),
			ModelError::Io(e) => write!(f, "I/O error: {}", e),
			ModelError::Encoding(e) => write!(f, "model encoding error: {}", e),
		}
	}
}

impl std::error::Error for ModelError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			ModelError::Io(e) => Some(e),
			ModelError::Encoding(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for ModelError {
	fn from(e: io::Error) -> Self {
		ModelError::Io(e)
	}
}

impl From<postcard::Error> for ModelError {
	fn from(e: postcard::Error) -> Self {
		ModelError::Encoding(e)
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ModelError>;
