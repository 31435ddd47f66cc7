use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered sequence of preceding words identifying a context.
///
/// Keys compare structurally, word by word, so two different contexts can
/// never collide regardless of what characters their words contain.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey(Vec<String>);

impl ContextKey {
	/// Builds a key from any sequence of words.
	pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
		Self(words.iter().map(|w| w.as_ref().to_owned()).collect())
	}

	/// Words of the context, oldest first.
	pub fn words(&self) -> &[String] {
		&self.0
	}

	/// Number of words in the context.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for ContextKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}]", self.0.join(" "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keys_are_structural() {
		// A joined-string key would make these two equal ("a_b_c").
		let a = ContextKey::new(&["a_b", "c"]);
		let b = ContextKey::new(&["a", "b_c"]);
		assert_ne!(a, b);
		assert_eq!(a, ContextKey::new(&["a_b".to_owned(), "c".to_owned()]));
	}

	#[test]
	fn display_lists_words() {
		assert_eq!(ContextKey::new(&["one", "two"]).to_string(), "[one two]");
	}
}
