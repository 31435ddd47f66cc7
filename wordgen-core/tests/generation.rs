//! End-to-end tests: train from files, persist, reload and generate.

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wordgen_core::model::ngram_store::NgramStore;
use wordgen_core::text::{ngrams, normalize};
use wordgen_core::{Generator, ModelError, PredictionInput, io};

fn scratch_dir(tag: &str) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("wordgen-it-{}-{}", tag, std::process::id()));
	let _ = fs::remove_dir_all(&dir);
	fs::create_dir_all(&dir).unwrap();
	dir
}

#[test]
fn reference_trigram_scenario() {
	let words = normalize("one two three one two three one two nine");
	let mut store = NgramStore::new();
	store.ingest(ngrams(&words, 3).unwrap(), true).unwrap();

	let ranked = store.likelihood_for(&["one", "two"]).unwrap().unwrap();
	let pairs: Vec<(&str, f64)> = ranked.iter().map(|l| (l.word.as_str(), l.probability)).collect();
	assert_eq!(pairs, vec![("three", 2.0 / 3.0), ("nine", 1.0 / 3.0)]);
}

#[test]
fn every_context_distribution_is_normalized() {
	let generator = Generator::train_on_text(
		"It was the best of times, it was the worst of times, it was the age of wisdom, \
		 it was the age of foolishness, it was the epoch of belief",
		4,
	)
	.unwrap();

	assert!(!generator.store().is_empty());
	for counter in generator.store().contexts() {
		let ranked = counter.ranked_likelihoods();
		let sum: f64 = ranked.iter().map(|l| l.probability).sum();
		assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
		assert!(ranked.iter().all(|l| l.probability > 0.0 && l.probability <= 1.0));
		assert!(ranked.windows(2).all(|w| w[0].probability >= w[1].probability));
	}
}

#[test]
fn train_save_load_generate() {
	let dir = scratch_dir("pipeline");
	let first = dir.join("first.txt");
	let second = dir.join("second.txt");
	fs::write(&first, "The cat sat on the mat.\nThe cat ate the rat.\n").unwrap();
	fs::write(&second, "The dog sat on the log.\n").unwrap();

	let mut generator = Generator::new();
	assert_eq!(generator.add_file(&first, 3, true).unwrap(), 9);
	assert_eq!(generator.add_file(&second, 3, true).unwrap(), 4);

	let model_path = dir.join("model.bin");
	io::save_model(&model_path, &generator).unwrap();
	let loaded = io::load_model(&model_path).unwrap();

	let input = PredictionInput::new().with_num_to_return(10);
	assert_eq!(
		loaded.candidates_for(&["sat", "on"], &input).unwrap(),
		generator.candidates_for(&["sat", "on"], &input).unwrap()
	);

	let mut rng = StdRng::seed_from_u64(42);
	let two_words = PredictionInput::new().with_max_words(2);
	let sentence = loaded.extend_with_rng("a dog sat", &two_words, &mut rng).unwrap();
	assert_eq!(sentence, "a dog sat on the");

	// "on the" is followed by "mat" and "log" once each.
	let three_words = PredictionInput::new().with_max_words(3);
	let longer = loaded.extend_with_rng("a dog sat", &three_words, &mut rng).unwrap();
	assert!(
		longer == "a dog sat on the mat" || longer == "a dog sat on the log",
		"unexpected: {}",
		longer
	);
}

#[test]
fn lines_are_one_word_stream() {
	let dir = scratch_dir("lines");
	let file = dir.join("corpus.txt");
	fs::write(&file, "alpha beta\ngamma delta\n").unwrap();

	let mut generator = Generator::new();
	generator.add_file(&file, 2, true).unwrap();
	let found = generator.candidates_for(&["beta"], &PredictionInput::default()).unwrap().unwrap();
	assert_eq!(found[0].word, "gamma");
}

#[test]
fn missing_corpus_file_fails() {
	let dir = scratch_dir("missing");
	let mut generator = Generator::new();
	let err = generator.add_file(dir.join("absent.txt"), 3, true).unwrap_err();
	assert!(matches!(err, ModelError::Io(_)));
	assert!(generator.store().is_empty());
}

#[test]
fn invalid_training_size_fails() {
	assert!(matches!(Generator::train_on_text("a b c", 1), Err(ModelError::InvalidNgramSize(1))));
	assert!(matches!(Generator::train_on_text("a b c", 0), Err(ModelError::InvalidNgramSize(0))));
}

#[test]
fn merged_generators_equal_combined_training() {
	let left = Generator::train_on_text("red fish blue fish", 2).unwrap();
	let right = Generator::train_on_text("one fish two fish", 2).unwrap();
	let mut merged = left.clone();
	merged.merge(&right).unwrap();

	let mut combined = Generator::new();
	combined.add_words(&normalize("red fish blue fish"), 2, true).unwrap();
	combined.add_words(&normalize("one fish two fish"), 2, true).unwrap();

	let input = PredictionInput::new().with_num_to_return(10);
	assert_eq!(
		merged.candidates_for(&["fish"], &input).unwrap(),
		combined.candidates_for(&["fish"], &input).unwrap()
	);
	assert_eq!(merged.store().len(), combined.store().len());
}
