//! Command line front end: train, persist and query a backoff word model.
//!
//! Usage: wordgen -f corpus.txt -n 3 -s "the cat" -l 10

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, CommandFactory, Parser};
use wordgen_core::io::{self, DEFAULT_MODEL_PATH};
use wordgen_core::model::prediction_input::DEFAULT_MAX_WORDS;
use wordgen_core::{Generator, PredictionInput};

const DEFAULT_NGRAM_SIZE: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "wordgen")]
#[command(about = "Generate sentence continuations with a backoff n-gram word model")]
#[command(version)]
#[command(group(ArgGroup::new("retrain").args(["retrain_file", "retrain_corpus"]).multiple(true)))]
struct Cli {
	/// Delete the saved model before doing anything else
	#[arg(short = 'd', long)]
	delete_model: bool,

	/// Retrain using a plain text file (repeatable)
	#[arg(short = 'f', long, value_name = "PATH")]
	retrain_file: Vec<PathBuf>,

	/// Retrain using a named corpus from the corpus directory (repeatable)
	#[arg(short = 'c', long, value_name = "NAME")]
	retrain_corpus: Vec<String>,

	/// Size of the n-grams used for training [default: 3]
	#[arg(
		short = 'n',
		long,
		requires = "retrain",
		value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..)
	)]
	ngram_size: Option<usize>,

	/// Only count full-length contexts while training
	#[arg(long, requires = "retrain")]
	no_shorter_contexts: bool,

	/// Predict words starting with this seed string
	#[arg(short, long)]
	seed: Option<String>,

	/// Limit the number of predicted words
	#[arg(short, long, default_value_t = DEFAULT_MAX_WORDS)]
	limit: usize,

	/// Print the ranked candidates for the seed instead of extending it (values below 1 mean 1)
	#[arg(long, value_name = "N", requires = "seed", allow_negative_numbers = true)]
	candidates: Option<i64>,

	/// Minimum number of seed words that must match a stored context
	#[arg(long, value_name = "N", requires = "seed")]
	min_match: Option<usize>,

	/// Saved model location
	#[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
	model: PathBuf,

	/// Directory holding named corpora (<name>.txt)
	#[arg(long, default_value = "./data")]
	corpus_dir: PathBuf,

	/// List the named corpora and exit
	#[arg(long)]
	list_corpora: bool,

	/// Increase log verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Trains one generator on every requested file and named corpus.
fn retrain(cli: &Cli) -> Result<Generator> {
	let ngram_size = cli.ngram_size.unwrap_or(DEFAULT_NGRAM_SIZE);
	let include_shorter = !cli.no_shorter_contexts;
	let mut generator = Generator::new();

	for path in &cli.retrain_file {
		generator
			.add_file(path, ngram_size, include_shorter)
			.with_context(|| format!("file '{}' cannot be used for training", path.display()))?;
	}

	for name in &cli.retrain_corpus {
		let path = io::resolve_corpus(&cli.corpus_dir, name)?;
		generator
			.add_file(&path, ngram_size, include_shorter)
			.with_context(|| format!("corpus '{}' cannot be used for training", name))?;
	}

	log::info!("model holds {} contexts", generator.store().len());
	Ok(generator)
}

/// Generation parameters requested on the command line.
fn prediction_input(cli: &Cli) -> PredictionInput {
	let mut input = PredictionInput::new().with_max_words(cli.limit);
	if let Some(num_to_return) = cli.candidates {
		input.set_num_to_return(num_to_return);
	}
	input.min_preceding_match = cli.min_match;
	input
}

fn print_candidates(generator: &Generator, seed: &str, input: &PredictionInput) -> Result<()> {
	let words = wordgen_core::text::normalize(seed);
	if words.is_empty() {
		anyhow::bail!("seed '{}' contains no words", seed);
	}

	match generator.candidates_for(&words, input)? {
		Some(candidates) => {
			for candidate in candidates {
				println!("{}\t{:.6}", candidate.word, candidate.probability);
			}
		}
		None => println!("no candidates for '{}'", words.join(" ")),
	}
	Ok(())
}

fn main() -> Result<()> {
	if std::env::args_os().len() <= 1 {
		Cli::command().print_help()?;
		return Ok(());
	}

	let cli = Cli::parse();
	init_logging(cli.verbose);

	if cli.list_corpora {
		let names = io::list_corpora(&cli.corpus_dir)
			.with_context(|| format!("cannot list corpora in '{}'", cli.corpus_dir.display()))?;
		for name in names {
			println!("{}", name);
		}
		return Ok(());
	}

	if cli.delete_model {
		io::delete_model(&cli.model)
			.with_context(|| format!("cannot delete model '{}'", cli.model.display()))?;
	}

	let mut generator = None;
	if !cli.retrain_file.is_empty() || !cli.retrain_corpus.is_empty() {
		let trained = retrain(&cli)?;
		io::save_model(&cli.model, &trained)
			.with_context(|| format!("cannot save model to '{}'", cli.model.display()))?;
		generator = Some(trained);
	}

	if let Some(seed) = &cli.seed {
		let generator = match generator {
			Some(generator) => generator,
			None => io::load_model(&cli.model).with_context(|| {
				format!(
					"no usable model at '{}', retrain the model and try again",
					cli.model.display()
				)
			})?,
		};

		let input = prediction_input(&cli);
		match cli.candidates {
			Some(_) => print_candidates(&generator, seed, &input)?,
			None => println!("{}", generator.extend(seed, &input)?),
		}
	}

	Ok(())
}
