use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use crate::error::{ModelError, Result};
use crate::model::generator::Generator;
use crate::text::normalize;

/// Extension of named corpus files.
pub const CORPUS_EXTENSION: &str = "txt";

/// Default file a trained model is saved to.
pub const DEFAULT_MODEL_PATH: &str = "ngram_model.bin";

/// Reads a text file and returns its normalized words, in order.
///
/// - Reads the entire file into memory
/// - Lines are normalized one by one and concatenated
pub fn read_words<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().flat_map(normalize).collect())
}

/// Writes an encoded generator to `path`, replacing any existing file.
pub fn save_model<P: AsRef<Path>>(path: P, generator: &Generator) -> Result<()> {
	let bytes = generator.to_bytes()?;
	fs::write(&path, &bytes)?;
	log::info!("saved model to {} ({} bytes)", path.as_ref().display(), bytes.len());
	Ok(())
}

/// Reads a generator previously written by [`save_model`].
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Generator> {
	let bytes = fs::read(&path)?;
	let generator = Generator::from_bytes(&bytes)?;
	log::info!(
		"loaded model from {} ({} contexts)",
		path.as_ref().display(),
		generator.store().len()
	);
	Ok(generator)
}

/// Deletes a saved model.
///
/// Returns `true` if a file was removed. A missing file is not an error.
pub fn delete_model<P: AsRef<Path>>(path: P) -> io::Result<bool> {
	match fs::remove_file(&path) {
		Ok(()) => {
			log::info!("deleted model {}", path.as_ref().display());
			Ok(true)
		}
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
		Err(e) => Err(e),
	}
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/brown.txt"` → `"brown"`
/// - `"brown.txt"` → `"brown"`
fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder<P: AsRef<Path>>(input: P) -> PathBuf {
	let input = input.as_ref();
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists all files with a given extension in a directory.
fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			files.push(path);
		}
	}

	Ok(files)
}

/// Names of the corpora available in `dir`, sorted.
pub fn list_corpora<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	let mut names = list_files(normalize_folder(dir), CORPUS_EXTENSION)?
		.iter()
		.map(get_filename)
		.collect::<io::Result<Vec<_>>>()?;
	names.sort();
	Ok(names)
}

/// Path of the named corpus `<dir>/<name>.txt`.
///
/// # Errors
/// Returns `UnknownCorpus` if no such file exists.
pub fn resolve_corpus<P: AsRef<Path>>(dir: P, name: &str) -> Result<PathBuf> {
	let folder = normalize_folder(dir);
	let path = folder.join(format!("{}.{}", name, CORPUS_EXTENSION));
	// Names are plain file stems, never paths.
	let plain = !name.is_empty() && Path::new(name).file_name() == Some(std::ffi::OsStr::new(name));

	if plain && path.is_file() {
		Ok(path)
	} else {
		Err(ModelError::UnknownCorpus { name: name.to_owned(), dir: folder })
	}
}
