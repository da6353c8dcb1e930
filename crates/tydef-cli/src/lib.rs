//! # tydef-cli: Command-Line Front End
//!
//! Provides the `tydef` command, which builds a type library from a
//! directory of resource files and reports on it.
//!
//! ## Subcommands
//!
//! - `tydef check`: build the library and report every problem.
//! - `tydef schema`: print the compiled JSON Schema of one type.
//! - `tydef validate`: validate a value file against one type.
//!
//! ```bash
//! tydef check --resources resources
//! tydef schema --resources resources test/person
//! tydef validate --resources resources test/person person.yaml
//! ```
//!
//! Every subcommand exits 0 on success, 1 when definitions or values fail
//! validation, and 2 on operational errors such as unreadable files.

pub mod check;
pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tydef_schema::{LibraryError, LibraryOptions, TypeLibrary};

/// File extensions recognised as resources.
pub const RESOURCE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Recursively find every resource file under `dir`, sorted by path.
///
/// # Errors
///
/// Fails if `dir` is not a directory or cannot be read.
pub fn find_resource_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("resource directory not found: {}", dir.display());
    }
    let mut files = Vec::new();
    collect_resource_files(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_resource_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read entry in {}", dir.display()))?
            .path();
        if path.is_dir() {
            collect_resource_files(&path, files)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| RESOURCE_EXTENSIONS.contains(&e))
        {
            files.push(path);
        }
    }
    Ok(())
}

/// Read every resource under `dir`, paired with its path.
///
/// # Errors
///
/// Fails on the first unreadable file.
pub fn load_resources(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    find_resource_files(dir)?
        .into_iter()
        .map(|path| -> Result<(PathBuf, String)> {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok((path, text))
        })
        .collect()
}

/// Load build options from a YAML file, or the defaults when none is given.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a valid options document.
pub fn load_options(config: Option<&Path>) -> Result<LibraryOptions> {
    let Some(path) = config else {
        return Ok(LibraryOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(LibraryOptions::default());
    }
    serde_yaml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// The outcome of building a library from disk.
///
/// Build errors are a validation outcome, not an operational failure, so
/// they are returned alongside the paths that produced them rather than as
/// an `Err`.
pub enum Loaded {
    /// The library built.
    Library(TypeLibrary),
    /// The definitions are invalid.
    Invalid {
        /// The build error.
        error: LibraryError,
        /// Resource paths, in the order they were passed to the build.
        paths: Vec<PathBuf>,
    },
}

/// Read resources and options and build the library.
///
/// # Errors
///
/// Fails only on I/O and configuration errors.
pub fn load_library(resources: &Path, config: Option<&Path>) -> Result<Loaded> {
    let options = load_options(config)?;
    let (paths, texts): (Vec<PathBuf>, Vec<String>) =
        load_resources(resources)?.into_iter().unzip();
    tracing::info!(
        resources = texts.len(),
        dir = %resources.display(),
        "loaded resource files"
    );
    match TypeLibrary::build(&texts, options) {
        Ok(library) => Ok(Loaded::Library(library)),
        Err(error) => Ok(Loaded::Invalid { error, paths }),
    }
}

/// Print a build error, naming the file for errors that carry an index.
pub fn report_build_error(error: &LibraryError, paths: &[PathBuf]) {
    match error {
        LibraryError::Parse { index, .. } => {
            let path = paths
                .get(*index)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| format!("resource {index}"));
            println!("FAIL: {path}: {error}");
        }
        _ => println!("FAIL: {error}"),
    }
}
