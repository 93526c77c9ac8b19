//! Fixture discovery and output-name derivation.

use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot list fixture directory {dir}: {source}")]
    List { dir: String, source: io::Error },
}

/// A single input fixture, identified by its file name within the input
/// directory. Split into base name and extension at the last `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    base: String,
    extension: String,
}

impl Fixture {
    /// Build a fixture from a directory-entry file name.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        match file_name.rsplit_once('.') {
            Some((base, ext)) => Self {
                base: base.to_string(),
                extension: format!(".{ext}"),
            },
            None => Self {
                base: file_name.to_string(),
                extension: String::new(),
            },
        }
    }

    /// The original file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}{}", self.base, self.extension)
    }

    /// Derived output file name: base name, then `marker`, then extension.
    ///
    /// Deterministic and lossless: the same fixture always maps to the same
    /// output name, and distinct base names map to distinct output names.
    #[must_use]
    pub fn output_file_name(&self, marker: &str) -> String {
        format!("{}{}{}", self.base, marker, self.extension)
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// List `dir` and return the fixtures whose file name ends with `extension`
/// (literal, case-sensitive suffix match).
///
/// The result is sorted by file name so processing order is stable across
/// platforms. An empty result is valid; a missing or unreadable directory
/// is an error.
pub fn discover_fixtures(dir: &Path, extension: &str) -> Result<Vec<Fixture>, DiscoveryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| DiscoveryError::List {
        dir: dir.display().to_string(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(extension))
        .collect();
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| Fixture::from_file_name(&name))
        .collect())
}
