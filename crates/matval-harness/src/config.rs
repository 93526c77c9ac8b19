//! Harness configuration.
//!
//! Defaults mirror the reference deployment: a `make`-built `mainmat`
//! executable with fixtures under `validation/input` and captured output
//! under `validation/output`. Every field can be overridden from a JSON
//! config file or from CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for one harness invocation.
///
/// Relative `input_dir`, `output_dir`, and `executable` paths resolve
/// against `project_root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Project root; build/clean commands run here.
    pub project_root: PathBuf,
    /// Directory scanned for fixture files.
    pub input_dir: PathBuf,
    /// Directory receiving one output file per fixture (created if absent).
    pub output_dir: PathBuf,
    /// Target executable fed one fixture per run.
    pub executable: PathBuf,
    /// Shell command that builds the target executable.
    pub build_command: String,
    /// Shell command that removes intermediate build artifacts.
    pub clean_command: String,
    /// Literal file-name suffix that marks a fixture.
    pub fixture_extension: String,
    /// Marker inserted before the extension to form an output file name.
    pub output_marker: String,
    /// Per-fixture timeout in seconds; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            input_dir: PathBuf::from("validation/input"),
            output_dir: PathBuf::from("validation/output"),
            executable: PathBuf::from("mainmat"),
            build_command: String::from("make"),
            clean_command: String::from("make clean"),
            fixture_extension: String::from(".txt"),
            output_marker: String::from("_output"),
            timeout_secs: None,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Resolve a configured path against the project root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Input directory resolved against the project root.
    #[must_use]
    pub fn resolved_input_dir(&self) -> PathBuf {
        self.resolve(&self.input_dir)
    }

    /// Output directory resolved against the project root.
    #[must_use]
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Executable path resolved against the project root.
    #[must_use]
    pub fn resolved_executable(&self) -> PathBuf {
        self.resolve(&self.executable)
    }

    /// Per-fixture timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
