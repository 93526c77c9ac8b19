//! Build-step invocation with explicit outcomes.
//!
//! The build and clean commands are a best-effort setup step. Exit statuses
//! are surfaced to the caller instead of being judged here, so the caller
//! decides whether a failed build aborts the run or the harness proceeds
//! against whatever executable is already on disk.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// Exit disposition of one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// Command ran to completion with this exit code (`None` = killed by signal).
    Exited(Option<i32>),
    /// The shell itself could not be spawned.
    SpawnFailed(String),
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(Some(code)) => write!(f, "exit code {code}"),
            Self::Exited(None) => write!(f, "killed by signal"),
            Self::SpawnFailed(err) => write!(f, "spawn failed: {err}"),
        }
    }
}

/// Outcome of one build or clean command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Command line as handed to the shell.
    pub command: String,
    pub status: CommandStatus,
}

impl CommandOutcome {
    /// True when the command ran and exited zero.
    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self.status, CommandStatus::Exited(Some(0)))
    }
}

/// Outcome of the build-then-clean setup step.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub build: CommandOutcome,
    pub clean: CommandOutcome,
}

impl BuildOutcome {
    /// True when both commands exited zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.build.success() && self.clean.success()
    }

    /// One-line description of both command dispositions.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "`{}`: {}; `{}`: {}",
            self.build.command, self.build.status, self.clean.command, self.clean.status
        )
    }
}

/// Runs the project's build and clean commands from the project root.
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    project_root: PathBuf,
    build_command: String,
    clean_command: String,
}

impl ProjectBuilder {
    /// Create a builder for a project root.
    #[must_use]
    pub fn new(
        project_root: impl Into<PathBuf>,
        build_command: impl Into<String>,
        clean_command: impl Into<String>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            build_command: build_command.into(),
            clean_command: clean_command.into(),
        }
    }

    /// Run the build command, then the clean command. Command stdio is
    /// inherited so build output stays visible on the harness console.
    #[must_use]
    pub fn run(&self) -> BuildOutcome {
        BuildOutcome {
            build: self.run_command(&self.build_command),
            clean: self.run_command(&self.clean_command),
        }
    }

    fn run_command(&self, command: &str) -> CommandOutcome {
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.project_root)
            .status();

        let status = match status {
            Ok(status) => CommandStatus::Exited(status.code()),
            Err(err) => CommandStatus::SpawnFailed(err.to_string()),
        };

        CommandOutcome {
            command: command.to_string(),
            status,
        }
    }
}
