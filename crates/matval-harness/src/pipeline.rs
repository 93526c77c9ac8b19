//! End-to-end orchestration: build, discover, run each fixture, report.
//!
//! The control flow is fixed and fully sequential: the build step runs once,
//! discovery runs once, then each fixture is executed to completion before
//! the next starts. Extracted from the CLI binary so the whole flow is
//! exercisable in tests.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::builder::{BuildOutcome, CommandOutcome, ProjectBuilder};
use crate::config::HarnessConfig;
use crate::fixtures::{DiscoveryError, discover_fixtures};
use crate::progress::ProgressSink;
use crate::run_log::{LogEmitter, LogEntry, LogLevel};
use crate::runner::{FixtureRunner, RunError, RunRecord, RunStatus};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("cannot create output directory {dir}: {source}")]
    CreateOutputDir {
        dir: String,
        source: std::io::Error,
    },
    #[error("build step failed: {0}")]
    BuildRequired(String),
}

/// Run controls that sit outside the deployment configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Skip the build/clean step entirely.
    pub skip_build: bool,
    /// Abort when the build or clean command does not exit zero.
    pub require_build: bool,
}

/// Summary of one harness invocation.
///
/// Carries no verdicts: the harness records what each run produced, not
/// whether it was correct.
#[derive(Debug)]
pub struct RunSummary {
    /// Build-step outcome, `None` when the build was skipped.
    pub build: Option<BuildOutcome>,
    pub total_fixtures: usize,
    pub records: Vec<RunRecord>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of fixtures whose run wrote to standard error.
    #[must_use]
    pub fn fixtures_with_stderr(&self) -> usize {
        self.records.iter().filter(|r| r.has_stderr()).count()
    }
}

/// Run the whole harness: build, discover, execute every fixture, report.
///
/// A failing build is a warning unless `options.require_build` is set.
/// An empty fixture set is not an error: the pipeline prints a notice and
/// returns an empty summary before any progress arithmetic. Discovery and
/// spawn failures propagate; output files already written stay on disk.
pub fn run_pipeline(
    config: &HarnessConfig,
    options: RunOptions,
    progress: &mut dyn ProgressSink,
    log: Option<&mut LogEmitter>,
) -> Result<RunSummary, PipelineError> {
    let start = Instant::now();
    let mut log = log;
    let mut emit = move |entry: LogEntry| {
        if let Some(emitter) = log.as_deref_mut() {
            emitter.emit(entry);
        }
    };

    let build = if options.skip_build {
        None
    } else {
        let builder = ProjectBuilder::new(
            &config.project_root,
            &config.build_command,
            &config.clean_command,
        );
        let outcome = builder.run();
        emit(
            LogEntry::new(command_level(&outcome.build), "build_completed")
                .with_detail(outcome.build.status.to_string()),
        );
        emit(
            LogEntry::new(command_level(&outcome.clean), "clean_completed")
                .with_detail(outcome.clean.status.to_string()),
        );
        if !outcome.success() {
            if options.require_build {
                return Err(PipelineError::BuildRequired(outcome.describe()));
            }
            eprintln!(
                "warning: build step did not succeed ({}); continuing with the existing executable",
                outcome.describe()
            );
        }
        Some(outcome)
    };

    let output_dir = config.resolved_output_dir();
    std::fs::create_dir_all(&output_dir).map_err(|source| PipelineError::CreateOutputDir {
        dir: output_dir.display().to_string(),
        source,
    })?;

    let input_dir = config.resolved_input_dir();
    let fixtures = discover_fixtures(&input_dir, &config.fixture_extension)?;
    emit(
        LogEntry::new(LogLevel::Info, "fixtures_discovered")
            .with_detail(fixtures.len().to_string()),
    );

    if fixtures.is_empty() {
        eprintln!(
            "No fixture files matching *{} in {}; nothing to process",
            config.fixture_extension,
            input_dir.display()
        );
        return Ok(RunSummary {
            build,
            total_fixtures: 0,
            records: Vec::new(),
            elapsed: start.elapsed(),
        });
    }

    let runner = FixtureRunner::new(
        config.resolved_executable(),
        input_dir,
        output_dir,
        config.output_marker.clone(),
        config.timeout(),
    );

    let total = fixtures.len();
    let mut records = Vec::with_capacity(total);
    for (index, fixture) in fixtures.iter().enumerate() {
        let record = runner.run(fixture)?;

        if record.has_stderr() {
            eprintln!("Errors:");
            eprintln!("{}", record.stderr);
            emit(
                LogEntry::new(LogLevel::Warn, "fixture_stderr")
                    .with_fixture(fixture.file_name())
                    .with_detail(record.stderr.clone()),
            );
        }
        match record.status {
            RunStatus::TimedOut => {
                eprintln!(
                    "warning: {} timed out and its process was killed",
                    fixture.file_name()
                );
                emit(
                    LogEntry::new(LogLevel::Error, "fixture_timeout")
                        .with_fixture(fixture.file_name()),
                );
            }
            RunStatus::Exited { code } => {
                let mut entry = LogEntry::new(LogLevel::Info, "fixture_completed")
                    .with_fixture(fixture.file_name());
                if let Some(code) = code {
                    entry = entry.with_exit_code(code);
                }
                emit(entry);
            }
        }

        progress.update(index + 1, total);
        records.push(record);
    }

    let elapsed = start.elapsed();
    progress.finish(elapsed);
    emit(LogEntry::new(LogLevel::Info, "run_completed").with_elapsed_secs(elapsed.as_secs_f64()));

    Ok(RunSummary {
        build,
        total_fixtures: total,
        records,
        elapsed,
    })
}

fn command_level(outcome: &CommandOutcome) -> LogLevel {
    if outcome.success() {
        LogLevel::Info
    } else {
        LogLevel::Warn
    }
}
