//! Per-fixture execution of the target executable.
//!
//! Runs are strictly sequential: each child process is waited to completion
//! and its stderr fully drained before the next fixture starts. The fixture
//! file becomes the child's stdin; its stdout goes straight to the derived
//! output file.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::fixtures::Fixture;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot open fixture {path}: {source}")]
    OpenFixture {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot create output file {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot spawn {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot wait for {executable}: {source}")]
    Wait {
        executable: PathBuf,
        source: std::io::Error,
    },
}

/// How a single fixture run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Child exited on its own (`code` is `None` when killed by a signal).
    Exited { code: Option<i32> },
    /// Child exceeded the configured timeout and was killed.
    TimedOut,
}

/// Result of one fixture run.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub fixture: Fixture,
    pub output_path: PathBuf,
    /// Captured standard error, empty when the child wrote none.
    pub stderr: String,
    pub status: RunStatus,
}

impl RunRecord {
    /// True when the child wrote anything to standard error.
    #[must_use]
    pub fn has_stderr(&self) -> bool {
        !self.stderr.is_empty()
    }
}

/// Invokes the target executable once per fixture.
#[derive(Debug)]
pub struct FixtureRunner {
    executable: PathBuf,
    input_dir: PathBuf,
    output_dir: PathBuf,
    output_marker: String,
    timeout: Option<Duration>,
}

impl FixtureRunner {
    /// Create a runner. `timeout` of `None` waits indefinitely.
    #[must_use]
    pub fn new(
        executable: impl Into<PathBuf>,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        output_marker: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            executable: executable.into(),
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            output_marker: output_marker.into(),
            timeout,
        }
    }

    /// Run one fixture to completion and return what happened.
    ///
    /// A spawn failure (missing executable, permission denied) is an error;
    /// everything the child does once running, including writing to stderr
    /// or exiting non-zero, is recorded in the [`RunRecord`].
    pub fn run(&self, fixture: &Fixture) -> Result<RunRecord, RunError> {
        let input_path = self.input_dir.join(fixture.file_name());
        let output_path = self
            .output_dir
            .join(fixture.output_file_name(&self.output_marker));

        let input = File::open(&input_path).map_err(|source| RunError::OpenFixture {
            path: input_path.clone(),
            source,
        })?;
        let output = File::create(&output_path).map_err(|source| RunError::CreateOutput {
            path: output_path.clone(),
            source,
        })?;

        let mut child = Command::new(&self.executable)
            .stdin(Stdio::from(input))
            .stdout(Stdio::from(output))
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        // Drain stderr on a separate thread so a chatty child cannot fill
        // the pipe and deadlock against the wait below.
        let mut stderr_pipe = child.stderr.take();
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(pipe) = stderr_pipe.as_mut() {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        });

        let status = self.wait(&mut child)?;
        let stderr_bytes = match status {
            // Grandchildren of a killed child may keep the stderr pipe open;
            // detach the drain thread instead of blocking on EOF.
            RunStatus::TimedOut => {
                drop(reader);
                Vec::new()
            }
            RunStatus::Exited { .. } => reader.join().unwrap_or_default(),
        };

        Ok(RunRecord {
            fixture: fixture.clone(),
            output_path,
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            status,
        })
    }

    fn wait(&self, child: &mut Child) -> Result<RunStatus, RunError> {
        let Some(timeout) = self.timeout else {
            let status = child.wait().map_err(|source| self.wait_error(source))?;
            return Ok(RunStatus::Exited {
                code: status.code(),
            });
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait().map_err(|source| self.wait_error(source))? {
                Some(status) => {
                    return Ok(RunStatus::Exited {
                        code: status.code(),
                    });
                }
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(RunStatus::TimedOut);
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        }
    }

    fn wait_error(&self, source: std::io::Error) -> RunError {
        RunError::Wait {
            executable: self.executable.clone(),
            source,
        }
    }
}
