//! Validation harness for the mainmat matrix calculator.
//!
//! This crate provides:
//! - Build step: run the project's build and clean commands with explicit outcomes
//! - Fixture discovery: list input fixtures by file-name suffix
//! - Runner: feed each fixture to the target executable, capture stdout to a file
//! - Progress reporting: live single-line progress plus an elapsed-time summary
//! - Run log: optional JSONL record of harness lifecycle events
//!
//! The harness performs no output comparison: it replays fixtures and
//! persists what the executable printed, nothing more.

#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod fixtures;
pub mod pipeline;
pub mod progress;
pub mod run_log;
pub mod runner;

pub use builder::{BuildOutcome, CommandOutcome, CommandStatus, ProjectBuilder};
pub use config::HarnessConfig;
pub use fixtures::{Fixture, discover_fixtures};
pub use pipeline::{RunOptions, RunSummary, run_pipeline};
pub use progress::{PlainProgress, ProgressSink, TerminalProgress};
pub use runner::{FixtureRunner, RunRecord, RunStatus};
