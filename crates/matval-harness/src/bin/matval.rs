//! CLI entrypoint for the mainmat validation harness.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use matval_harness::config::HarnessConfig;
use matval_harness::pipeline::{RunOptions, run_pipeline};
use matval_harness::progress::{PlainProgress, ProgressSink, TerminalProgress};
use matval_harness::run_log::LogEmitter;

/// Validation harness for the mainmat matrix calculator.
#[derive(Debug, Parser)]
#[command(name = "matval")]
#[command(about = "Builds the target executable and replays every input fixture through it")]
struct Cli {
    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Project root the build/clean commands run in.
    #[arg(long)]
    project_root: Option<PathBuf>,
    /// Directory scanned for fixture files.
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Directory receiving one output file per fixture.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Target executable fed one fixture per run.
    #[arg(long)]
    executable: Option<PathBuf>,
    /// Shell command that builds the target executable.
    #[arg(long)]
    build_cmd: Option<String>,
    /// Shell command that removes intermediate build artifacts.
    #[arg(long)]
    clean_cmd: Option<String>,
    /// Literal file-name suffix that marks a fixture.
    #[arg(long)]
    extension: Option<String>,
    /// Kill a fixture run after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Skip the build/clean step.
    #[arg(long)]
    skip_build: bool,
    /// Abort when the build or clean command fails.
    #[arg(long)]
    require_build: bool,
    /// Force one-line-per-update progress output.
    #[arg(long)]
    plain_progress: bool,
    /// Write a JSONL run log to this path.
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    let options = RunOptions {
        skip_build: cli.skip_build,
        require_build: cli.require_build,
    };

    let mut log = match &cli.log {
        Some(path) => Some(LogEmitter::to_file(path)?),
        None => None,
    };

    let mut progress: Box<dyn ProgressSink> =
        if cli.plain_progress || !std::io::stdout().is_terminal() {
            Box::new(PlainProgress::stdout())
        } else {
            Box::new(TerminalProgress::stdout())
        };

    run_pipeline(&config, options, progress.as_mut(), log.as_mut())?;
    Ok(())
}

fn apply_overrides(config: &mut HarnessConfig, cli: &Cli) {
    if let Some(v) = &cli.project_root {
        config.project_root = v.clone();
    }
    if let Some(v) = &cli.input_dir {
        config.input_dir = v.clone();
    }
    if let Some(v) = &cli.output_dir {
        config.output_dir = v.clone();
    }
    if let Some(v) = &cli.executable {
        config.executable = v.clone();
    }
    if let Some(v) = &cli.build_cmd {
        config.build_command = v.clone();
    }
    if let Some(v) = &cli.clean_cmd {
        config.clean_command = v.clone();
    }
    if let Some(v) = &cli.extension {
        config.fixture_extension = v.clone();
    }
    if let Some(v) = cli.timeout_secs {
        config.timeout_secs = Some(v);
    }
}
