//! Integration tests: the full build → discover → run → report pipeline.
//!
//! Covers:
//! 1. Replaying every fixture produces one output file holding the child's stdout.
//! 2. An empty fixture set ends cleanly before any progress arithmetic.
//! 3. Child stderr is captured without stopping the loop.
//! 4. A missing executable halts the run; earlier outputs stay on disk.
//! 5. Build failures are surfaced, and fatal only under `require_build`.
//! 6. The JSONL run log records the harness lifecycle.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use matval_harness::config::HarnessConfig;
use matval_harness::pipeline::{PipelineError, RunOptions, run_pipeline};
use matval_harness::progress::ProgressSink;
use matval_harness::run_log::LogEmitter;
use matval_harness::runner::{RunError, RunStatus};

fn unique_tmp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after UNIX_EPOCH")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[derive(Default)]
struct RecordingProgress {
    updates: Vec<(usize, usize)>,
    finished: Vec<Duration>,
}

impl ProgressSink for RecordingProgress {
    fn update(&mut self, processed: usize, total: usize) {
        self.updates.push((processed, total));
    }

    fn finish(&mut self, elapsed: Duration) {
        self.finished.push(elapsed);
    }
}

/// Project skeleton under a fresh temp root: fixtures in `validation/input`,
/// `/bin/cat` standing in for the target executable, no-op build commands.
fn project_with_fixtures(prefix: &str, fixtures: &[(&str, &str)]) -> (PathBuf, HarnessConfig) {
    let root = unique_tmp_dir(prefix);
    let input_dir = root.join("validation/input");
    std::fs::create_dir_all(&input_dir).expect("create input dir");
    for (name, content) in fixtures {
        std::fs::write(input_dir.join(name), content).expect("write fixture");
    }

    let mut config = HarnessConfig::default();
    config.project_root = root.clone();
    config.executable = PathBuf::from("/bin/cat");
    config.build_command = String::from("true");
    config.clean_command = String::from("true");
    (root, config)
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

#[test]
fn every_fixture_yields_one_output_file() {
    let (root, config) =
        project_with_fixtures("pipeline-replay", &[("b.txt", "second\n"), ("a.txt", "first\n")]);
    let mut progress = RecordingProgress::default();

    let summary =
        run_pipeline(&config, RunOptions::default(), &mut progress, None).expect("pipeline runs");

    assert_eq!(summary.total_fixtures, 2);
    assert_eq!(summary.records.len(), 2);
    assert!(summary.build.as_ref().expect("build ran").success());
    assert_eq!(summary.fixtures_with_stderr(), 0);

    let out_dir = root.join("validation/output");
    let a = std::fs::read_to_string(out_dir.join("a_output.txt")).expect("a output");
    let b = std::fs::read_to_string(out_dir.join("b_output.txt")).expect("b output");
    assert_eq!(a, "first\n");
    assert_eq!(b, "second\n");

    // Sorted discovery order, one update per fixture, one finish.
    assert_eq!(summary.records[0].fixture.file_name(), "a.txt");
    assert_eq!(progress.updates, vec![(1, 2), (2, 2)]);
    assert_eq!(progress.finished.len(), 1);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn empty_fixture_set_ends_cleanly() {
    let (root, config) = project_with_fixtures("pipeline-empty", &[]);
    let mut progress = RecordingProgress::default();

    let summary =
        run_pipeline(&config, RunOptions::default(), &mut progress, None).expect("pipeline runs");

    assert_eq!(summary.total_fixtures, 0);
    assert!(summary.records.is_empty());
    assert!(progress.updates.is_empty());
    assert!(progress.finished.is_empty());

    let _ = std::fs::remove_dir_all(root);
}

#[cfg(unix)]
#[test]
fn child_stderr_does_not_stop_the_loop() {
    let (root, mut config) = project_with_fixtures(
        "pipeline-stderr",
        &[("a.txt", "alpha\n"), ("b.txt", "beta\n")],
    );
    config.executable = write_script(&root, "noisy.sh", "echo \"unknown command\" >&2\ncat");
    let mut progress = RecordingProgress::default();

    let summary =
        run_pipeline(&config, RunOptions::default(), &mut progress, None).expect("pipeline runs");

    assert_eq!(summary.fixtures_with_stderr(), 2);
    assert!(summary.records[0].stderr.contains("unknown command"));

    let out_dir = root.join("validation/output");
    assert_eq!(
        std::fs::read_to_string(out_dir.join("a_output.txt")).expect("a output"),
        "alpha\n"
    );
    assert_eq!(
        std::fs::read_to_string(out_dir.join("b_output.txt")).expect("b output"),
        "beta\n"
    );
    assert_eq!(progress.updates, vec![(1, 2), (2, 2)]);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn missing_executable_halts_but_keeps_earlier_outputs() {
    let (root, mut config) =
        project_with_fixtures("pipeline-missing-exe", &[("a.txt", "alpha\n")]);
    let mut progress = RecordingProgress::default();

    // First pass with a working executable leaves an output behind.
    run_pipeline(&config, RunOptions::default(), &mut progress, None).expect("pipeline runs");
    let existing = root.join("validation/output/a_output.txt");
    assert!(existing.exists());

    // Second pass with a missing executable must fail fast.
    config.executable = root.join("no-such-binary");
    let err = run_pipeline(
        &config,
        RunOptions::default(),
        &mut RecordingProgress::default(),
        None,
    )
    .expect_err("spawn must fail");

    assert!(matches!(
        err,
        PipelineError::Run(RunError::Spawn { .. })
    ));
    assert!(existing.exists());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn missing_input_directory_is_fatal_before_any_run() {
    let root = unique_tmp_dir("pipeline-no-input");
    let mut config = HarnessConfig::default();
    config.project_root = root.clone();
    config.executable = PathBuf::from("/bin/cat");
    config.build_command = String::from("true");
    config.clean_command = String::from("true");

    let err = run_pipeline(
        &config,
        RunOptions::default(),
        &mut RecordingProgress::default(),
        None,
    )
    .expect_err("discovery must fail");

    assert!(matches!(err, PipelineError::Discovery(_)));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn failing_build_warns_but_still_runs_fixtures() {
    let (root, mut config) = project_with_fixtures("pipeline-build-warn", &[("a.txt", "x\n")]);
    config.build_command = String::from("false");

    let summary = run_pipeline(
        &config,
        RunOptions::default(),
        &mut RecordingProgress::default(),
        None,
    )
    .expect("pipeline proceeds past the failed build");

    assert!(!summary.build.as_ref().expect("build ran").success());
    assert_eq!(summary.records.len(), 1);
    assert!(root.join("validation/output/a_output.txt").exists());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn require_build_turns_a_failed_build_fatal() {
    let (root, mut config) = project_with_fixtures("pipeline-build-fatal", &[("a.txt", "x\n")]);
    config.build_command = String::from("false");

    let err = run_pipeline(
        &config,
        RunOptions {
            skip_build: false,
            require_build: true,
        },
        &mut RecordingProgress::default(),
        None,
    )
    .expect_err("failed build must abort");

    assert!(matches!(err, PipelineError::BuildRequired(_)));
    assert!(!root.join("validation/output").exists());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn skip_build_leaves_no_build_outcome() {
    let (root, mut config) = project_with_fixtures("pipeline-skip-build", &[("a.txt", "x\n")]);
    // A build command that would fail loudly if it ran.
    config.build_command = String::from("exit 42");

    let summary = run_pipeline(
        &config,
        RunOptions {
            skip_build: true,
            require_build: false,
        },
        &mut RecordingProgress::default(),
        None,
    )
    .expect("pipeline runs without building");

    assert!(summary.build.is_none());
    assert_eq!(summary.records.len(), 1);

    let _ = std::fs::remove_dir_all(root);
}

#[cfg(unix)]
#[test]
fn timed_out_fixture_is_killed_and_the_loop_continues() {
    let (root, mut config) =
        project_with_fixtures("pipeline-timeout", &[("hang.txt", ""), ("ok.txt", "fine\n")]);
    // Hangs only for the first fixture; copies stdin otherwise.
    config.executable = write_script(
        &root,
        "maybe-hang.sh",
        "read -r line || true\nif [ \"$line\" = \"\" ]; then sleep 30; else printf '%s\\n' \"$line\"; fi",
    );
    config.timeout_secs = Some(1);
    let mut progress = RecordingProgress::default();

    let summary =
        run_pipeline(&config, RunOptions::default(), &mut progress, None).expect("pipeline runs");

    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.records[0].status, RunStatus::TimedOut);
    assert_eq!(summary.records[1].status, RunStatus::Exited { code: Some(0) });
    assert_eq!(
        std::fs::read_to_string(root.join("validation/output/ok_output.txt")).expect("ok output"),
        "fine\n"
    );
    assert_eq!(progress.updates, vec![(1, 2), (2, 2)]);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn run_log_records_the_harness_lifecycle() {
    let (root, config) = project_with_fixtures("pipeline-log", &[("a.txt", "x\n")]);
    let log_path = root.join("run.log.jsonl");
    let mut emitter = LogEmitter::to_file(&log_path).expect("create log");

    run_pipeline(
        &config,
        RunOptions::default(),
        &mut RecordingProgress::default(),
        Some(&mut emitter),
    )
    .expect("pipeline runs");
    drop(emitter);

    let content = std::fs::read_to_string(&log_path).expect("read log");
    let events: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is json"))
        .collect();

    assert_eq!(events[0]["event"], "build_completed");
    assert!(events.iter().any(|e| {
        e["event"] == "fixture_completed" && e["fixture"] == "a.txt" && e["exit_code"] == 0
    }));
    let last = events.last().expect("log not empty");
    assert_eq!(last["event"], "run_completed");
    assert!(last["elapsed_secs"].as_f64().expect("elapsed recorded") >= 0.0);

    let _ = std::fs::remove_dir_all(root);
}
