//! Live progress reporting.
//!
//! A terminal sink overwrites a single status line in place; a plain sink
//! emits one complete line per update for non-terminal targets such as CI
//! logs. Write failures are ignored: progress output is advisory and must
//! never abort a run.

use std::io::Write;
use std::time::Duration;

/// Width of the progress bar in characters.
pub const BAR_LENGTH: usize = 50;

/// Progress reporting seam: one `update` per completed fixture, one
/// `finish` after the last.
pub trait ProgressSink {
    fn update(&mut self, processed: usize, total: usize);
    fn finish(&mut self, elapsed: Duration);
}

/// Completion percentage after `processed` of `total` fixtures.
///
/// Callers guarantee `total > 0`; an empty fixture set short-circuits the
/// pipeline before any percentage arithmetic.
#[must_use]
pub fn percentage(processed: usize, total: usize) -> f64 {
    processed as f64 / total as f64 * 100.0
}

/// Fixed-width bar with `floor(BAR_LENGTH * processed / total)` filled cells.
#[must_use]
pub fn render_bar(processed: usize, total: usize) -> String {
    let filled = BAR_LENGTH * processed / total;
    let mut bar = String::with_capacity(BAR_LENGTH);
    for _ in 0..filled {
        bar.push('#');
    }
    for _ in filled..BAR_LENGTH {
        bar.push(' ');
    }
    bar
}

fn status_line(processed: usize, total: usize) -> String {
    format!(
        "Progress: [{processed}/{total}] [{bar}] {pct:.2}%",
        bar = render_bar(processed, total),
        pct = percentage(processed, total),
    )
}

fn summary_line(elapsed: Duration) -> String {
    format!(
        "All files processed in {:.4} seconds",
        elapsed.as_secs_f64()
    )
}

/// Overwrites one status line in place using carriage returns.
pub struct TerminalProgress<W: Write> {
    out: W,
}

impl TerminalProgress<std::io::Stdout> {
    /// Terminal sink over the process stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> TerminalProgress<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ProgressSink for TerminalProgress<W> {
    fn update(&mut self, processed: usize, total: usize) {
        let _ = write!(self.out, "\r{}", status_line(processed, total));
        let _ = self.out.flush();
    }

    fn finish(&mut self, elapsed: Duration) {
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "{}", summary_line(elapsed));
        let _ = self.out.flush();
    }
}

/// One complete line per update, for non-terminal targets.
pub struct PlainProgress<W: Write> {
    out: W,
}

impl PlainProgress<std::io::Stdout> {
    /// Plain sink over the process stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> PlainProgress<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ProgressSink for PlainProgress<W> {
    fn update(&mut self, processed: usize, total: usize) {
        let _ = writeln!(self.out, "{}", status_line(processed, total));
        let _ = self.out.flush();
    }

    fn finish(&mut self, elapsed: Duration) {
        let _ = writeln!(self.out, "{}", summary_line(elapsed));
        let _ = self.out.flush();
    }
}
