//! Batch presentation: progress bar, event rendering and the closing summary.

use coverfit_core::{BatchEvent, ProcessingOutcome, RunState, RunSummary, Severity};
use indicatif::{ProgressBar, ProgressStyle};

/// Consumes batch events on the presentation side.
///
/// Log lines are routed through `tracing` with the progress bar suspended,
/// so they never tear the bar.
pub struct ProgressView {
    progress: ProgressBar,
    outcomes: Vec<ProcessingOutcome>,
    failure: Option<String>,
}

impl ProgressView {
    pub fn new(progress: ProgressBar) -> Self {
        Self {
            progress,
            outcomes: Vec::new(),
            failure: None,
        }
    }

    pub fn handle(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Discovered { root, total } => {
                tracing::debug!("Discovered {} MP3 files under {:?}", total, root);
                self.progress.set_length(total as u64);
                self.progress.set_position(0);
            }
            BatchEvent::Log { message, severity } => {
                self.progress.suspend(|| log_line(severity, &message));
            }
            BatchEvent::Progress(percent) => {
                // The executor resets to zero once the run is over; keep the final position.
                if percent > 0.0 {
                    let total = self.progress.length().unwrap_or(0);
                    let position = (percent / 100.0 * total as f64).round() as u64;
                    self.progress.set_position(position.min(total));
                }
            }
            BatchEvent::FileOutcome(outcome) => {
                if let Some(name) = outcome.path.file_name() {
                    self.progress.set_message(name.to_string_lossy().into_owned());
                }
                self.outcomes.push(outcome);
            }
            BatchEvent::RunFinished(summary) => {
                self.progress.set_message(state_label(summary.state));
                self.progress.finish();
            }
            BatchEvent::RunFailed { message } => {
                self.failure = Some(message);
            }
        }
    }

    /// Print a line above the progress bar.
    pub fn notice(&self, message: &str) {
        self.progress.suspend(|| eprintln!("{message}"));
    }

    /// Consume the view, returning collected outcomes and any run failure.
    pub fn finish(self) -> (Vec<ProcessingOutcome>, Option<String>) {
        if !self.progress.is_finished() {
            self.progress.abandon();
        }
        (self.outcomes, self.failure)
    }
}

fn log_line(severity: Severity, message: &str) {
    match severity {
        Severity::Info => tracing::info!("{}", message),
        Severity::Warn => tracing::warn!("{}", message),
        Severity::Error => tracing::error!("{}", message),
    }
}

fn state_label(state: RunState) -> &'static str {
    match state {
        RunState::Completed => "completed",
        RunState::Cancelled => "stopped by request",
        RunState::Failed => "error",
        RunState::Idle | RunState::Running => "",
    }
}

/// Create a progress bar for batch processing. Its length is set once
/// discovery reports how many files there are.
pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("scanning...");
    pb
}

/// Print a formatted summary table after batch processing.
pub fn print_summary(summary: &RunSummary, failure: Option<&str>) {
    let elapsed = summary.elapsed_ms as f64 / 1000.0;
    let rate = if elapsed > 0.0 {
        summary.processed as f64 / elapsed
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Status:       {:>8}", state_label(summary.state));
    eprintln!("    Resized:      {:>8}", summary.changed);
    eprintln!("    Unchanged:    {:>8}", summary.unchanged);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    if summary.processed < summary.discovered {
        eprintln!(
            "    Not reached:  {:>8}",
            summary.discovered - summary.processed
        );
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.discovered);
    eprintln!("    Duration:     {:>7.1}s", elapsed);
    eprintln!("    Rate:         {:>7.1} files/sec", rate);
    eprintln!("  ====================================");
    if let Some(message) = failure {
        eprintln!("    Error: {message}");
    }
}
