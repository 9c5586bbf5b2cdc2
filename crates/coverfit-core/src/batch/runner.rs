//! Batch executor: discover, then process files one by one with progress.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::processor::panic_message;
use crate::pipeline::{ArtworkProcessor, FileDiscovery};
use crate::types::{ProcessingOutcome, RunState, RunSummary, Severity};

use super::controller::{RunController, RunGuard};
use super::events::{BatchEvent, EventSink};

/// Drives the artwork pipeline over a directory tree.
///
/// Files are processed strictly sequentially. Cancellation is checked
/// between files, never in the middle of one.
pub struct BatchRunner {
    processor: Arc<ArtworkProcessor>,
    controller: Arc<RunController>,
}

/// What the walk managed to do before it stopped.
#[derive(Default)]
struct RunProgress {
    discovered: usize,
    outcomes: Vec<ProcessingOutcome>,
}

impl BatchRunner {
    /// Create a runner bound to a shared controller.
    pub fn new(config: &Config, controller: Arc<RunController>) -> Self {
        Self {
            processor: Arc::new(ArtworkProcessor::new(config)),
            controller,
        }
    }

    pub fn controller(&self) -> &Arc<RunController> {
        &self.controller
    }

    /// Run a batch on the current thread and return its summary.
    ///
    /// Fails only if the root is not a directory or a run is already active;
    /// everything that happens after the run starts is reported through the
    /// sink and the summary.
    pub fn run<S: EventSink + ?Sized>(&self, root: &Path, sink: &S) -> PipelineResult<RunSummary> {
        let guard = self.begin(root)?;
        Ok(drive(&self.processor, guard, root, sink))
    }

    /// Start a batch on tokio's blocking pool.
    ///
    /// Validation happens before spawning, so `InvalidDirectory` and
    /// `RunInProgress` are returned immediately. Must be called from within
    /// a tokio runtime.
    pub fn spawn<S>(&self, root: PathBuf, sink: S) -> PipelineResult<JoinHandle<RunSummary>>
    where
        S: EventSink + Send + 'static,
    {
        let guard = self.begin(&root)?;
        let processor = Arc::clone(&self.processor);
        Ok(tokio::task::spawn_blocking(move || {
            drive(&processor, guard, &root, &sink)
        }))
    }

    fn begin(&self, root: &Path) -> PipelineResult<RunGuard> {
        if !root.is_dir() {
            return Err(PipelineError::InvalidDirectory(root.to_path_buf()));
        }
        self.controller.try_begin()
    }
}

/// Execute a claimed run to completion. Always releases the guard, emits
/// `RunFinished` and resets progress to zero.
fn drive<S: EventSink + ?Sized>(
    processor: &ArtworkProcessor,
    guard: RunGuard,
    root: &Path,
    sink: &S,
) -> RunSummary {
    let start = Instant::now();
    let mut progress = RunProgress::default();

    tracing::debug!("Run started under {:?}", root);
    sink.emit(BatchEvent::log(
        Severity::Info,
        format!("Starting recursive processing in: {}", root.display()),
    ));

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        walk(processor, guard.controller(), root, sink, &mut progress)
    }));

    let state = match result {
        Ok(Ok(true)) => RunState::Cancelled,
        Ok(Ok(false)) => RunState::Completed,
        Ok(Err(e)) => fail(sink, e.to_string()),
        Err(payload) => fail(sink, panic_message(payload.as_ref())),
    };

    let summary = RunSummary::from_outcomes(
        progress.discovered,
        &progress.outcomes,
        start.elapsed().as_millis() as u64,
        state,
    );

    let closing = match state {
        RunState::Cancelled => "Processing stopped by user.".to_string(),
        RunState::Failed => "Processing aborted after an error.".to_string(),
        _ => format!("Finished recursive processing in: {}", root.display()),
    };
    tracing::debug!(
        "Run ended as {:?}: {} of {} files changed",
        state,
        summary.changed,
        summary.processed
    );
    sink.emit(BatchEvent::log(Severity::Info, closing));

    // Release before announcing, so observers of RunFinished see a ready controller.
    guard.finish(state);
    sink.emit(BatchEvent::RunFinished(summary.clone()));
    sink.emit(BatchEvent::Progress(0.0));
    summary
}

/// Discover and process. Returns whether the run was cancelled.
fn walk<S: EventSink + ?Sized>(
    processor: &ArtworkProcessor,
    controller: &RunController,
    root: &Path,
    sink: &S,
    progress: &mut RunProgress,
) -> PipelineResult<bool> {
    let files = processor.discover(root)?;
    let total = files.len();
    progress.discovered = total;
    progress.outcomes.reserve(total);

    tracing::debug!(
        "Processing {} MP3 files ({} bytes).",
        total,
        FileDiscovery::total_size(&files)
    );
    sink.emit(BatchEvent::Discovered {
        root: root.to_path_buf(),
        total,
    });

    for (index, file) in files.iter().enumerate() {
        if controller.is_cancelled() {
            tracing::debug!("Cancellation requested after {} of {} files", index, total);
            return Ok(true);
        }

        let outcome = processor.process(&file.path);
        sink.emit(BatchEvent::log(
            outcome.status.severity(),
            outcome.status.describe(&outcome.path),
        ));
        sink.emit(BatchEvent::FileOutcome(outcome.clone()));
        progress.outcomes.push(outcome);

        sink.emit(BatchEvent::Progress(percent(index + 1, total)));
    }

    Ok(false)
}

fn fail<S: EventSink + ?Sized>(sink: &S, message: String) -> RunState {
    tracing::debug!("Run failed: {}", message);
    sink.emit(BatchEvent::RunFailed { message });
    RunState::Failed
}

fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tags::tests::{fake_audio, write_mp3};
    use id3::frame::PictureType;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::sync::Mutex;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn runner() -> BatchRunner {
        BatchRunner::new(&Config::default(), Arc::new(RunController::new()))
    }

    fn progress_values(events: &[BatchEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Cancels the run as soon as the first file outcome arrives.
    struct CancelAfterFirst {
        controller: Arc<RunController>,
        events: Mutex<Vec<BatchEvent>>,
    }

    impl EventSink for CancelAfterFirst {
        fn emit(&self, event: BatchEvent) {
            if matches!(event, BatchEvent::FileOutcome(_)) {
                self.controller.cancel();
            }
            self.events.emit(event);
        }
    }

    /// Shared buffer handed to a fmt subscriber as its writer.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_messages_go_through_sink_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), fake_audio()).unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let sink = Mutex::new(Vec::new());
        tracing::subscriber::with_default(subscriber, || {
            runner().run(dir.path(), &sink).unwrap();
        });

        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.is_empty(), "unexpected direct log output: {logged}");

        let messages: Vec<String> = sink
            .into_inner()
            .unwrap()
            .into_iter()
            .filter_map(|e| match e {
                BatchEvent::Log { message, .. } => Some(message),
                _ => None,
            })
            .collect();
        let starts = messages
            .iter()
            .filter(|m| m.starts_with("Starting recursive processing"))
            .count();
        let finishes = messages
            .iter()
            .filter(|m| m.starts_with("Finished recursive processing"))
            .count();
        assert_eq!((starts, finishes), (1, 1));
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(4, 4), 100.0);
        assert_eq!(percent(0, 0), 100.0);
    }

    #[test]
    fn test_run_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner();
        let err = runner.run(&dir.path().join("missing"), &()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDirectory(_)));
        assert_eq!(runner.controller().state(), RunState::Idle);
    }

    #[test]
    fn test_run_rejected_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner();
        let _guard = runner.controller().try_begin().unwrap();

        let err = runner.run(dir.path(), &()).unwrap_err();
        assert!(matches!(err, PipelineError::RunInProgress));
    }

    #[test]
    fn test_empty_directory_completes() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner();
        let sink = Mutex::new(Vec::new());

        let summary = runner.run(dir.path(), &sink).unwrap();
        assert_eq!(summary.state, RunState::Completed);
        assert_eq!(summary.discovered, 0);
        assert_eq!(runner.controller().state(), RunState::Completed);

        let events = sink.into_inner().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, BatchEvent::RunFinished(s) if s.processed == 0)));
        assert_eq!(events.last(), Some(&BatchEvent::Progress(0.0)));
    }

    #[test]
    fn test_progress_is_monotonic_and_reaches_100() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1.mp3", "2.mp3", "3.mp3", "4.mp3"] {
            std::fs::write(dir.path().join(name), fake_audio()).unwrap();
        }
        let sink = Mutex::new(Vec::new());

        let summary = runner().run(dir.path(), &sink).unwrap();
        assert_eq!(summary.processed, 4);

        let events = sink.into_inner().unwrap();
        let progress = progress_values(&events);
        // Four per-file updates followed by the reset.
        assert_eq!(progress, vec![25.0, 50.0, 75.0, 100.0, 0.0]);
    }

    #[test]
    fn test_cancel_stops_at_file_boundary() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.mp3", "b.mp3", "c.mp3"] {
            write_mp3(
                &dir.path().join(name),
                &[(PictureType::CoverFront, "", png(700, 700))],
            );
        }

        let runner = runner();
        let sink = CancelAfterFirst {
            controller: Arc::clone(runner.controller()),
            events: Mutex::new(Vec::new()),
        };

        let summary = runner.run(dir.path(), &sink).unwrap();
        assert_eq!(summary.state, RunState::Cancelled);
        assert_eq!(summary.discovered, 3);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.changed, 1);
        assert_eq!(runner.controller().state(), RunState::Cancelled);
        assert!(!runner.controller().is_running());

        // The first file finished its rewrite; the rest were never touched.
        let first = crate::pipeline::TagRewriter::read_cover_art(&dir.path().join("a.mp3"))
            .unwrap()
            .unwrap();
        assert_eq!(first.mime_type, "image/jpeg");
        let untouched = crate::pipeline::TagRewriter::read_cover_art(&dir.path().join("b.mp3"))
            .unwrap()
            .unwrap();
        assert_eq!(untouched.mime_type, "image/png");

        let events = sink.events.into_inner().unwrap();
        let outcomes = events
            .iter()
            .filter(|e| matches!(e, BatchEvent::FileOutcome(_)))
            .count();
        assert_eq!(outcomes, 1);
        assert!(events.iter().any(|e| matches!(
            e,
            BatchEvent::Log { message, .. } if message == "Processing stopped by user."
        )));
    }

    #[test]
    fn test_controller_reusable_after_run() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner();
        runner.run(dir.path(), &()).unwrap();
        runner.run(dir.path(), &()).unwrap();
        assert_eq!(runner.controller().state(), RunState::Completed);
    }

    #[tokio::test]
    async fn test_spawn_streams_events_over_channel() {
        let dir = tempfile::tempdir().unwrap();
        write_mp3(
            &dir.path().join("big.mp3"),
            &[(PictureType::CoverFront, "", png(900, 300))],
        );
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let runner = runner();
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let handle = runner.spawn(dir.path().to_path_buf(), tx).unwrap();

        let mut finished = None;
        while let Some(event) = rx.recv().await {
            if let BatchEvent::RunFinished(summary) = event {
                finished = Some(summary);
            }
        }
        let summary = handle.await.unwrap();
        assert_eq!(finished, Some(summary.clone()));
        assert_eq!(summary.discovered, 1);
        assert_eq!(summary.changed, 1);
        assert!(runner.controller().state().is_ready());
    }

    #[tokio::test]
    async fn test_spawn_rejects_invalid_directory_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner();
        let (tx, _rx) = tokio::sync::mpsc::channel(8);
        let err = runner.spawn(dir.path().join("nope"), tx).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDirectory(_)));
    }
}
