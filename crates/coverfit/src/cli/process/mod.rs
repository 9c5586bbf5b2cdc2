//! The `coverfit process` command.

mod batch;
mod setup;
pub mod types;

pub use types::ReportFormat;

use clap::Args;
use coverfit_core::{BatchEvent, BatchRunner, Config, ReportWriter, RunController, RunState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use batch::{create_progress_bar, print_summary, ProgressView};
use setup::{apply_overrides, resolve_input};

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Directory to scan recursively for MP3 files
    #[arg(required = true)]
    pub input: PathBuf,

    /// Maximum artwork width in pixels (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_width: Option<u32>,

    /// Maximum artwork height in pixels (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_height: Option<u32>,

    /// JPEG quality 1-100 for re-encoded artwork (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Follow symbolic links while scanning
    #[arg(long)]
    pub follow_links: bool,

    /// Write a per-file report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    pub report_format: ReportFormat,
}

/// Values match the clap annotations above.
impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            max_width: None,
            max_height: None,
            quality: None,
            follow_links: false,
            report: None,
            report_format: ReportFormat::Json,
        }
    }
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let input = resolve_input(&args)?;
    let config = apply_overrides(config, &args)?;

    let controller = Arc::new(RunController::new());
    let runner = BatchRunner::new(&config, Arc::clone(&controller));

    let (tx, mut rx) = mpsc::channel::<BatchEvent>(config.pipeline.event_buffer);
    let handle = runner.spawn(input, tx)?;

    let mut view = ProgressView::new(create_progress_bar());
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());
    let mut cancel_sent = false;

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => view.handle(event),
                None => break,
            },
            signal = &mut ctrl_c, if !cancel_sent => {
                cancel_sent = true;
                match signal {
                    Ok(()) => {
                        if controller.cancel() {
                            view.notice("Stopping after the current file...");
                        }
                    }
                    Err(e) => tracing::warn!("Cannot listen for Ctrl-C: {e}"),
                }
            }
        }
    }

    let summary = handle.await?;
    let (outcomes, failure) = view.finish();
    print_summary(&summary, failure.as_deref());

    if let Some(report_path) = &args.report {
        let mut writer = ReportWriter::create(report_path, args.report_format.into())?;
        writer.write_run(&summary, &outcomes)?;
        tracing::info!("Report written to {:?}", report_path);
    }

    if summary.state == RunState::Failed {
        anyhow::bail!(
            "Processing aborted: {}",
            failure.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}
