//! Coverfit Core - shrink oversized album art embedded in MP3 files.
//!
//! Portable players often refuse to render cover art above a fixed size.
//! This library walks a directory tree, finds MP3 files whose embedded
//! picture exceeds a bounding box, downscales it and writes it back as a
//! baseline JPEG front cover.
//!
//! # Architecture
//!
//! ```text
//! Discover → Read APIC → Size check → Resize + JPEG → Replace APIC → Outcome
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::{Arc, Mutex};
//! use coverfit_core::{BatchRunner, Config, RunController};
//!
//! let runner = BatchRunner::new(&Config::load()?, Arc::new(RunController::new()));
//! let events = Mutex::new(Vec::new());
//! let summary = runner.run("/music".as_ref(), &events)?;
//! println!("{} of {} files changed", summary.changed, summary.processed);
//! ```

// Module declarations
pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod types;

// Re-exports for convenient access
pub use batch::{BatchEvent, BatchRunner, EventSink, RunController, RunGuard};
pub use config::Config;
pub use error::{ConfigError, CoverfitError, PipelineError, PipelineResult, Result};
pub use pipeline::{ArtworkProcessor, ImageNormalizer, TagRewriter};
pub use report::{ReportFormat, ReportWriter};
pub use types::{
    BoundingBox, EncodingProfile, FileStatus, ProcessingOutcome, RunState, RunSummary, Severity,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
