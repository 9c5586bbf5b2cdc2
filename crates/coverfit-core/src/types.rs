//! Core data types for the coverfit artwork pipeline.
//!
//! These types describe the artwork found in a file, the fixed size/encoding
//! targets, and the per-file and per-run results reported to callers.

use id3::frame::PictureType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mime type written for every replaced cover.
pub const JPEG_MIME: &str = "image/jpeg";

/// Description written for every replaced cover.
pub const COVER_DESCRIPTION: &str = "Cover";

/// Maximum artwork dimensions. Anything strictly larger on either axis is
/// considered oversized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl BoundingBox {
    /// The player's thumbnail limit.
    pub const DEFAULT: BoundingBox = BoundingBox {
        max_width: 500,
        max_height: 500,
    };

    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Whether `width` x `height` fits without resizing. Equal counts as fitting.
    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.max_width && height <= self.max_height
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Output encoding for resized artwork.
///
/// Always baseline JPEG with full-resolution chroma (4:4:4) and no extra
/// optimization pass; only the quality varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingProfile {
    /// JPEG quality (1-100)
    pub quality: u8,
}

impl EncodingProfile {
    pub fn jpeg(quality: u8) -> Self {
        Self { quality }
    }
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self::jpeg(85)
    }
}

/// An embedded picture read from a tag.
#[derive(Debug, Clone)]
pub struct ArtworkEntry {
    /// Raw image bytes as stored in the tag
    pub data: Vec<u8>,
    /// Declared mime type (may be wrong; decoding sniffs the real format)
    pub mime_type: String,
    /// Picture role (front cover, back cover, ...)
    pub picture_type: PictureType,
    /// Free-form description
    pub description: String,
}

/// Artwork after normalization.
#[derive(Debug, Clone)]
pub struct NormalizedArtwork {
    /// Encoded JPEG bytes
    pub data: Vec<u8>,
    /// Dimensions before resizing
    pub original: (u32, u32),
    /// Dimensions after resizing
    pub resized: (u32, u32),
}

/// Log severity attached to batch log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Why a file ended up changed or unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileStatus {
    /// Artwork was resized and written back
    Optimized {
        original: (u32, u32),
        resized: (u32, u32),
    },
    /// No ID3v2 header in the file
    NoTag,
    /// Tag present but no embedded picture
    NoArtwork,
    /// Artwork already fits the bounding box
    WithinLimits,
    /// Artwork format could not be identified; left as-is
    Unidentified { message: String },
    /// The tag could not be parsed
    ReadFailed { message: String },
    /// Decoding or re-encoding the artwork failed
    OptimizeFailed { message: String },
    /// Writing the new tag failed
    EmbedFailed { message: String },
    /// Something outside the known taxonomy went wrong
    Unexpected { message: String },
}

impl FileStatus {
    /// Whether the file was modified on disk.
    pub fn changed(&self) -> bool {
        matches!(self, FileStatus::Optimized { .. })
    }

    /// Whether this status counts as a failure in the run summary.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FileStatus::ReadFailed { .. }
                | FileStatus::OptimizeFailed { .. }
                | FileStatus::EmbedFailed { .. }
                | FileStatus::Unexpected { .. }
        )
    }

    pub fn severity(&self) -> Severity {
        match self {
            _ if self.is_failure() => Severity::Error,
            FileStatus::Unidentified { .. } => Severity::Warn,
            _ => Severity::Info,
        }
    }

    /// Human-readable line for the log sink.
    pub fn describe(&self, path: &std::path::Path) -> String {
        let path = path.display();
        match self {
            FileStatus::Optimized { original, resized } => format!(
                "Resized artwork from {}x{} to {}x{}: {path}",
                original.0, original.1, resized.0, resized.1
            ),
            FileStatus::NoTag => format!("No ID3 tags found. Skipping: {path}"),
            FileStatus::NoArtwork => format!("No embedded album art found. Skipping: {path}"),
            FileStatus::WithinLimits => {
                format!("Artwork dimensions are within limits. Skipping: {path}")
            }
            FileStatus::Unidentified { message } => {
                format!("Could not identify image format for size check ({message}): {path}")
            }
            FileStatus::ReadFailed { message } => {
                format!("Error reading tags from {path}: {message}")
            }
            FileStatus::OptimizeFailed { message } => {
                format!("Artwork optimization failed for {path}: {message}")
            }
            FileStatus::EmbedFailed { message } => {
                format!("Failed to embed optimized artwork in {path}: {message}")
            }
            FileStatus::Unexpected { message } => {
                format!("Unexpected error processing {path}: {message}")
            }
        }
    }
}

/// The result of running the pipeline over one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    /// Path of the processed file
    pub path: PathBuf,

    /// Whether the file was rewritten
    pub changed: bool,

    /// What happened
    pub status: FileStatus,
}

impl ProcessingOutcome {
    pub fn new(path: PathBuf, status: FileStatus) -> Self {
        Self {
            path,
            changed: status.changed(),
            status,
        }
    }
}

/// Terminal and transient states of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    /// Whether a new run may start from this state.
    pub fn is_ready(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// Aggregate counts for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Eligible files discovered under the root
    pub discovered: usize,

    /// Files that went through the pipeline
    pub processed: usize,

    /// Files whose artwork was replaced
    pub changed: usize,

    /// Files left untouched, failures included
    pub unchanged: usize,

    /// Unchanged files whose pipeline reported an error
    pub failed: usize,

    /// Wall-clock duration of the run
    pub elapsed_ms: u64,

    /// How the run ended
    pub state: RunState,
}

impl RunSummary {
    /// Fold a list of outcomes into a summary.
    pub fn from_outcomes(
        discovered: usize,
        outcomes: &[ProcessingOutcome],
        elapsed_ms: u64,
        state: RunState,
    ) -> Self {
        let changed = outcomes.iter().filter(|o| o.changed).count();
        let failed = outcomes.iter().filter(|o| o.status.is_failure()).count();
        Self {
            discovered,
            processed: outcomes.len(),
            changed,
            unchanged: outcomes.len() - changed,
            failed,
            elapsed_ms,
            state,
        }
    }
}
