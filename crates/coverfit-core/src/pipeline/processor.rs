//! Per-file pipeline: read artwork, size check, normalize, write back.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{FileStatus, ProcessingOutcome};

use super::discovery::{DiscoveredFile, FileDiscovery};
use super::normalize::ImageNormalizer;
use super::tags::TagRewriter;

/// Runs the artwork pipeline over single files.
pub struct ArtworkProcessor {
    normalizer: ImageNormalizer,
    discovery: FileDiscovery,
}

impl ArtworkProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            normalizer: ImageNormalizer::new(&config.artwork),
            discovery: FileDiscovery::new(config.processing.clone()),
        }
    }

    /// Process one file. Never fails: every error, including a panic inside a
    /// decoder, is folded into the returned outcome.
    pub fn process(&self, path: &Path) -> ProcessingOutcome {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {:?}", path);

        let status = match panic::catch_unwind(AssertUnwindSafe(|| self.run_stages(path))) {
            Ok(status) => status,
            Err(payload) => FileStatus::Unexpected {
                message: panic_message(payload.as_ref()),
            },
        };

        tracing::trace!("  Pipeline: {:?}", start.elapsed());
        ProcessingOutcome::new(path.to_path_buf(), status)
    }

    fn run_stages(&self, path: &Path) -> FileStatus {
        // Read
        let entry = match TagRewriter::read_cover_art(path) {
            Ok(Some(entry)) => entry,
            Ok(None) => return FileStatus::NoArtwork,
            Err(PipelineError::NoTag(_)) => return FileStatus::NoTag,
            Err(e) => {
                return FileStatus::ReadFailed {
                    message: e.to_string(),
                }
            }
        };
        tracing::trace!(
            "  Artwork: {} bytes, {} ({:?})",
            entry.data.len(),
            entry.mime_type,
            entry.picture_type
        );

        // Size check. Artwork that cannot be identified is left alone.
        match self.normalizer.check(&entry.data) {
            Ok(false) => return FileStatus::WithinLimits,
            Ok(true) => tracing::debug!("  Artwork exceeds bounding box, optimizing"),
            Err(e) => {
                return FileStatus::Unidentified {
                    message: e.to_string(),
                };
            }
        }

        // Normalize
        let normalized = match self.normalizer.normalize(&entry.data) {
            Ok(n) => n,
            Err(e) => {
                return FileStatus::OptimizeFailed {
                    message: e.to_string(),
                }
            }
        };

        // Write back
        let (original, resized) = (normalized.original, normalized.resized);
        match TagRewriter::replace_cover_art(path, normalized.data) {
            Ok(_) => FileStatus::Optimized { original, resized },
            Err(e) => FileStatus::EmbedFailed {
                message: e.to_string(),
            },
        }
    }

    /// Discover all eligible files under a root directory.
    pub fn discover(&self, root: &Path) -> PipelineResult<Vec<DiscoveredFile>> {
        self.discovery.discover(root)
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during processing".to_string()
    }
}
