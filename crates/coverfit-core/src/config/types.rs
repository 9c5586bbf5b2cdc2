//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, EncodingProfile};

/// Artwork size cap and output encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Maximum artwork width in pixels
    pub max_width: u32,

    /// Maximum artwork height in pixels
    pub max_height: u32,

    /// JPEG quality (1-100) for re-encoded artwork
    pub jpeg_quality: u8,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            max_width: 500,
            max_height: 500,
            jpeg_quality: 85,
        }
    }
}

impl ArtworkConfig {
    /// The bounding box artwork must fit inside.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.max_width, self.max_height)
    }

    /// The encoding applied to resized artwork.
    pub fn encoding_profile(&self) -> EncodingProfile {
        EncodingProfile::jpeg(self.jpeg_quality)
    }
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// File extensions treated as MP3 containers (case-insensitive)
    pub extensions: Vec<String>,

    /// Follow symbolic links while walking the tree
    pub follow_links: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".to_string()],
            follow_links: false,
        }
    }
}

/// Batch executor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max events buffered between the executor and the presentation layer
    pub event_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { event_buffer: 256 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
