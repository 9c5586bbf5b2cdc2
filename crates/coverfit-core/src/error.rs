//! Error types for the coverfit artwork pipeline.
//!
//! Per-file errors (`NoTag`, `TagRead`, `TagWrite`, `ImageDecode`,
//! `ImageEncode`) are recoverable: the batch records them against the file
//! and moves on. `InvalidDirectory` and `RunInProgress` reject a run before
//! it starts.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for coverfit operations.
#[derive(Error, Debug)]
pub enum CoverfitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The file carries no ID3v2 header
    #[error("No ID3 tag in {0}")]
    NoTag(PathBuf),

    /// The tag exists but could not be read
    #[error("Tag read failed for {path}: {message}")]
    TagRead { path: PathBuf, message: String },

    /// The updated tag could not be persisted
    #[error("Tag write failed for {path}: {message}")]
    TagWrite { path: PathBuf, message: String },

    /// Artwork bytes could not be identified or decoded
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Re-encoding the artwork failed
    #[error("Image encode error: {0}")]
    ImageEncode(String),

    /// The run root is missing or not a directory
    #[error("Not a directory: {0}")]
    InvalidDirectory(PathBuf),

    /// A run was requested while another is still active
    #[error("A run is already in progress")]
    RunInProgress,

    /// Walking the directory tree failed at the root
    #[error("Discovery failed under {path}: {message}")]
    Discovery { path: PathBuf, message: String },
}

/// Convenience type alias for coverfit results.
pub type Result<T> = std::result::Result<T, CoverfitError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
