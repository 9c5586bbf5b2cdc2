//! CLI enum types for the process command.

use clap::ValueEnum;
use coverfit_core::ReportFormat as CoreReportFormat;

/// Supported report formats.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Single JSON document with the summary and every file
    #[default]
    Json,
    /// One JSON object per file (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<ReportFormat> for CoreReportFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => CoreReportFormat::Json,
            ReportFormat::Jsonl => CoreReportFormat::JsonLines,
        }
    }
}
