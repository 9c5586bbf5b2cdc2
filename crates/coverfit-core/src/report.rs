//! Machine-readable run reports.
//!
//! A report is either a single JSON document (summary plus every file
//! outcome) or JSON Lines with one outcome per line, suitable for `jq`.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::types::{ProcessingOutcome, RunSummary};

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One JSON object holding the summary and all outcomes
    Json,
    /// One outcome object per line (newline-delimited JSON)
    JsonLines,
}

#[derive(Serialize)]
struct RunReport<'a> {
    version: &'static str,
    summary: &'a RunSummary,
    files: &'a [ProcessingOutcome],
}

/// Serializes the outcomes of a run.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pretty: bool,
}

impl ReportWriter<BufWriter<File>> {
    /// Create (or truncate) a report file.
    pub fn create(path: &Path, format: ReportFormat) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), format, true))
    }
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects the JSON format; JSONL is always one line per record.
    pub fn new(writer: W, format: ReportFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write a complete report and flush.
    pub fn write_run(
        &mut self,
        summary: &RunSummary,
        outcomes: &[ProcessingOutcome],
    ) -> Result<()> {
        match self.format {
            ReportFormat::Json => {
                let report = RunReport {
                    version: crate::VERSION,
                    summary,
                    files: outcomes,
                };
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, &report)?;
                } else {
                    serde_json::to_writer(&mut self.writer, &report)?;
                }
                writeln!(self.writer)?;
            }
            ReportFormat::JsonLines => {
                for outcome in outcomes {
                    serde_json::to_writer(&mut self.writer, outcome)?;
                    writeln!(self.writer)?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
