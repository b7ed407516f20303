//! Output formatter trait for CLI results.

use anyhow::Result;
use docusplit_core::EmbeddedFileRecord;
use docusplit_core::ExtractionReport;
use docusplit_core::ParseReport;
use docusplit_core::diagnostics::Diagnostic;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the outcome of parsing and writing an archive
    fn format_extraction_result(
        &self,
        parsed: &ParseReport,
        extracted: &ExtractionReport,
        diagnostics: &[Diagnostic],
    ) -> Result<()>;

    /// Format a listing with one filename per line
    fn format_listing_short(&self, report: &ParseReport) -> Result<()>;

    /// Format a detailed listing
    fn format_listing_long(&self, report: &ParseReport, human_readable: bool) -> Result<()>;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    /// Some records could not be written.
    Partial,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn new(operation: impl Into<String>, status: Status, data: T) -> Self {
        Self {
            operation: operation.into(),
            status,
            data: Some(data),
        }
    }

    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self::new(operation, Status::Success, data)
    }
}

/// Serializable view of one recovered record.
#[derive(Debug, Serialize)]
pub struct RecordEntry {
    pub section_index: usize,
    pub filename: String,
    pub extension: String,
    pub declared_type: String,
    pub doctype: String,
    pub size: usize,
    pub sha1: String,
    pub guid: String,
    pub env_guid: String,
    pub position: String,
}

impl From<&EmbeddedFileRecord> for RecordEntry {
    fn from(record: &EmbeddedFileRecord) -> Self {
        Self {
            section_index: record.section_index(),
            filename: record.filename().to_string(),
            extension: record.extension().to_string(),
            declared_type: record.declared_type().to_string(),
            doctype: record.doctype().to_string(),
            size: record.size(),
            sha1: record.sha1().to_string(),
            guid: record.guid().to_string(),
            env_guid: record.env_guid().to_string(),
            position: record.position().to_string(),
        }
    }
}

/// Serializable view of one diagnostic.
#[derive(Debug, Serialize)]
pub struct DiagnosticEntry {
    pub code: &'static str,
    pub severity: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl From<&Diagnostic> for DiagnosticEntry {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            code: diagnostic.code.as_str(),
            severity: match diagnostic.severity() {
                docusplit_core::diagnostics::Severity::Info => "info",
                docusplit_core::diagnostics::Severity::Warning => "warning",
            },
            message: diagnostic.message.clone(),
            context: diagnostic.context.clone(),
        }
    }
}
