//! JSON output formatter for machine-readable results.

use super::formatter::DiagnosticEntry;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::RecordEntry;
use super::formatter::Status;
use anyhow::Result;
use docusplit_core::ExtractionReport;
use docusplit_core::ParseReport;
use docusplit_core::diagnostics::Diagnostic;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn listing(report: &ParseReport) -> Result<()> {
        #[derive(Serialize)]
        struct ListingOutput {
            records: Vec<RecordEntry>,
            sections_scanned: usize,
            sections_dropped: usize,
            total_size: u64,
            warnings: Vec<String>,
        }

        let data = ListingOutput {
            records: report.records.iter().map(RecordEntry::from).collect(),
            sections_scanned: report.sections_scanned,
            sections_dropped: report.sections_dropped,
            total_size: report.total_content_bytes(),
            warnings: report.warnings.clone(),
        };

        Self::output(&JsonOutput::success("list", data))
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(
        &self,
        parsed: &ParseReport,
        extracted: &ExtractionReport,
        diagnostics: &[Diagnostic],
    ) -> Result<()> {
        #[derive(Serialize)]
        struct FailureEntry {
            section_index: usize,
            path: String,
            code: &'static str,
            reason: String,
        }

        #[derive(Serialize)]
        struct ExtractionOutput {
            records_found: usize,
            sections_scanned: usize,
            sections_dropped: usize,
            files_written: usize,
            files_skipped: usize,
            bytes_read: u64,
            bytes_written: u64,
            duration_ms: u128,
            written: Vec<String>,
            failures: Vec<FailureEntry>,
            warnings: Vec<String>,
            diagnostics: Vec<DiagnosticEntry>,
        }

        let mut warnings = parsed.warnings.clone();
        warnings.extend(extracted.warnings.iter().cloned());

        let data = ExtractionOutput {
            records_found: parsed.records.len(),
            sections_scanned: parsed.sections_scanned,
            sections_dropped: parsed.sections_dropped,
            files_written: extracted.files_written,
            files_skipped: extracted.files_skipped,
            bytes_read: parsed.bytes_read,
            bytes_written: extracted.bytes_written,
            duration_ms: (parsed.duration + extracted.duration).as_millis(),
            written: extracted
                .written
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            failures: extracted
                .failures
                .iter()
                .map(|f| FailureEntry {
                    section_index: f.section_index,
                    path: f.path.display().to_string(),
                    code: f.code,
                    reason: f.reason.clone(),
                })
                .collect(),
            warnings,
            diagnostics: diagnostics.iter().map(DiagnosticEntry::from).collect(),
        };

        let status = if extracted.is_complete() {
            Status::Success
        } else {
            Status::Partial
        };
        Self::output(&JsonOutput::new("extract", status, data))
    }

    fn format_listing_short(&self, report: &ParseReport) -> Result<()> {
        Self::listing(report)
    }

    fn format_listing_long(&self, report: &ParseReport, _human_readable: bool) -> Result<()> {
        Self::listing(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use docusplit_core::diagnostics::DiagnosticCode;

    #[test]
    fn test_json_output_structure() {
        #[derive(Serialize)]
        struct TestData {
            value: String,
        }

        let output = JsonOutput::success(
            "list",
            TestData {
                value: "test".to_string(),
            },
        );
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["operation"], "list");
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["value"], "test");
    }

    #[test]
    fn test_diagnostic_entry() {
        let diagnostic = Diagnostic::new(DiagnosticCode::FilenameSanitized, "renamed")
            .with_context("section 2");
        let json = serde_json::to_value(DiagnosticEntry::from(&diagnostic)).unwrap();
        assert_eq!(json["code"], "FILENAME_SANITIZED");
        assert_eq!(json["severity"], "info");
        assert_eq!(json["context"], "section 2");
    }

    #[test]
    fn test_partial_status_serializes_lowercase() {
        let output = JsonOutput::new("extract", Status::Partial, ());
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["status"], "partial");
    }
}
