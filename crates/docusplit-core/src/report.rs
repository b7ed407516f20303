//! Operation reports and progress reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::record::EmbeddedFileRecord;

/// Result of parsing an archive.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Recovered records, in section discovery order.
    pub records: Vec<EmbeddedFileRecord>,

    /// Number of sections the scanner emitted.
    pub sections_scanned: usize,

    /// Number of sections dropped as malformed.
    pub sections_dropped: usize,

    /// Total bytes read from the source.
    pub bytes_read: u64,

    /// Duration of the parse.
    pub duration: Duration,

    /// Warnings generated during parsing.
    pub warnings: Vec<String>,
}

impl ParseReport {
    /// Creates a new empty parse report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Sum of the record sizes.
    #[must_use]
    pub fn total_content_bytes(&self) -> u64 {
        self.records.iter().map(|r| r.size() as u64).sum()
    }
}

/// A single file that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Zero-based index of the section the record came from.
    pub section_index: usize,

    /// Target path, or the declared name when no path was resolved.
    pub path: PathBuf,

    /// Stable error code, as in [`crate::DocuError::code`].
    pub code: &'static str,

    /// Human-readable reason.
    pub reason: String,
}

/// Result of writing records to disk.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of files successfully written.
    pub files_written: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Number of records skipped because their path escaped the root.
    pub files_skipped: usize,

    /// Per-file write failures.
    pub failures: Vec<FileFailure>,

    /// Paths written, in record order.
    pub written: Vec<PathBuf>,

    /// Duration of the extraction.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns whether every record was written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.files_skipped == 0 && self.failures.is_empty()
    }

    /// Returns total number of records processed.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_written + self.files_skipped + self.failures.len()
    }
}

/// Callback trait for progress reporting while parsing.
///
/// The trait requires `Send` to allow use in multi-threaded contexts.
///
/// # Examples
///
/// ```
/// use docusplit_core::EmbeddedFileRecord;
/// use docusplit_core::ProgressCallback;
///
/// struct SimpleProgress {
///     bytes: u64,
/// }
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_bytes_read(&mut self, bytes: u64) {
///         self.bytes += bytes;
///     }
///
///     fn on_record(&mut self, record: &EmbeddedFileRecord) {
///         println!("Recovered: {}", record.filename());
///     }
///
///     fn on_complete(&mut self) {
///         println!("Read {} bytes", self.bytes);
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called after each read from the source.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Number of bytes read in this update
    fn on_bytes_read(&mut self, bytes: u64);

    /// Called for each record, in discovery order.
    fn on_record(&mut self, record: &EmbeddedFileRecord);

    /// Called when the source has been fully consumed.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback` that does nothing.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_bytes_read(&mut self, _bytes: u64) {}

    fn on_record(&mut self, _record: &EmbeddedFileRecord) {}

    fn on_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reports() {
        let parse = ParseReport::new();
        assert!(parse.records.is_empty());
        assert_eq!(parse.total_content_bytes(), 0);
        assert!(!parse.has_warnings());

        let extraction = ExtractionReport::new();
        assert_eq!(extraction.files_written, 0);
        assert!(extraction.is_complete());
    }

    #[test]
    fn test_add_warning() {
        let mut report = ExtractionReport::new();
        report.add_warning("Test warning".to_string());
        assert!(report.has_warnings());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_total_items() {
        let mut report = ExtractionReport::new();
        report.files_written = 4;
        report.files_skipped = 1;
        report.failures.push(FileFailure {
            section_index: 2,
            path: PathBuf::from("x"),
            code: "WRITE_FAILED",
            reason: "disk full".into(),
        });
        assert_eq!(report.total_items(), 6);
        assert!(!report.is_complete());
    }
}
