//! Writing recovered records to disk.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::DocuError;
use crate::Result;
use crate::assembler::sentinel_filename;
use crate::config::ExtractConfig;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticCode;
use crate::diagnostics::DiagnosticSink;
use crate::record::EmbeddedFileRecord;
use crate::report::ExtractionReport;
use crate::report::FileFailure;
use crate::types::DestDir;
use crate::types::SafeName;

/// Outcome of writing one record.
#[derive(Debug)]
enum WriteOutcome {
    Written { path: PathBuf, bytes: u64 },
    Skipped,
    Failed(FileFailure),
}

/// Writes [`EmbeddedFileRecord`]s into a validated destination directory.
///
/// The destination is validated once, on construction, before anything is
/// written. After that, every problem is local to one record: rejected
/// paths are skipped and failed writes are recorded, and the batch always
/// runs to the end.
///
/// Files are flat: each record becomes exactly one file directly under the
/// root. Existing files are overwritten, so extracting the same records
/// twice succeeds. When two records sanitize to the same name the later one
/// wins.
///
/// # Examples
///
/// ```no_run
/// use docusplit_core::DiskExtractor;
/// use docusplit_core::ExtractConfig;
/// use docusplit_core::diagnostics::LogSink;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = DiskExtractor::new("/tmp/recovered", ExtractConfig::default())?;
/// let report = extractor.extract(&[], &LogSink);
/// assert_eq!(report.files_written, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DiskExtractor {
    dest: DestDir,
    config: ExtractConfig,
}

impl DiskExtractor {
    /// Validates `dest` (creating it when allowed) and returns an extractor
    /// writing into it.
    ///
    /// # Errors
    ///
    /// Returns [`DocuError::DestinationInvalid`] if the path is empty, is an
    /// existing non-directory, cannot be created, or is not writable.
    pub fn new(dest: impl AsRef<Path>, config: ExtractConfig) -> Result<Self> {
        let dest = DestDir::prepare(dest, config.create_missing)?;
        Ok(Self { dest, config })
    }

    /// The validated destination root.
    #[must_use]
    pub fn dest(&self) -> &DestDir {
        &self.dest
    }

    /// Writes every record and reports the outcome per file.
    pub fn extract(
        &self,
        records: &[EmbeddedFileRecord],
        sink: &dyn DiagnosticSink,
    ) -> ExtractionReport {
        let start = Instant::now();
        let mut report = ExtractionReport::new();

        for record in records {
            match self.write_record(record, sink) {
                WriteOutcome::Written { path, bytes } => {
                    report.files_written += 1;
                    report.bytes_written += bytes;
                    report.written.push(path);
                }
                WriteOutcome::Skipped => {
                    report.files_skipped += 1;
                    report.add_warning(format!(
                        "skipped section {}: '{}' escapes the destination",
                        record.section_index(),
                        record.filename()
                    ));
                }
                WriteOutcome::Failed(failure) => {
                    report.add_warning(format!(
                        "failed to write {}: {}",
                        failure.path.display(),
                        failure.reason
                    ));
                    report.failures.push(failure);
                }
            }
        }

        report.duration = start.elapsed();
        report
    }

    /// Sanitized on-disk name for `record`, falling back to the sentinel
    /// name when the declared one sanitizes to nothing.
    #[must_use]
    pub fn output_name(&self, record: &EmbeddedFileRecord) -> Option<SafeName> {
        let placeholder = self.config.placeholder;
        SafeName::sanitize(record.filename(), placeholder).or_else(|| {
            let sentinel = sentinel_filename(
                record.guid(),
                record.sha1(),
                record.section_index(),
                record.extension(),
            );
            SafeName::sanitize(&sentinel, placeholder)
        })
    }

    fn write_record(&self, record: &EmbeddedFileRecord, sink: &dyn DiagnosticSink) -> WriteOutcome {
        let context = format!("section {}", record.section_index());

        let Some(name) = self.output_name(record) else {
            let err = DocuError::PathTraversal {
                path: PathBuf::from(record.filename()),
            };
            return reject(record, &err, sink, &context);
        };

        if name.as_str() != record.filename() {
            sink.emit(
                Diagnostic::new(
                    DiagnosticCode::FilenameSanitized,
                    format!("'{}' written as '{name}'", record.filename()),
                )
                .with_context(context.as_str()),
            );
        }

        let path = match self.dest.resolve(&name) {
            Ok(path) => path,
            Err(err) => return reject(record, &err, sink, &context),
        };

        let bytes = record.content().as_bytes();
        if let Err(source) = fs::write(&path, bytes) {
            let err = DocuError::WriteFailed {
                path: path.clone(),
                source,
            };
            sink.emit(
                Diagnostic::new(DiagnosticCode::WriteFailed, err.to_string()).with_context(context),
            );
            return WriteOutcome::Failed(FileFailure {
                section_index: record.section_index(),
                path,
                code: err.code(),
                reason: err.to_string(),
            });
        }

        WriteOutcome::Written {
            path,
            bytes: bytes.len() as u64,
        }
    }
}

fn reject(
    record: &EmbeddedFileRecord,
    err: &DocuError,
    sink: &dyn DiagnosticSink,
    context: &str,
) -> WriteOutcome {
    sink.emit(
        Diagnostic::new(
            DiagnosticCode::PathTraversalRejected,
            format!("'{}' rejected: {err}", record.filename()),
        )
        .with_context(context),
    );
    WriteOutcome::Skipped
}
