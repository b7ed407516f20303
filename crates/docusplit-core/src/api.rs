//! High-level public API for parsing archives and writing their contents.

use std::fs::File;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Instant;

use rayon::prelude::*;

use crate::DocuError;
use crate::Result;
use crate::assembler::LineLocator;
use crate::assembler::RecordAssembler;
use crate::config::ExtractConfig;
use crate::config::ParseConfig;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticCode;
use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::Severity;
use crate::extract::DiskExtractor;
use crate::record::EmbeddedFileRecord;
use crate::record::SourcePosition;
use crate::report::ExtractionReport;
use crate::report::NoopProgress;
use crate::report::ParseReport;
use crate::report::ProgressCallback;
use crate::scanner::RawSection;
use crate::scanner::SectionScanner;

/// Parses an archive file in streaming mode.
///
/// The file is read in [`ParseConfig::chunk_size`] pieces, so memory use is
/// bounded by the largest section rather than the file size. Records carry
/// [`SourcePosition::Unavailable`]; use [`parse_document`] when line
/// positions are needed.
///
/// # Errors
///
/// Returns [`DocuError::SourceNotFound`] or [`DocuError::SourceAccessDenied`]
/// when the file cannot be opened, and [`DocuError::Io`] when a read fails
/// mid-stream. Malformed sections are never errors; they are dropped and
/// reported through `sink`.
///
/// # Examples
///
/// ```no_run
/// use docusplit_core::ParseConfig;
/// use docusplit_core::diagnostics::LogSink;
/// use docusplit_core::parse_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = parse_archive("bundle.docu", &ParseConfig::default(), &LogSink)?;
/// for record in &report.records {
///     println!("{} ({} bytes)", record.filename(), record.size());
/// }
/// # Ok(())
/// # }
/// ```
pub fn parse_archive<P: AsRef<Path>>(
    archive_path: P,
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
) -> Result<ParseReport> {
    parse_archive_with_progress(archive_path, config, sink, &mut NoopProgress)
}

/// Parses an archive file with progress reporting.
///
/// # Errors
///
/// Same as [`parse_archive`].
pub fn parse_archive_with_progress<P: AsRef<Path>>(
    archive_path: P,
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
    progress: &mut dyn ProgressCallback,
) -> Result<ParseReport> {
    parse_archive_with_assembler(
        archive_path,
        &RecordAssembler::default(),
        config,
        sink,
        progress,
    )
}

/// Parses an archive file with a caller-supplied [`RecordAssembler`].
///
/// # Errors
///
/// Same as [`parse_archive`].
pub fn parse_archive_with_assembler<P: AsRef<Path>>(
    archive_path: P,
    assembler: &RecordAssembler,
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
    progress: &mut dyn ProgressCallback,
) -> Result<ParseReport> {
    let path = archive_path.as_ref();
    let file = File::open(path).map_err(|e| DocuError::from_source_io(e, path))?;
    parse_reader_with_assembler(file, assembler, config, sink, progress)
}

/// Parses any byte source in streaming mode.
///
/// If the source fails mid-stream, the section still being accumulated is
/// discarded, a [`DiagnosticCode::StreamAborted`] event is emitted and the
/// read error is returned.
///
/// # Errors
///
/// Returns [`DocuError::Io`] when reading from `reader` fails.
///
/// # Examples
///
/// ```
/// use docusplit_core::ParseConfig;
/// use docusplit_core::diagnostics::NoopSink;
/// use docusplit_core::parse_reader;
///
/// let input: &[u8] = b"**%%DOCUFILENAME/a.txt\nTYPE/OTHER\n_SIG/D.C.payload**";
/// let report = parse_reader(input, &ParseConfig::default(), &NoopSink).unwrap();
/// assert_eq!(report.records.len(), 1);
/// assert_eq!(report.records[0].content().as_bytes(), b"payload");
/// ```
pub fn parse_reader<R: Read>(
    reader: R,
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
) -> Result<ParseReport> {
    parse_reader_with_progress(reader, config, sink, &mut NoopProgress)
}

/// Parses any byte source in streaming mode with progress reporting.
///
/// # Errors
///
/// Same as [`parse_reader`].
pub fn parse_reader_with_progress<R: Read>(
    reader: R,
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
    progress: &mut dyn ProgressCallback,
) -> Result<ParseReport> {
    parse_reader_with_assembler(reader, &RecordAssembler::default(), config, sink, progress)
}

/// Parses any byte source with a caller-supplied [`RecordAssembler`].
///
/// This is the entry point for choosing the image codec: build the
/// assembler from a [`ContentNormalizer`](crate::ContentNormalizer) around
/// any [`ImageCodec`](crate::normalize::image::ImageCodec).
///
/// # Errors
///
/// Same as [`parse_reader`].
///
/// # Examples
///
/// ```
/// use docusplit_core::ContentNormalizer;
/// use docusplit_core::NoopProgress;
/// use docusplit_core::ParseConfig;
/// use docusplit_core::RecordAssembler;
/// use docusplit_core::diagnostics::NoopSink;
/// use docusplit_core::normalize::image::SignatureCodec;
/// use docusplit_core::parse_reader_with_assembler;
///
/// let assembler = RecordAssembler::new(ContentNormalizer::new(Box::new(SignatureCodec)));
/// let input: &[u8] = b"**%%DOCUFILENAME/a.txt\nTYPE/OTHER\n_SIG/D.C.payload**";
/// let report = parse_reader_with_assembler(
///     input,
///     &assembler,
///     &ParseConfig::default(),
///     &NoopSink,
///     &mut NoopProgress,
/// )
/// .unwrap();
/// assert_eq!(report.records.len(), 1);
/// ```
pub fn parse_reader_with_assembler<R: Read>(
    mut reader: R,
    assembler: &RecordAssembler,
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
    progress: &mut dyn ProgressCallback,
) -> Result<ParseReport> {
    let start = Instant::now();
    let recorder = WarningRecorder::new(sink);
    let mut report = ParseReport::new();
    let mut scanner = SectionScanner::new();
    let mut buf = vec![0u8; config.effective_chunk_size()];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                let discarded = scanner.abandon();
                recorder.emit(Diagnostic::new(
                    DiagnosticCode::StreamAborted,
                    format!("source failed mid-stream, {discarded} pending bytes discarded: {e}"),
                ));
                return Err(DocuError::Io(e));
            }
        };

        report.bytes_read += n as u64;
        progress.on_bytes_read(n as u64);

        let closed = scanner.feed(&buf[..n]);
        let batch = closed
            .into_iter()
            .map(|section| (section, SourcePosition::Unavailable))
            .collect();
        collect_batch(assembler, batch, config, &recorder, &mut report, progress);
    }

    if let Some(last) = scanner.finish() {
        let batch = vec![(last, SourcePosition::Unavailable)];
        collect_batch(assembler, batch, config, &recorder, &mut report, progress);
    }

    progress.on_complete();
    report.warnings = recorder.into_warnings();
    report.duration = start.elapsed();
    Ok(report)
}

/// Parses a complete in-memory archive.
///
/// With the whole document available, every record carries
/// [`SourcePosition::Lines`]: the start line is one plus the number of line
/// feeds before the section, the end line adds the line feeds inside it.
/// Sections are located in document order, so a section whose bytes repeat
/// an earlier one gets its own position rather than the earlier one's.
///
/// `config.chunk_size` is ignored.
///
/// # Examples
///
/// ```
/// use docusplit_core::ParseConfig;
/// use docusplit_core::diagnostics::NoopSink;
/// use docusplit_core::parse_document;
///
/// let doc = b"preamble\n**%%DOCU\nTYPE/OTHER\n_SIG/D.C.\ndata\n";
/// let report = parse_document(doc, &ParseConfig::default(), &NoopSink);
/// let lines = report.records[0].position().lines().unwrap();
/// assert_eq!((lines.start, lines.end), (2, 6));
/// ```
#[must_use]
pub fn parse_document(
    document: &[u8],
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
) -> ParseReport {
    parse_document_with_assembler(document, &RecordAssembler::default(), config, sink)
}

/// Parses a complete in-memory archive with a caller-supplied
/// [`RecordAssembler`].
///
/// Positions are computed as in [`parse_document`].
#[must_use]
pub fn parse_document_with_assembler(
    document: &[u8],
    assembler: &RecordAssembler,
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
) -> ParseReport {
    let start = Instant::now();
    let recorder = WarningRecorder::new(sink);
    let mut report = ParseReport::new();
    let mut scanner = SectionScanner::new();

    let mut sections = scanner.feed(document);
    sections.extend(scanner.finish());

    let mut locator = LineLocator::new(document);
    let batch = sections
        .into_iter()
        .map(|section| {
            let position = locator
                .locate(section.bytes())
                .map_or(SourcePosition::Unavailable, SourcePosition::Lines);
            (section, position)
        })
        .collect();

    report.bytes_read = document.len() as u64;
    collect_batch(
        assembler,
        batch,
        config,
        &recorder,
        &mut report,
        &mut NoopProgress,
    );

    report.warnings = recorder.into_warnings();
    report.duration = start.elapsed();
    report
}

/// Writes records into `output_dir`.
///
/// # Errors
///
/// Returns [`DocuError::DestinationInvalid`] when the destination cannot be
/// used; nothing is written in that case. Per-file problems are reported in
/// the returned [`ExtractionReport`] and through `sink`.
///
/// # Examples
///
/// ```no_run
/// use docusplit_core::ExtractConfig;
/// use docusplit_core::ParseConfig;
/// use docusplit_core::diagnostics::LogSink;
/// use docusplit_core::extract_records;
/// use docusplit_core::parse_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let parsed = parse_archive("bundle.docu", &ParseConfig::default(), &LogSink)?;
/// let report = extract_records(&parsed.records, "/tmp/out", &ExtractConfig::default(), &LogSink)?;
/// println!("Wrote {} files", report.files_written);
/// # Ok(())
/// # }
/// ```
pub fn extract_records<P: AsRef<Path>>(
    records: &[EmbeddedFileRecord],
    output_dir: P,
    config: &ExtractConfig,
    sink: &dyn DiagnosticSink,
) -> Result<ExtractionReport> {
    let extractor = DiskExtractor::new(output_dir, config.clone())?;
    Ok(extractor.extract(records, sink))
}

/// Assembles one batch of closed sections and appends the results in
/// discovery order.
fn collect_batch(
    assembler: &RecordAssembler,
    batch: Vec<(RawSection, SourcePosition)>,
    config: &ParseConfig,
    sink: &dyn DiagnosticSink,
    report: &mut ParseReport,
    progress: &mut dyn ProgressCallback,
) {
    if batch.is_empty() {
        return;
    }
    report.sections_scanned += batch.len();

    // Indexed parallel iterators keep input order on collect.
    let assembled: Vec<Option<EmbeddedFileRecord>> = if config.parallel && batch.len() > 1 {
        batch
            .par_iter()
            .map(|(section, position)| assembler.assemble_at(section, *position, sink))
            .collect()
    } else {
        batch
            .iter()
            .map(|(section, position)| assembler.assemble_at(section, *position, sink))
            .collect()
    };

    for record in assembled {
        match record {
            Some(record) => {
                progress.on_record(&record);
                report.records.push(record);
            }
            None => report.sections_dropped += 1,
        }
    }
}

/// Forwards diagnostics and keeps the warning-level ones for the report.
struct WarningRecorder<'a> {
    inner: &'a dyn DiagnosticSink,
    warnings: Mutex<Vec<String>>,
}

impl<'a> WarningRecorder<'a> {
    fn new(inner: &'a dyn DiagnosticSink) -> Self {
        Self {
            inner,
            warnings: Mutex::new(Vec::new()),
        }
    }

    fn into_warnings(self) -> Vec<String> {
        self.warnings
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for WarningRecorder<'_> {
    fn emit(&self, diagnostic: Diagnostic) {
        if diagnostic.severity() == Severity::Warning {
            self.warnings
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(diagnostic.to_string());
        }
        self.inner.emit(diagnostic);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::diagnostics::NoopSink;
    use std::io;

    const TWO_SECTIONS: &[u8] =
        b"head**%%DOCUFILENAME/a.bin\nTYPE/OTHER\n_SIG/D.C.AAAA**%%DOCUFILENAME/b.bin\nTYPE/OTHER\n_SIG/D.C.BBBB**";

    /// Yields its data, then fails.
    struct FailingReader {
        data: &'static [u8],
        done: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.done {
                return Err(io::Error::other("connection reset"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.done = true;
            Ok(n)
        }
    }

    #[test]
    fn test_parse_reader_basic() {
        let report = parse_reader(TWO_SECTIONS, &ParseConfig::default(), &NoopSink).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.sections_scanned, 2);
        assert_eq!(report.sections_dropped, 0);
        assert_eq!(report.bytes_read, TWO_SECTIONS.len() as u64);
        assert_eq!(report.records[0].content().as_bytes(), b"AAAA");
        assert_eq!(report.records[1].content().as_bytes(), b"BBBB");
    }

    #[test]
    fn test_tiny_chunks_same_result() {
        let whole = parse_reader(TWO_SECTIONS, &ParseConfig::default(), &NoopSink).unwrap();
        let config = ParseConfig::default().with_chunk_size(1);
        let tiny = parse_reader(TWO_SECTIONS, &config, &NoopSink).unwrap();
        assert_eq!(whole.records, tiny.records);
    }

    #[test]
    fn test_stream_abort_discards_pending() {
        let sink = CollectingSink::new();
        let reader = FailingReader {
            data: b"**%%DOCUTYPE/OTHER\n_SIG/D.C.partial",
            done: false,
        };

        let result = parse_reader(reader, &ParseConfig::default(), &sink);

        assert!(matches!(result, Err(DocuError::Io(_))));
        assert_eq!(sink.count(DiagnosticCode::StreamAborted), 1);
        assert_eq!(sink.count(DiagnosticCode::MalformedSection), 0);
    }

    #[test]
    fn test_malformed_section_recorded_as_warning() {
        let input: &[u8] = b"**%%DOCUno marker here**%%DOCUTYPE/OTHER\n_SIG/D.C.ok";
        let sink = CollectingSink::new();
        let report = parse_reader(input, &ParseConfig::default(), &sink).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.sections_dropped, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("MALFORMED_SECTION"));
        assert_eq!(sink.count(DiagnosticCode::MalformedSection), 1);
    }

    #[test]
    fn test_parse_document_positions() {
        let doc = b"pre\n**%%DOCUTYPE/OTHER\n_SIG/D.C.x\n**%%DOCUTYPE/OTHER\n_SIG/D.C.x\n";
        let report = parse_document(doc, &ParseConfig::default(), &NoopSink);
        let first = report.records[0].position().lines().unwrap();
        let second = report.records[1].position().lines().unwrap();
        assert_eq!((first.start, first.end), (2, 4));
        assert_eq!((second.start, second.end), (4, 6));
    }

    #[test]
    fn test_streaming_positions_unavailable() {
        let report = parse_reader(TWO_SECTIONS, &ParseConfig::default(), &NoopSink).unwrap();
        assert!(
            report
                .records
                .iter()
                .all(|r| r.position() == SourcePosition::Unavailable)
        );
    }

    #[test]
    fn test_missing_source() {
        let result = parse_archive(
            "/definitely/not/here.docu",
            &ParseConfig::default(),
            &NoopSink,
        );
        assert!(matches!(result, Err(DocuError::SourceNotFound { .. })));
    }

    #[test]
    fn test_no_delimiter_no_records() {
        let report = parse_reader(
            &b"just some bytes"[..],
            &ParseConfig::default(),
            &NoopSink,
        )
        .unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.sections_scanned, 0);
    }
}
