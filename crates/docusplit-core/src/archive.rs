//! Archive types and builders.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::DocuError;
use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::ParseConfig;
use crate::ParseReport;
use crate::RecordAssembler;
use crate::Result;
use crate::diagnostics::DiagnosticSink;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;

/// Represents an archive file with associated configuration.
///
/// Clones share one [`RecordAssembler`].
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    parse_config: ParseConfig,
    extract_config: ExtractConfig,
    assembler: Arc<RecordAssembler>,
}

impl Archive {
    /// Creates a new `Archive` from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`DocuError::SourceNotFound`] or
    /// [`DocuError::SourceAccessDenied`] if the file cannot be inspected.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        std::fs::metadata(path).map_err(|e| DocuError::from_source_io(e, path))?;
        Ok(Self {
            path: path.to_path_buf(),
            parse_config: ParseConfig::default(),
            extract_config: ExtractConfig::default(),
            assembler: Arc::new(RecordAssembler::default()),
        })
    }

    /// Replaces the parse configuration.
    #[must_use]
    pub fn with_parse_config(mut self, config: ParseConfig) -> Self {
        self.parse_config = config;
        self
    }

    /// Replaces the extraction configuration.
    #[must_use]
    pub fn with_extract_config(mut self, config: ExtractConfig) -> Self {
        self.extract_config = config;
        self
    }

    /// Replaces the record assembler, and with it the image codec.
    #[must_use]
    pub fn with_assembler(mut self, assembler: RecordAssembler) -> Self {
        self.assembler = Arc::new(assembler);
        self
    }

    /// Returns the path to the archive file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parse configuration.
    #[must_use]
    pub fn parse_config(&self) -> &ParseConfig {
        &self.parse_config
    }

    /// Returns the extraction configuration.
    #[must_use]
    pub fn extract_config(&self) -> &ExtractConfig {
        &self.extract_config
    }

    /// Returns the record assembler.
    #[must_use]
    pub fn assembler(&self) -> &RecordAssembler {
        &self.assembler
    }

    /// Parses the archive in streaming mode.
    ///
    /// # Errors
    ///
    /// See [`crate::parse_archive`].
    pub fn parse(&self, sink: &dyn DiagnosticSink) -> Result<ParseReport> {
        self.parse_with_progress(sink, &mut NoopProgress)
    }

    /// Parses the archive in streaming mode with progress reporting.
    ///
    /// # Errors
    ///
    /// See [`crate::parse_archive`].
    pub fn parse_with_progress(
        &self,
        sink: &dyn DiagnosticSink,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ParseReport> {
        crate::api::parse_archive_with_assembler(
            &self.path,
            &self.assembler,
            &self.parse_config,
            sink,
            progress,
        )
    }

    /// Parses the archive and writes every record into `output_dir`.
    ///
    /// The destination is validated before the source is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is invalid or the source cannot
    /// be read.
    pub fn extract<P: AsRef<Path>>(
        &self,
        output_dir: P,
        sink: &dyn DiagnosticSink,
    ) -> Result<(ParseReport, ExtractionReport)> {
        let extractor = crate::DiskExtractor::new(output_dir, self.extract_config.clone())?;
        let parsed = self.parse(sink)?;
        let extracted = extractor.extract(&parsed.records, sink);
        Ok((parsed, extracted))
    }
}

/// Builder for configuring archive extraction.
///
/// # Examples
///
/// ```no_run
/// use docusplit_core::ArchiveBuilder;
/// use docusplit_core::ParseConfig;
/// use docusplit_core::diagnostics::LogSink;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (parsed, extracted) = ArchiveBuilder::new()
///     .archive("bundle.docu")
///     .output_dir("/tmp/output")
///     .parse_config(ParseConfig::default().with_parallel(false))
///     .extract(&LogSink)?;
/// println!("{} of {} records written", extracted.files_written, parsed.records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    archive_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    parse_config: Option<ParseConfig>,
    extract_config: Option<ExtractConfig>,
    assembler: Option<RecordAssembler>,
}

impl ArchiveBuilder {
    /// Creates a new `ArchiveBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive file path.
    #[must_use]
    pub fn archive<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.archive_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the parse configuration.
    #[must_use]
    pub fn parse_config(mut self, config: ParseConfig) -> Self {
        self.parse_config = Some(config);
        self
    }

    /// Sets the extraction configuration.
    #[must_use]
    pub fn extract_config(mut self, config: ExtractConfig) -> Self {
        self.extract_config = Some(config);
        self
    }

    /// Sets the record assembler, for example to pick an image codec.
    #[must_use]
    pub fn assembler(mut self, assembler: RecordAssembler) -> Self {
        self.assembler = Some(assembler);
        self
    }

    /// Builds the [`Archive`] without extracting.
    ///
    /// # Errors
    ///
    /// Returns an error if `archive_path` is not set or cannot be opened.
    pub fn build(self) -> Result<Archive> {
        let archive_path = self
            .archive_path
            .ok_or_else(|| DocuError::InvalidConfiguration {
                reason: "archive path not set".to_string(),
            })?;

        Ok(Archive::open(archive_path)?
            .with_parse_config(self.parse_config.unwrap_or_default())
            .with_extract_config(self.extract_config.unwrap_or_default())
            .with_assembler(self.assembler.unwrap_or_default()))
    }

    /// Executes the extraction with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `archive_path` or `output_dir` are not set,
    /// or if parsing or destination validation fails.
    pub fn extract(mut self, sink: &dyn DiagnosticSink) -> Result<(ParseReport, ExtractionReport)> {
        let output_dir = self
            .output_dir
            .take()
            .ok_or_else(|| DocuError::InvalidConfiguration {
                reason: "output directory not set".to_string(),
            })?;

        self.build()?.extract(output_dir, sink)
    }
}
