//! Structured diagnostics emitted while parsing and extracting.
//!
//! Recoverable problems (a section without a signature marker, a metadata
//! line without a separator, an image the codec could not read) never stop
//! the pipeline. They are reported as [`Diagnostic`] events through an
//! injectable [`DiagnosticSink`], so callers decide whether to log them,
//! collect them or ignore them.

use std::fmt;
use std::sync::Mutex;
use std::sync::PoisonError;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational: the pipeline changed something on purpose.
    Info,
    /// Something was skipped or recovered heuristically.
    Warning,
}

/// Kind of event being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// A section had no signature marker and was dropped.
    MalformedSection,
    /// A metadata line had no separator or an empty key.
    MalformedMetadataLine,
    /// The image codec rejected a payload; the byte-signature scan was used.
    CodecFailure,
    /// The declared extension was replaced by the detected image format.
    ExtensionCorrected,
    /// A record's output path escaped the destination and was skipped.
    PathTraversalRejected,
    /// A filename was rewritten to make it safe for the filesystem.
    FilenameSanitized,
    /// A single output file could not be written.
    WriteFailed,
    /// The byte source failed mid-stream; the pending section was discarded.
    StreamAborted,
}

impl DiagnosticCode {
    /// Returns the stable string form of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedSection => "MALFORMED_SECTION",
            Self::MalformedMetadataLine => "MALFORMED_METADATA_LINE",
            Self::CodecFailure => "CODEC_FAILURE",
            Self::ExtensionCorrected => "EXTENSION_CORRECTED",
            Self::PathTraversalRejected => "PATH_TRAVERSAL_REJECTED",
            Self::FilenameSanitized => "FILENAME_SANITIZED",
            Self::WriteFailed => "WRITE_FAILED",
            Self::StreamAborted => "STREAM_ABORTED",
        }
    }

    /// Returns the default severity of this code.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::ExtensionCorrected | Self::FilenameSanitized => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structured diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What happened.
    pub code: DiagnosticCode,
    /// Human-readable description.
    pub message: String,
    /// Where it happened (section index, filename, path).
    pub context: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic without context.
    #[must_use]
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attaches context to the diagnostic.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the severity implied by the code.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "[{}] {} ({context})", self.code, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Receiver for diagnostic events.
///
/// Sinks take `&self` and must be `Sync` because sections are normalized on
/// a worker pool that shares one sink.
///
/// # Examples
///
/// ```
/// use docusplit_core::diagnostics::Diagnostic;
/// use docusplit_core::diagnostics::DiagnosticSink;
///
/// struct PrintSink;
///
/// impl DiagnosticSink for PrintSink {
///     fn emit(&self, diagnostic: Diagnostic) {
///         eprintln!("{diagnostic}");
///     }
/// }
/// ```
pub trait DiagnosticSink: Send + Sync {
    /// Receives one diagnostic.
    fn emit(&self, diagnostic: Diagnostic);
}

/// Sink that discards every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn emit(&self, _diagnostic: Diagnostic) {}
}

/// Sink that forwards diagnostics to the `log` facade.
///
/// Warnings go to `log::warn!`, informational events to `log::info!`, both
/// under the `docusplit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => log::warn!(target: "docusplit", "{diagnostic}"),
            Severity::Info => log::info!(target: "docusplit", "{diagnostic}"),
        }
    }
}

/// Sink that records every diagnostic in memory.
///
/// Used by tests to assert on emitted events and by the CLI to print them
/// after an operation completes.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all diagnostics received so far.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many diagnostics with `code` were received.
    #[must_use]
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| d.code == code)
            .count()
    }

    /// Removes and returns all collected diagnostics.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
