//! Error types for archive parsing and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `DocuError`.
pub type Result<T> = std::result::Result<T, DocuError>;

/// Errors that can occur while parsing a compound archive or writing its
/// embedded files.
///
/// Only source access and destination validation failures abort an
/// operation. The remaining variants describe per-section or per-file
/// problems; the pipeline reports them through the diagnostic sink and
/// keeps going.
#[derive(Error, Debug)]
pub enum DocuError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive source does not exist.
    #[error("archive not found: {path}")]
    SourceNotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// The archive source exists but cannot be read.
    #[error("access denied reading archive: {path}")]
    SourceAccessDenied {
        /// The unreadable source path.
        path: PathBuf,
    },

    /// The extraction destination cannot be used.
    #[error("invalid destination {path}: {reason}")]
    DestinationInvalid {
        /// The destination path as given.
        path: PathBuf,
        /// Why the destination was rejected.
        reason: String,
    },

    /// A resolved output path escaped the destination root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path.
        path: PathBuf,
    },

    /// Writing a single embedded file failed.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        /// The path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A section had no signature marker.
    #[error("malformed section {index}: missing signature marker")]
    MalformedSection {
        /// Zero-based section index.
        index: usize,
    },

    /// The image codec rejected a payload.
    #[error("image codec failure: {0}")]
    CodecFailure(String),

    /// An operation was started without a required setting.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is missing or wrong.
        reason: String,
    },
}

impl DocuError {
    /// Returns a stable machine-readable code for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use docusplit_core::DocuError;
    /// use std::path::PathBuf;
    ///
    /// let err = DocuError::SourceNotFound {
    ///     path: PathBuf::from("missing.docu"),
    /// };
    /// assert_eq!(err.code(), "SOURCE_NOT_FOUND");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::SourceNotFound { .. } => "SOURCE_NOT_FOUND",
            Self::SourceAccessDenied { .. } => "SOURCE_ACCESS_DENIED",
            Self::DestinationInvalid { .. } => "DESTINATION_INVALID",
            Self::PathTraversal { .. } => "PATH_TRAVERSAL",
            Self::WriteFailed { .. } => "WRITE_FAILED",
            Self::MalformedSection { .. } => "MALFORMED_SECTION",
            Self::CodecFailure(_) => "CODEC_FAILURE",
            Self::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use docusplit_core::DocuError;
    /// use std::path::PathBuf;
    ///
    /// let err = DocuError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = DocuError::CodecFailure("truncated".into());
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Returns `true` if processing can continue past this error.
    ///
    /// Recoverable errors affect a single section or a single output file.
    /// Source and destination errors abort the whole operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use docusplit_core::DocuError;
    /// use std::path::PathBuf;
    ///
    /// let err = DocuError::MalformedSection { index: 3 };
    /// assert!(err.is_recoverable());
    ///
    /// let err = DocuError::DestinationInvalid {
    ///     path: PathBuf::from("out"),
    ///     reason: "not a directory".into(),
    /// };
    /// assert!(!err.is_recoverable());
    /// ```
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. }
                | Self::WriteFailed { .. }
                | Self::MalformedSection { .. }
                | Self::CodecFailure(_)
        )
    }

    /// Returns a context string for this error, if available.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::DestinationInvalid { reason, .. } | Self::InvalidConfiguration { reason } => {
                Some(reason)
            }
            Self::CodecFailure(msg) => Some(msg),
            _ => None,
        }
    }

    /// Classifies an I/O error raised while opening an archive source.
    ///
    /// Not-found and permission errors get their own variants so callers can
    /// tell them apart; anything else stays a plain I/O error.
    #[must_use]
    pub fn from_source_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::SourceNotFound { path: path.into() },
            std::io::ErrorKind::PermissionDenied => Self::SourceAccessDenied { path: path.into() },
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = DocuError::MalformedSection { index: 2 };
        assert_eq!(
            err.to_string(),
            "malformed section 2: missing signature marker"
        );
    }

    #[test]
    fn test_path_traversal_error() {
        let err = DocuError::PathTraversal {
            path: PathBuf::from("../etc/passwd"),
        };
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../etc/passwd"));
        assert!(err.is_security_violation());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::other("disk on fire");
        let err: DocuError = io_err.into();
        assert!(matches!(err, DocuError::Io(_)));
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[test]
    fn test_source_io_classification() {
        let err = DocuError::from_source_io(
            io::Error::new(io::ErrorKind::NotFound, "gone"),
            "a.docu",
        );
        assert!(matches!(err, DocuError::SourceNotFound { .. }));

        let err = DocuError::from_source_io(
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
            "a.docu",
        );
        assert!(matches!(err, DocuError::SourceAccessDenied { .. }));

        let err = DocuError::from_source_io(
            io::Error::new(io::ErrorKind::InvalidData, "weird"),
            "a.docu",
        );
        assert!(matches!(err, DocuError::Io(_)));
    }

    #[test]
    fn test_fatal_errors_not_recoverable() {
        let err = DocuError::SourceNotFound {
            path: PathBuf::from("x"),
        };
        assert!(!err.is_recoverable());

        let err = DocuError::SourceAccessDenied {
            path: PathBuf::from("x"),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_context() {
        let err = DocuError::DestinationInvalid {
            path: PathBuf::from("out"),
            reason: "not writable".into(),
        };
        assert_eq!(err.context(), Some("not writable"));

        let err = DocuError::CodecFailure("bad huffman table".into());
        assert_eq!(err.context(), Some("bad huffman table"));

        let err = DocuError::MalformedSection { index: 0 };
        assert_eq!(err.context(), None);
    }

    #[test]
    fn test_write_failed_source_chain() {
        use std::error::Error;

        let err = DocuError::WriteFailed {
            path: PathBuf::from("out/a.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("out/a.txt"));
    }
}
