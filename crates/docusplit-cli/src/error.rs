//! Error conversion utilities for CLI.
//!
//! Converts docusplit-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use docusplit_core::DocuError;
use std::path::Path;

/// Converts `DocuError` to a user-friendly anyhow error with context
pub fn convert_docu_error(err: DocuError, archive: &Path) -> anyhow::Error {
    match err {
        DocuError::SourceNotFound { path } => {
            anyhow!(
                "Archive not found: {}\n\
                 HINT: Check the path and try again.",
                path.display()
            )
        }
        DocuError::SourceAccessDenied { path } => {
            anyhow!(
                "Cannot read archive '{}': permission denied\n\
                 HINT: Check the file permissions or run as a user that can read it.",
                path.display()
            )
        }
        DocuError::DestinationInvalid { path, reason } => {
            anyhow!(
                "Cannot extract '{}' into '{}': {}\n\
                 HINT: Choose an existing writable directory, or drop --no-create to create it.",
                archive.display(),
                path.display(),
                reason
            )
        }
        DocuError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Archive '{}' names a file outside the output directory: '{}'\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                archive.display(),
                path.display()
            )
        }
        DocuError::Io(io_err) => {
            anyhow!(
                "I/O error while reading '{}': {}\n\
                 HINT: Files recovered before the failure were not written.",
                archive.display(),
                io_err
            )
        }
        DocuError::InvalidConfiguration { reason } => {
            anyhow!("Invalid configuration: {reason}")
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Adds context to a library result about archive operations
pub fn add_archive_context<T>(
    result: Result<T, DocuError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_docu_error(e, archive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_source_not_found() {
        let err = DocuError::SourceNotFound {
            path: PathBuf::from("missing.docu"),
        };
        let converted = convert_docu_error(err, Path::new("missing.docu"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("Archive not found"));
        assert!(msg.contains("missing.docu"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_destination_invalid() {
        let err = DocuError::DestinationInvalid {
            path: PathBuf::from("/out"),
            reason: "not a directory".to_string(),
        };
        let converted = convert_docu_error(err, Path::new("bundle.docu"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("not a directory"));
        assert!(msg.contains("bundle.docu"));
        assert!(msg.contains("--no-create"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated");
        let converted = convert_docu_error(DocuError::Io(io_err), Path::new("bundle.docu"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn test_other_errors_keep_context() {
        let err = DocuError::CodecFailure("bad huffman table".to_string());
        let converted = convert_docu_error(err, Path::new("bundle.docu"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("bundle.docu"));
        assert!(msg.contains("bad huffman table"));
    }
}
