//! Streaming recovery of embedded files from DOCU compound archives.
//!
//! A DOCU archive concatenates embedded files (images, text, XML forms),
//! each preceded by an inline `KEY/value` header. `docusplit-core` scans the
//! byte stream for section delimiters, parses each header, recovers a clean
//! payload per declared type and writes the results into a destination
//! directory with path containment enforced.
//!
//! # Pipeline
//!
//! ```text
//! bytes ─▶ SectionScanner ─▶ RecordAssembler ─▶ EmbeddedFileRecord ─▶ DiskExtractor
//!                              │        │
//!                     parse_metadata  ContentNormalizer
//! ```
//!
//! Problems local to one section or one file never abort an operation; they
//! are reported through a [`DiagnosticSink`](diagnostics::DiagnosticSink).
//!
//! # Examples
//!
//! ```no_run
//! use docusplit_core::ExtractConfig;
//! use docusplit_core::ParseConfig;
//! use docusplit_core::diagnostics::LogSink;
//! use docusplit_core::extract_records;
//! use docusplit_core::parse_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let parsed = parse_archive("bundle.docu", &ParseConfig::default(), &LogSink)?;
//! let report = extract_records(&parsed.records, "/output/dir", &ExtractConfig::default(), &LogSink)?;
//! println!("Recovered {} files", report.files_written);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod assembler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod grammar;
pub mod metadata;
pub mod normalize;
pub mod record;
pub mod report;
pub mod scanner;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::extract_records;
pub use api::parse_archive;
pub use api::parse_archive_with_assembler;
pub use api::parse_archive_with_progress;
pub use api::parse_document;
pub use api::parse_document_with_assembler;
pub use api::parse_reader;
pub use api::parse_reader_with_assembler;
pub use api::parse_reader_with_progress;
pub use archive::Archive;
pub use archive::ArchiveBuilder;
pub use assembler::RecordAssembler;
pub use config::ExtractConfig;
pub use config::ParseConfig;
pub use error::DocuError;
pub use error::Result;
pub use extract::DiskExtractor;
pub use metadata::MetadataMap;
pub use normalize::ContentKind;
pub use normalize::ContentNormalizer;
pub use record::EmbeddedFileRecord;
pub use record::LineRange;
pub use record::Payload;
pub use record::SourcePosition;
pub use report::ExtractionReport;
pub use report::FileFailure;
pub use report::NoopProgress;
pub use report::ParseReport;
pub use report::ProgressCallback;
pub use scanner::RawSection;
pub use scanner::SectionScanner;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::SafeName;
