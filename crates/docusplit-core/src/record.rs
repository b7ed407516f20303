//! Embedded file records.

use std::fmt;

/// Normalized content of an embedded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw bytes (images, unknown types).
    Binary(Vec<u8>),
    /// Decoded text (plain text, XML, forms). Written out as UTF-8.
    Text(String),
}

impl Payload {
    /// The bytes that will be written to disk.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Binary(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }

    /// The decoded text, for text payloads.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Binary(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Whether this payload holds decoded text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Length in bytes of [`as_bytes`](Self::as_bytes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 1-based line span of a section inside the full document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    /// First line of the section.
    pub start: usize,
    /// Start plus the number of line breaks inside the section.
    pub end: usize,
}

/// Where a record came from in the source document.
///
/// Streaming parses never see the whole document, so they cannot compute
/// line offsets and say so explicitly instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourcePosition {
    /// Position not available (streaming mode).
    #[default]
    Unavailable,
    /// Line span computed with full-document context.
    Lines(LineRange),
}

impl SourcePosition {
    /// Returns the line span, if known.
    #[must_use]
    pub const fn lines(&self) -> Option<LineRange> {
        match self {
            Self::Unavailable => None,
            Self::Lines(range) => Some(*range),
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("unavailable (streaming)"),
            Self::Lines(range) => write!(f, "lines {}-{}", range.start, range.end),
        }
    }
}

/// One embedded file recovered from an archive.
///
/// Immutable once assembled. `size` always equals the byte length of the
/// content and the filename is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFileRecord {
    pub(crate) section_index: usize,
    pub(crate) filename: String,
    pub(crate) extension: String,
    pub(crate) declared_type: String,
    pub(crate) doctype: String,
    pub(crate) sha1: String,
    pub(crate) guid: String,
    pub(crate) env_guid: String,
    pub(crate) content: Payload,
    pub(crate) position: SourcePosition,
}

impl EmbeddedFileRecord {
    /// Zero-based index of the section this record came from.
    #[must_use]
    pub fn section_index(&self) -> usize {
        self.section_index
    }

    /// Filename (declared, corrected, or the generated sentinel).
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Extension without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Declared `TYPE`.
    #[must_use]
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    /// Declared `DOCTYPE`.
    #[must_use]
    pub fn doctype(&self) -> &str {
        &self.doctype
    }

    /// Declared SHA-1, empty when absent.
    #[must_use]
    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    /// Declared GUID.
    #[must_use]
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Declared environment GUID.
    #[must_use]
    pub fn env_guid(&self) -> &str {
        &self.env_guid
    }

    /// Normalized content.
    #[must_use]
    pub fn content(&self) -> &Payload {
        &self.content
    }

    /// Content length in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Position in the source document.
    #[must_use]
    pub fn position(&self) -> SourcePosition {
        self.position
    }
}
