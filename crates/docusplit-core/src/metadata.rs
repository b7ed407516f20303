//! Metadata header parsing.
//!
//! A section header is a block of `KEY/value` lines preceding the signature
//! marker. Keys are unique (last occurrence wins); values may themselves
//! contain `/`, so lines are split at the first separator only.

use std::collections::BTreeMap;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticCode;
use crate::diagnostics::DiagnosticSink;
use crate::grammar::KEY_VALUE_SEPARATOR;
use crate::grammar::decode_single_byte;

/// Well-known metadata keys.
pub mod keys {
    /// Declared filename.
    pub const FILENAME: &str = "FILENAME";
    /// Declared extension.
    pub const EXT: &str = "EXT";
    /// Declared content type.
    pub const TYPE: &str = "TYPE";
    /// Secondary classification.
    pub const DOCTYPE: &str = "DOCTYPE";
    /// SHA-1 of the original file, as recorded by the writer.
    pub const SHA1: &str = "SHA1";
    /// Document GUID.
    pub const GUID: &str = "GUID";
    /// Environment GUID.
    pub const ENV_GUID: &str = "ENV_GUID";
}

/// Parsed key/value metadata of one section.
///
/// Lookups never fail: a missing key reads as the empty string through
/// [`get_or_empty`](Self::get_or_empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataMap {
    entries: BTreeMap<String, String>,
}

impl MetadataMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns the value for `key`, or `""` when absent.
    #[must_use]
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the map back into header text, one `KEY/value` line per
    /// entry in key order.
    #[must_use]
    pub fn to_header_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push(KEY_VALUE_SEPARATOR);
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Encodes [`to_header_text`](Self::to_header_text) as single-byte
    /// text, the way headers appear inside an archive.
    ///
    /// Parsing the result with [`parse_metadata`] yields an identical map.
    /// Characters above U+00FF cannot be represented and become `?`.
    #[must_use]
    pub fn to_header_bytes(&self) -> Vec<u8> {
        self.to_header_text()
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }
}

/// Parses a raw header block into a [`MetadataMap`].
///
/// The block is decoded as single-byte text and split into lines. Blank
/// lines are skipped silently. Lines without a separator and lines with an
/// empty key are skipped with a [`DiagnosticCode::MalformedMetadataLine`]
/// event. Never fails: empty or garbage input yields an empty map.
///
/// # Examples
///
/// ```
/// use docusplit_core::diagnostics::NoopSink;
/// use docusplit_core::metadata::parse_metadata;
///
/// let map = parse_metadata(b"FILENAME/a/b.txt\r\nTYPE/PLAINTEXT\r\n", &NoopSink);
/// assert_eq!(map.get("FILENAME"), Some("a/b.txt"));
/// assert_eq!(map.get_or_empty("SHA1"), "");
/// ```
pub fn parse_metadata(header: &[u8], sink: &dyn DiagnosticSink) -> MetadataMap {
    let text = decode_single_byte(header);
    let mut map = MetadataMap::new();

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(KEY_VALUE_SEPARATOR) else {
            sink.emit(
                Diagnostic::new(
                    DiagnosticCode::MalformedMetadataLine,
                    format!("metadata line has no '{KEY_VALUE_SEPARATOR}' separator"),
                )
                .with_context(format!("line {}: {line}", line_no + 1)),
            );
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            sink.emit(
                Diagnostic::new(DiagnosticCode::MalformedMetadataLine, "metadata key is empty")
                    .with_context(format!("line {}: {line}", line_no + 1)),
            );
            continue;
        }

        map.insert(key, value.trim());
    }

    map
}
