//! Test utilities for building synthetic archives.
//!
//! This module provides reusable helpers for creating in-memory DOCU
//! documents, shared by unit tests, integration tests and benchmarks.
//!
//! # Panics
//!
//! Functions in this module may panic on encoding errors since they are
//! designed for test use only where panics are acceptable.

#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation
)]

use crate::grammar::DELIMITER;
use crate::grammar::SIGNATURE_MARKER;

/// Builder for DOCU documents.
///
/// Every section is written as `DELIMITER`, CRLF-terminated `KEY/value`
/// lines, the signature marker, then the payload. The document ends with a
/// closing delimiter unless [`unterminated`](Self::unterminated) is set.
///
/// # Examples
///
/// ```
/// use docusplit_core::test_utils::DocumentBuilder;
///
/// let doc = DocumentBuilder::new()
///     .preamble(b"writer junk")
///     .section(&[("FILENAME", "a.txt"), ("TYPE", "PLAINTEXT")], b"hello world!")
///     .build();
/// assert!(doc.starts_with(b"writer junk**%%DOCU"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct DocumentBuilder {
    preamble: Vec<u8>,
    sections: Vec<Vec<u8>>,
    unterminated: bool,
}

impl DocumentBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bytes before the first delimiter.
    #[must_use]
    pub fn preamble(mut self, bytes: &[u8]) -> Self {
        self.preamble = bytes.to_vec();
        self
    }

    /// Adds a well-formed section.
    #[must_use]
    pub fn section(mut self, headers: &[(&str, &str)], payload: &[u8]) -> Self {
        let mut bytes = framed(headers, payload);
        bytes.extend_from_slice(b"\r\n");
        self.sections.push(bytes);
        self
    }

    /// Adds a section whose payload runs straight into the next delimiter,
    /// so the recovered content is exactly `payload`.
    #[must_use]
    pub fn bare_section(mut self, headers: &[(&str, &str)], payload: &[u8]) -> Self {
        self.sections.push(framed(headers, payload));
        self
    }

    /// Adds a section verbatim, without a marker or any framing.
    #[must_use]
    pub fn raw_section(mut self, bytes: &[u8]) -> Self {
        self.sections.push(bytes.to_vec());
        self
    }

    /// Omits the closing delimiter, leaving the last section to be flushed
    /// at end of input.
    #[must_use]
    pub fn unterminated(mut self) -> Self {
        self.unterminated = true;
        self
    }

    /// Renders the document.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut out = self.preamble;
        for section in &self.sections {
            out.extend_from_slice(DELIMITER);
            out.extend_from_slice(section);
        }
        if !self.unterminated {
            out.extend_from_slice(DELIMITER);
        }
        out
    }
}

fn framed(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8> {
    let mut bytes = b"\r\n".to_vec();
    for (key, value) in headers {
        bytes.extend_from_slice(key.as_bytes());
        bytes.push(b'/');
        bytes.extend_from_slice(value.as_bytes());
        bytes.extend_from_slice(b"\r\n");
    }
    bytes.extend_from_slice(SIGNATURE_MARKER);
    bytes.extend_from_slice(payload);
    bytes
}

/// A JPEG-looking stream: SOI, APP0/JFIF header, then filler and EOI.
///
/// Not decodable; only its signature is meaningful.
#[must_use]
pub fn jpeg_like_stream(filler: usize) -> Vec<u8> {
    let mut bytes = vec![
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x00, 0x00,
    ];
    bytes.extend(std::iter::repeat_n(0x42, filler));
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

/// A decodable PNG of the given size.
#[cfg(feature = "image-codec")]
#[must_use]
pub fn encoded_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Png)
}

/// A decodable JPEG of the given size.
#[cfg(feature = "image-codec")]
#[must_use]
pub fn encoded_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Jpeg)
}

#[cfg(feature = "image-codec")]
fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 40) as u8, (y * 40) as u8, 128])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}
