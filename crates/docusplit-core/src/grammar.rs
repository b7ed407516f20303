//! Byte-level literals of the DOCU compound archive format.
//!
//! The format has no published grammar. What is known:
//!
//! ```text
//! <preamble> **%%DOCU <header lines> _SIG/D.C. <payload> **%%DOCU ...
//! ```
//!
//! Header lines are `KEY/value`, split at the first `/`. Payloads may end
//! with a stray `**` or a truncated delimiter left over from the writer.

use memchr::memmem;

/// Token separating sections. Bytes before the first one are preamble.
pub const DELIMITER: &[u8] = b"**%%DOCU";

/// Token separating a section's metadata header from its payload.
pub const SIGNATURE_MARKER: &[u8] = b"_SIG/D.C.";

/// Separator between a metadata key and its value.
pub const KEY_VALUE_SEPARATOR: char = '/';

/// Literal trailer some writers leave after a payload.
pub const TRAILING_STARS: &[u8] = b"**";

/// Returns the offset of the first signature marker in `haystack`.
#[must_use]
pub fn find_signature(haystack: &[u8]) -> Option<usize> {
    memmem::find(haystack, SIGNATURE_MARKER)
}

/// Strips a trailing delimiter remnant from a payload.
///
/// Removes, in order: a complete delimiter token at the end; otherwise the
/// longest proper prefix of the delimiter (at least two bytes) the payload
/// ends with; then a literal `**` trailer. A single trailing `*` is left
/// alone since it is indistinguishable from data.
#[must_use]
pub fn strip_trailing_remnant(payload: &[u8]) -> &[u8] {
    let mut end = payload.len();

    if payload.ends_with(DELIMITER) {
        end -= DELIMITER.len();
    } else if let Some(len) = (2..DELIMITER.len())
        .rev()
        .find(|&len| payload.ends_with(&DELIMITER[..len]))
    {
        end -= len;
    }

    let trimmed = &payload[..end];
    trimmed.strip_suffix(TRAILING_STARS).unwrap_or(trimmed)
}

/// Text flavour of [`strip_trailing_remnant`].
#[must_use]
pub fn strip_trailing_remnant_str(text: &str) -> &str {
    let stripped = strip_trailing_remnant(text.as_bytes());
    // Remnants are pure ASCII, so the cut always lands on a char boundary.
    &text[..stripped.len()]
}

/// Decodes bytes as ISO-8859-1: each byte becomes the code point of the
/// same value.
///
/// The format carries no encoding declaration. Multi-byte encodings in
/// headers or text payloads are not detected and come out as mojibake.
#[must_use]
pub fn decode_single_byte(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Printable ASCII or one of tab, line feed, carriage return.
#[must_use]
pub const fn is_text_byte(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7E | b'\t' | b'\n' | b'\r')
}

/// [`is_text_byte`] widened with the printable Latin-1 range.
#[must_use]
pub const fn is_extended_text_byte(byte: u8) -> bool {
    is_text_byte(byte) || byte >= 0xA0
}
