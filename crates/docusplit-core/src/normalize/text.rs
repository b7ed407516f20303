//! Plain-text payload recovery.

use crate::grammar::SIGNATURE_MARKER;
use crate::grammar::decode_single_byte;
use crate::grammar::find_signature;
use crate::grammar::is_extended_text_byte;
use crate::grammar::is_text_byte;
use crate::grammar::strip_trailing_remnant_str;

/// Shortest run of text bytes accepted as the start of real content.
pub const MIN_TEXT_RUN: usize = 10;

/// Returns the offset of the first run of at least [`MIN_TEXT_RUN`]
/// consecutive text bytes.
#[must_use]
pub fn find_text_run(bytes: &[u8]) -> Option<usize> {
    let mut run_start = 0;
    let mut run_len = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if is_text_byte(byte) {
            if run_len == 0 {
                run_start = i;
            }
            run_len += 1;
            if run_len >= MIN_TEXT_RUN {
                return Some(run_start);
            }
        } else {
            run_len = 0;
        }
    }

    None
}

/// Recovers readable text from a raw payload.
///
/// Tried in order:
/// 1. decode from the first run of [`MIN_TEXT_RUN`] text bytes;
/// 2. decode after an embedded signature marker, skipping leading bytes
///    outside the extended text range;
/// 3. decode everything, skipping leading non-text bytes.
///
/// The result has trailing delimiter remnants stripped and surrounding
/// whitespace trimmed.
///
/// # Examples
///
/// ```
/// use docusplit_core::normalize::text::normalize_plain_text;
///
/// let raw = b"\x00\x01\x02\x03\x04Hello, world\r\n**";
/// assert_eq!(normalize_plain_text(raw), "Hello, world");
/// ```
#[must_use]
pub fn normalize_plain_text(raw: &[u8]) -> String {
    let decoded = if let Some(start) = find_text_run(raw) {
        decode_single_byte(&raw[start..])
    } else if let Some(marker) = find_signature(raw) {
        let after = &raw[marker + SIGNATURE_MARKER.len()..];
        let skip = after
            .iter()
            .position(|&b| is_extended_text_byte(b))
            .unwrap_or(after.len());
        decode_single_byte(&after[skip..])
    } else {
        let skip = raw
            .iter()
            .position(|&b| is_text_byte(b))
            .unwrap_or(raw.len());
        decode_single_byte(&raw[skip..])
    };

    clean_text_tail(&decoded).to_string()
}

/// Strips whitespace and delimiter remnants from both ends of `text`.
pub(crate) fn clean_text_tail(text: &str) -> &str {
    strip_trailing_remnant_str(text.trim_end()).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_text_run() {
        assert_eq!(find_text_run(b"\x00\x01abcdefghij"), Some(2));
        assert_eq!(find_text_run(b"abc\x00defghijklm"), Some(4));
        assert_eq!(find_text_run(b"short\x00run"), None);
        assert_eq!(find_text_run(b""), None);
    }

    #[test]
    fn test_whitespace_counts_toward_run() {
        assert_eq!(find_text_run(b"\x00a\tb\r\nc d e f"), Some(1));
    }

    #[test]
    fn test_noise_before_text_removed() {
        let mut raw = vec![0x00, 0x01, 0x02, 0x03, 0x04];
        raw.extend_from_slice(b"Hello World!");
        assert_eq!(normalize_plain_text(&raw), "Hello World!");
    }

    #[test]
    fn test_marker_branch() {
        // The marker is only 9 text bytes, one short of a run.
        let mut raw = vec![0x01, b'x', 0x02];
        raw.extend_from_slice(b"_SIG/D.C.");
        raw.extend_from_slice(&[0x85, 0xE9, b'a', 0x00, b'b']);
        assert_eq!(normalize_plain_text(&raw), "\u{e9}a\u{0}b");
    }

    #[test]
    fn test_last_resort_branch() {
        let raw = [0x00, 0x01, b'h', b'i', 0x02, b'!'];
        assert_eq!(normalize_plain_text(&raw), "hi\u{2}!");
    }

    #[test]
    fn test_trailing_remnants_and_whitespace() {
        assert_eq!(
            normalize_plain_text(b"  some longer text  \r\n**%%DO"),
            "some longer text"
        );
        assert_eq!(
            normalize_plain_text(b"some longer text**\r\n"),
            "some longer text"
        );
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(normalize_plain_text(b""), "");
        assert_eq!(normalize_plain_text(&[0x00, 0x01]), "");
    }
}
