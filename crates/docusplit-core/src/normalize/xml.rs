//! XML and form payload recovery.

use crate::grammar::decode_single_byte;
use crate::normalize::text::clean_text_tail;

/// Literals marking the start of an XML document, in priority order.
pub const XML_START_LITERALS: [&str; 3] = ["<?xml", "<xdp:xdp", "<xfa:datasets"];

/// Recovers an XML document from a raw payload.
///
/// Slices from the first literal in [`XML_START_LITERALS`] that occurs,
/// checking them in order, then strips trailing delimiter remnants and
/// whitespace. Without any start literal the whole payload is returned,
/// trimmed.
///
/// Payloads are decoded one byte per character like every other text in
/// the format, even when the declaration names a multi-byte encoding.
///
/// # Examples
///
/// ```
/// use docusplit_core::normalize::xml::normalize_xml;
///
/// let raw = b"\x00\x07junk<?xml version=\"1.0\"?><a/>\r\n**";
/// assert_eq!(normalize_xml(raw), "<?xml version=\"1.0\"?><a/>");
/// ```
#[must_use]
pub fn normalize_xml(raw: &[u8]) -> String {
    let decoded = decode_single_byte(raw);

    XML_START_LITERALS
        .iter()
        .find_map(|literal| decoded.find(literal))
        .map_or_else(
            || decoded.trim().to_string(),
            |start| clean_text_tail(&decoded[start..]).to_string(),
        )
}
