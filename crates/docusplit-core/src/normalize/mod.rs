//! Content normalization.
//!
//! The declared `TYPE`/`DOCTYPE` picks a recovery strategy; each strategy
//! strips the writer noise around a payload using heuristics, since the
//! format has no grammar for payload framing.

pub mod image;
pub mod text;
pub mod xml;

use std::fmt;

use crate::diagnostics::DiagnosticSink;
use crate::record::Payload;

use self::image::ImageCodec;
use self::image::default_codec;
use self::image::normalize_image;
use self::text::normalize_plain_text;
use self::xml::normalize_xml;

/// Recovery strategy selected from the declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Image stream.
    Image,
    /// Plain text.
    PlainText,
    /// XML document or form data.
    Xml,
    /// Anything else; passed through untouched.
    Binary,
}

impl ContentKind {
    /// Classifies a section from its declared type and doctype.
    ///
    /// Matching is a case-insensitive substring test against `IMAGE`,
    /// `PLAINTEXT`, `XML` and `FORM`, in that order, on either field.
    ///
    /// # Examples
    ///
    /// ```
    /// use docusplit_core::normalize::ContentKind;
    ///
    /// assert_eq!(ContentKind::classify("SCANNED_IMAGE", ""), ContentKind::Image);
    /// assert_eq!(ContentKind::classify("", "PDF_FORM"), ContentKind::Xml);
    /// assert_eq!(ContentKind::classify("ARCHIVE", "ZIP"), ContentKind::Binary);
    /// ```
    #[must_use]
    pub fn classify(declared_type: &str, doctype: &str) -> Self {
        const RULES: [(&str, ContentKind); 4] = [
            ("IMAGE", ContentKind::Image),
            ("PLAINTEXT", ContentKind::PlainText),
            ("XML", ContentKind::Xml),
            ("FORM", ContentKind::Xml),
        ];

        let declared_type = declared_type.to_ascii_uppercase();
        let doctype = doctype.to_ascii_uppercase();

        RULES
            .iter()
            .find(|(needle, _)| declared_type.contains(needle) || doctype.contains(needle))
            .map_or(Self::Binary, |(_, kind)| *kind)
    }

    /// Lowercase name for reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::PlainText => "text",
            Self::Xml => "xml",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`ContentNormalizer::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Cleaned payload.
    pub payload: Payload,
    /// Replacement extension when the detected format disagrees with the
    /// declared one.
    pub corrected_extension: Option<&'static str>,
}

/// Dispatches payloads to the recovery strategy for their declared type.
///
/// Holds the injected image codec; everything else is stateless, so one
/// normalizer can be shared by every worker.
pub struct ContentNormalizer {
    codec: Box<dyn ImageCodec>,
}

impl fmt::Debug for ContentNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentNormalizer")
            .field("codec", &self.codec.name())
            .finish()
    }
}

impl Default for ContentNormalizer {
    fn default() -> Self {
        Self::new(default_codec())
    }
}

impl ContentNormalizer {
    /// Creates a normalizer using `codec` for image payloads.
    #[must_use]
    pub fn new(codec: Box<dyn ImageCodec>) -> Self {
        Self { codec }
    }

    /// Name of the injected image codec.
    #[must_use]
    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    /// Recovers a clean payload for `kind`.
    ///
    /// Never fails: every strategy degrades to returning its input.
    pub fn normalize(
        &self,
        kind: ContentKind,
        raw: &[u8],
        declared_extension: &str,
        sink: &dyn DiagnosticSink,
        context: &str,
    ) -> Normalized {
        match kind {
            ContentKind::Image => {
                let image =
                    normalize_image(raw, declared_extension, self.codec.as_ref(), sink, context);
                Normalized {
                    payload: Payload::Binary(image.bytes),
                    corrected_extension: image.corrected_extension,
                }
            }
            ContentKind::PlainText => Normalized {
                payload: Payload::Text(normalize_plain_text(raw)),
                corrected_extension: None,
            },
            ContentKind::Xml => Normalized {
                payload: Payload::Text(normalize_xml(raw)),
                corrected_extension: None,
            },
            ContentKind::Binary => Normalized {
                payload: Payload::Binary(raw.to_vec()),
                corrected_extension: None,
            },
        }
    }
}
