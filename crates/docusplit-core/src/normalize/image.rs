//! Image payload recovery.
//!
//! Image payloads usually carry a few bytes of writer noise in front of the
//! real stream. A codec is tried first; if it cannot make sense of the
//! bytes, the payload is cut at the first RIFF or JPEG start-of-image
//! signature instead.

use memchr::memmem;

use crate::DocuError;
use crate::Result;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticCode;
use crate::diagnostics::DiagnosticSink;

/// RIFF container magic (WebP and friends).
pub const RIFF_MAGIC: &[u8] = &[0x52, 0x49, 0x46, 0x46];

/// JPEG start-of-image marker.
pub const JPEG_SOI: &[u8] = &[0xFF, 0xD8];

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Image container formats the pipeline can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// JPEG / JFIF.
    Jpeg,
    /// PNG.
    Png,
    /// GIF87a / GIF89a.
    Gif,
    /// WebP in a RIFF container.
    WebP,
    /// Windows bitmap.
    Bmp,
    /// TIFF, either byte order.
    Tiff,
}

impl ImageFormat {
    /// Canonical file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tif",
        }
    }

    /// Detects a format from the leading magic bytes.
    #[must_use]
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(RIFF_MAGIC) && &bytes[8..12] == b"WEBP" {
            Some(Self::WebP)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(Self::Tiff)
        } else {
            None
        }
    }
}

/// What a codec learned about an image stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Detected container format.
    pub format: ImageFormat,
    /// Pixel dimensions, when the codec decoded the stream.
    pub dimensions: Option<(u32, u32)>,
}

/// Abstract image codec capability.
///
/// Implementations report the detected format of a byte stream and fail with
/// [`DocuError::CodecFailure`] when the stream is unrecognized or corrupt.
/// Failures are never fatal: the normalizer falls back to a signature scan.
pub trait ImageCodec: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Identifies and validates an image stream.
    fn inspect(&self, bytes: &[u8]) -> Result<ImageInfo>;
}

/// Codec that only looks at leading magic bytes.
///
/// It never decodes pixels, so it accepts truncated streams with a valid
/// header. Used when the `image-codec` feature is off and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureCodec;

impl ImageCodec for SignatureCodec {
    fn name(&self) -> &'static str {
        "signature"
    }

    fn inspect(&self, bytes: &[u8]) -> Result<ImageInfo> {
        ImageFormat::from_magic(bytes)
            .map(|format| ImageInfo {
                format,
                dimensions: None,
            })
            .ok_or_else(|| DocuError::CodecFailure("no known image signature at offset 0".into()))
    }
}

/// Codec backed by the `image` crate: guesses the format and decodes the
/// full stream to validate it.
#[cfg(feature = "image-codec")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateCodec;

#[cfg(feature = "image-codec")]
impl ImageCodec for ImageCrateCodec {
    fn name(&self) -> &'static str {
        "image"
    }

    fn inspect(&self, bytes: &[u8]) -> Result<ImageInfo> {
        let guessed =
            image::guess_format(bytes).map_err(|e| DocuError::CodecFailure(e.to_string()))?;

        let format = match guessed {
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Gif => ImageFormat::Gif,
            image::ImageFormat::WebP => ImageFormat::WebP,
            image::ImageFormat::Bmp => ImageFormat::Bmp,
            image::ImageFormat::Tiff => ImageFormat::Tiff,
            other => {
                return Err(DocuError::CodecFailure(format!(
                    "unsupported image format: {other:?}"
                )));
            }
        };

        let decoded = image::load_from_memory_with_format(bytes, guessed)
            .map_err(|e| DocuError::CodecFailure(e.to_string()))?;

        Ok(ImageInfo {
            format,
            dimensions: Some((decoded.width(), decoded.height())),
        })
    }
}

/// Returns the codec used when none is injected.
#[must_use]
pub fn default_codec() -> Box<dyn ImageCodec> {
    #[cfg(feature = "image-codec")]
    {
        Box::new(ImageCrateCodec)
    }
    #[cfg(not(feature = "image-codec"))]
    {
        Box::new(SignatureCodec)
    }
}

/// Result of image normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// Cleaned image bytes.
    pub bytes: Vec<u8>,
    /// Replacement extension when the declared one was wrong.
    pub corrected_extension: Option<&'static str>,
}

/// Cuts `bytes` at the first RIFF magic, else at the first JPEG SOI marker.
///
/// RIFF is searched first across the whole buffer. Returns the input
/// unchanged when neither signature occurs.
#[must_use]
pub fn signature_scan(bytes: &[u8]) -> &[u8] {
    memmem::find(bytes, RIFF_MAGIC)
        .or_else(|| memmem::find(bytes, JPEG_SOI))
        .map_or(bytes, |offset| &bytes[offset..])
}

/// Recovers a clean image stream from a raw payload.
///
/// When the codec accepts the stream and the declared extension says JPEG
/// but the stream is another known container, the correct extension is
/// returned so the record can be renamed.
pub fn normalize_image(
    raw: &[u8],
    declared_extension: &str,
    codec: &dyn ImageCodec,
    sink: &dyn DiagnosticSink,
    context: &str,
) -> NormalizedImage {
    match codec.inspect(raw) {
        Ok(info) => {
            let declared = declared_extension.trim_start_matches('.');
            let declared_jpeg =
                declared.eq_ignore_ascii_case("jpg") || declared.eq_ignore_ascii_case("jpeg");
            let corrected_extension = (declared_jpeg && info.format != ImageFormat::Jpeg)
                .then(|| info.format.extension());

            NormalizedImage {
                bytes: raw.to_vec(),
                corrected_extension,
            }
        }
        Err(err) => {
            sink.emit(
                Diagnostic::new(
                    DiagnosticCode::CodecFailure,
                    format!("{} codec rejected image, using signature scan: {err}", codec.name()),
                )
                .with_context(context.to_string()),
            );
            NormalizedImage {
                bytes: signature_scan(raw).to_vec(),
                corrected_extension: None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn webp_header() -> Vec<u8> {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0x24, 0, 0, 0]);
        bytes.extend_from_slice(b"WEBPVP8 ");
        bytes
    }

    #[test]
    fn test_from_magic() {
        assert_eq!(
            ImageFormat::from_magic(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_magic(PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic(b"GIF89a.."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::from_magic(&webp_header()),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic(b"II*\0...."), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_magic(b"hello"), None);
        assert_eq!(ImageFormat::from_magic(b"RIFF\0\0\0\0WAVE"), None);
    }

    #[test]
    fn test_signature_scan_prefers_riff() {
        let mut bytes = vec![0x00, 0xFF, 0xD8, 0x01];
        bytes.extend_from_slice(b"RIFFxxxx");
        assert_eq!(signature_scan(&bytes), b"RIFFxxxx");
    }

    #[test]
    fn test_signature_scan_jpeg() {
        let bytes = [0x0D, 0x0A, 0x00, 0x01, 0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(signature_scan(&bytes), &[0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_signature_scan_passthrough() {
        let bytes = b"nothing to see";
        assert_eq!(signature_scan(bytes), bytes);
    }

    #[test]
    fn test_codec_failure_falls_back() {
        let sink = CollectingSink::new();
        let raw = [0x00, 0x01, 0x02, 0xFF, 0xD8, 0xFF, 0xDB];
        let out = normalize_image(&raw, "jpg", &SignatureCodec, &sink, "section 0");
        assert_eq!(out.bytes, vec![0xFF, 0xD8, 0xFF, 0xDB]);
        assert_eq!(out.corrected_extension, None);
        assert_eq!(sink.count(DiagnosticCode::CodecFailure), 1);
    }

    #[test]
    fn test_extension_corrected_for_webp_declared_jpg() {
        let sink = CollectingSink::new();
        let raw = webp_header();
        let out = normalize_image(&raw, ".JPG", &SignatureCodec, &sink, "section 0");
        assert_eq!(out.bytes, raw);
        assert_eq!(out.corrected_extension, Some("webp"));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_extension_kept_when_formats_agree() {
        let raw = [0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        let out = normalize_image(
            &raw,
            "jpeg",
            &SignatureCodec,
            &CollectingSink::new(),
            "section 0",
        );
        assert_eq!(out.corrected_extension, None);
    }

    #[test]
    fn test_extension_kept_when_not_declared_jpeg() {
        let raw = PNG_MAGIC.to_vec();
        let out = normalize_image(
            &raw,
            "bin",
            &SignatureCodec,
            &CollectingSink::new(),
            "section 0",
        );
        assert_eq!(out.corrected_extension, None);
    }

    #[cfg(feature = "image-codec")]
    #[test]
    fn test_image_crate_codec_rejects_junk() {
        let result = ImageCrateCodec.inspect(b"\x00\x01definitely not an image");
        assert!(matches!(result, Err(DocuError::CodecFailure(_))));
    }

    #[cfg(feature = "image-codec")]
    #[test]
    fn test_image_crate_codec_decodes_png() {
        use std::io::Cursor;

        let img = image::DynamicImage::new_rgb8(3, 2);
        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
            .unwrap();

        let info = ImageCrateCodec.inspect(&encoded).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(info.dimensions, Some((3, 2)));
    }
}
