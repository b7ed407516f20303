//! Record assembly: one raw section in, one embedded file record out.

use memchr::memchr_iter;
use memchr::memmem;

use crate::DocuError;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticCode;
use crate::diagnostics::DiagnosticSink;
use crate::grammar::SIGNATURE_MARKER;
use crate::grammar::find_signature;
use crate::grammar::strip_trailing_remnant;
use crate::metadata::keys;
use crate::metadata::parse_metadata;
use crate::normalize::ContentKind;
use crate::normalize::ContentNormalizer;
use crate::record::EmbeddedFileRecord;
use crate::record::LineRange;
use crate::record::SourcePosition;
use crate::scanner::RawSection;

/// Prefix of generated filenames.
pub const SENTINEL_PREFIX: &str = "unnamed";

/// Extension used for generated filenames when none was declared.
pub const SENTINEL_EXTENSION: &str = "bin";

const SHORT_ID_LEN: usize = 8;

/// Builds [`EmbeddedFileRecord`]s from raw sections.
///
/// Stateless apart from the normalizer, so sections can be assembled on any
/// number of workers concurrently.
#[derive(Debug, Default)]
pub struct RecordAssembler {
    normalizer: ContentNormalizer,
}

impl RecordAssembler {
    /// Creates an assembler around `normalizer`.
    #[must_use]
    pub fn new(normalizer: ContentNormalizer) -> Self {
        Self { normalizer }
    }

    /// The normalizer used for payloads.
    #[must_use]
    pub fn normalizer(&self) -> &ContentNormalizer {
        &self.normalizer
    }

    /// Assembles a record without position information (streaming mode).
    ///
    /// Returns `None` and emits [`DiagnosticCode::MalformedSection`] when the
    /// section has no signature marker.
    pub fn assemble(
        &self,
        section: &RawSection,
        sink: &dyn DiagnosticSink,
    ) -> Option<EmbeddedFileRecord> {
        self.assemble_at(section, SourcePosition::Unavailable, sink)
    }

    /// Assembles a record with a known source position.
    pub fn assemble_at(
        &self,
        section: &RawSection,
        position: SourcePosition,
        sink: &dyn DiagnosticSink,
    ) -> Option<EmbeddedFileRecord> {
        let index = section.index();
        let bytes = section.bytes();
        let context = format!("section {index}");

        let Some(marker) = find_signature(bytes) else {
            let error = DocuError::MalformedSection { index };
            sink.emit(
                Diagnostic::new(DiagnosticCode::MalformedSection, format!("{error}, dropped"))
                    .with_context(context),
            );
            return None;
        };

        let header = &bytes[..marker];
        let content = strip_trailing_remnant(&bytes[marker + SIGNATURE_MARKER.len()..]);

        let metadata = parse_metadata(header, sink);
        let declared_type = metadata.get_or_empty(keys::TYPE).to_string();
        let doctype = metadata.get_or_empty(keys::DOCTYPE).to_string();
        let declared_extension = metadata
            .get_or_empty(keys::EXT)
            .trim_start_matches('.')
            .to_string();
        let sha1 = metadata.get_or_empty(keys::SHA1).to_string();
        let guid = metadata.get_or_empty(keys::GUID).to_string();
        let env_guid = metadata.get_or_empty(keys::ENV_GUID).to_string();

        let kind = ContentKind::classify(&declared_type, &doctype);
        let normalized =
            self.normalizer
                .normalize(kind, content, &declared_extension, sink, &context);

        let declared_filename = metadata.get_or_empty(keys::FILENAME);
        let (filename, extension) = match normalized.corrected_extension {
            Some(corrected) => {
                let filename = if declared_filename.is_empty() {
                    sentinel_filename(&guid, &sha1, index, corrected)
                } else {
                    replace_extension(declared_filename, corrected)
                };
                sink.emit(
                    Diagnostic::new(
                        DiagnosticCode::ExtensionCorrected,
                        format!(
                            "declared extension '{declared_extension}' does not match image data, using '{corrected}'"
                        ),
                    )
                    .with_context(context),
                );
                (filename, corrected.to_string())
            }
            None if declared_filename.is_empty() => (
                sentinel_filename(&guid, &sha1, index, &declared_extension),
                declared_extension,
            ),
            None => (declared_filename.to_string(), declared_extension),
        };

        Some(EmbeddedFileRecord {
            section_index: index,
            filename,
            extension,
            declared_type,
            doctype,
            sha1,
            guid,
            env_guid,
            content: normalized.payload,
            position,
        })
    }
}

/// Generates the fallback filename `unnamed_<id>.<ext>`.
///
/// `<id>` is the first eight alphanumeric characters of the GUID, else of the
/// SHA-1, else `section<N>`. `<ext>` falls back to `bin`.
///
/// # Examples
///
/// ```
/// use docusplit_core::assembler::sentinel_filename;
///
/// assert_eq!(
///     sentinel_filename("{0A1B2C3D-4E5F}", "", 0, "jpg"),
///     "unnamed_0A1B2C3D.jpg"
/// );
/// assert_eq!(sentinel_filename("", "", 7, ""), "unnamed_section7.bin");
/// ```
#[must_use]
pub fn sentinel_filename(guid: &str, sha1: &str, index: usize, extension: &str) -> String {
    let short_id = |value: &str| -> Option<String> {
        let id: String = value
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(SHORT_ID_LEN)
            .collect();
        (!id.is_empty()).then_some(id)
    };

    let id = short_id(guid)
        .or_else(|| short_id(sha1))
        .unwrap_or_else(|| format!("section{index}"));

    let extension = extension.trim_start_matches('.');
    let extension = if extension.is_empty() {
        SENTINEL_EXTENSION
    } else {
        extension
    };

    format!("{SENTINEL_PREFIX}_{id}.{extension}")
}

/// Replaces the suffix after the last `.` of `filename`, or appends one.
#[must_use]
pub fn replace_extension(filename: &str, extension: &str) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => format!("{}.{extension}", &filename[..dot]),
        _ => format!("{filename}.{extension}"),
    }
}

/// Maps sections to line spans while walking a document front to back.
///
/// Each section is searched for after the end of the previous one, and the
/// line count is carried along, so locating every section of a document
/// costs one pass over it. The start line is one plus the number of line
/// feeds before the section; the end line adds the line feeds inside it.
///
/// # Examples
///
/// ```
/// use docusplit_core::assembler::LineLocator;
///
/// let doc = b"head\n**%%DOCUx\ny\n**%%DOCUx\ny\n";
/// let mut locator = LineLocator::new(doc);
/// let first = locator.locate(b"x\ny\n").unwrap();
/// let second = locator.locate(b"x\ny\n").unwrap();
/// assert_eq!((first.start, first.end), (2, 4));
/// assert_eq!((second.start, second.end), (4, 6));
/// ```
#[derive(Debug, Clone)]
pub struct LineLocator<'a> {
    document: &'a [u8],
    cursor: usize,
    line: usize,
}

impl<'a> LineLocator<'a> {
    /// Starts at the beginning of `document`, on line 1.
    #[must_use]
    pub const fn new(document: &'a [u8]) -> Self {
        Self {
            document,
            cursor: 0,
            line: 1,
        }
    }

    /// Finds `section` after the previously located one.
    ///
    /// Returns `None`, leaving the cursor untouched, when the section does
    /// not occur in the rest of the document.
    pub fn locate(&mut self, section: &[u8]) -> Option<LineRange> {
        let tail = &self.document[self.cursor..];
        let offset = memmem::find(tail, section)?;

        let start = self.line + memchr_iter(b'\n', &tail[..offset]).count();
        let end = start + memchr_iter(b'\n', section).count();

        self.cursor += offset + section.len();
        self.line = end;
        Some(LineRange { start, end })
    }
}
