//! Integration tests for docusplit-core.
//!
//! These tests verify end-to-end workflows with real filesystem operations.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use docusplit_core::ArchiveBuilder;
use docusplit_core::ContentNormalizer;
use docusplit_core::DocuError;
use docusplit_core::ExtractConfig;
use docusplit_core::NoopProgress;
use docusplit_core::ParseConfig;
use docusplit_core::Payload;
use docusplit_core::RecordAssembler;
use docusplit_core::SourcePosition;
use docusplit_core::diagnostics::CollectingSink;
use docusplit_core::diagnostics::DiagnosticCode;
use docusplit_core::diagnostics::NoopSink;
use docusplit_core::extract_records;
use docusplit_core::normalize::image::SignatureCodec;
use docusplit_core::parse_archive;
use docusplit_core::parse_document;
use docusplit_core::parse_document_with_assembler;
use docusplit_core::parse_reader;
use docusplit_core::parse_reader_with_assembler;
use docusplit_core::test_utils::DocumentBuilder;
use docusplit_core::test_utils::jpeg_like_stream;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;
use tempfile::TempDir;

const NOISE: [u8; 5] = [0x00, 0x01, 0x02, 0x03, 0x04];
const JUNK: [u8; 6] = [0x0D, 0x0A, 0x00, 0x01, 0x02, 0x03];

/// A JPEG the default codec accepts.
#[cfg(feature = "image-codec")]
fn sample_jpeg() -> Vec<u8> {
    docusplit_core::test_utils::encoded_jpeg(8, 8)
}

#[cfg(not(feature = "image-codec"))]
fn sample_jpeg() -> Vec<u8> {
    jpeg_like_stream(32)
}

fn signature_assembler() -> RecordAssembler {
    RecordAssembler::new(ContentNormalizer::new(Box::new(SignatureCodec)))
}

fn text_and_image_document() -> Vec<u8> {
    let mut text_payload = NOISE.to_vec();
    text_payload.extend_from_slice(b"Hello World!");

    let mut image_payload = JUNK.to_vec();
    image_payload.extend_from_slice(&sample_jpeg());

    DocumentBuilder::new()
        .preamble(b"\x00\x00writer preamble\r\n")
        .section(
            &[
                ("FILENAME", "greeting.txt"),
                ("EXT", "txt"),
                ("TYPE", "PLAINTEXT"),
                ("SHA1", "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
                ("GUID", "{11111111-2222-3333-4444-555555555555}"),
            ],
            &text_payload,
        )
        .bare_section(
            &[
                ("FILENAME", "scan.jpg"),
                ("EXT", "jpg"),
                ("TYPE", "IMAGE"),
                ("GUID", "{66666666-7777-8888-9999-000000000000}"),
            ],
            &image_payload,
        )
        .build()
}

fn write_archive(temp: &TempDir, bytes: &[u8]) -> PathBuf {
    let path = temp.path().join("bundle.docu");
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_text_and_image_sections() {
    let temp = TempDir::new().unwrap();
    let source = write_archive(&temp, &text_and_image_document());

    let sink = CollectingSink::new();

    let report = parse_archive(&source, &ParseConfig::default(), &sink).unwrap();

    assert_eq!(report.records.len(), 2);

    let text = &report.records[0];
    assert_eq!(text.filename(), "greeting.txt");
    assert_eq!(text.content(), &Payload::Text("Hello World!".into()));
    assert_eq!(text.size(), 12);
    assert_eq!(text.sha1(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");

    // The junk prefix makes the codec reject the stream once; the
    // signature scan then recovers the JPEG byte for byte.
    let image = &report.records[1];
    assert_eq!(image.filename(), "scan.jpg");
    assert_eq!(image.content().as_bytes(), sample_jpeg().as_slice());
    assert_eq!(image.size(), sample_jpeg().len());
    assert_eq!(sink.count(DiagnosticCode::CodecFailure), 1);

    #[cfg(feature = "image-codec")]
    {
        use docusplit_core::normalize::image::ImageCodec;
        use docusplit_core::normalize::image::ImageCrateCodec;
        use docusplit_core::normalize::image::ImageFormat;

        let info = ImageCrateCodec.inspect(image.content().as_bytes()).unwrap();
        assert_eq!(info.format, ImageFormat::Jpeg);
        assert_eq!(info.dimensions, Some((8, 8)));
    }
}

#[test]
fn test_streaming_records_have_no_position() {
    let report = parse_reader(
        text_and_image_document().as_slice(),
        &ParseConfig::default(),
        &NoopSink,
    )
    .unwrap();

    for record in &report.records {
        assert_eq!(record.position(), SourcePosition::Unavailable);
        assert_eq!(record.position().to_string(), "unavailable (streaming)");
    }
}

#[test]
fn test_document_mode_has_positions() {
    let doc = text_and_image_document();
    let report = parse_document(&doc, &ParseConfig::default(), &NoopSink);

    let first = report.records[0].position().lines().unwrap();
    let second = report.records[1].position().lines().unwrap();

    // Preamble ends with one line feed; each section starts with CRLF.
    assert_eq!(first.start, 2);
    assert!(first.end > first.start);
    assert!(second.start >= first.end);
}

#[test]
fn test_malformed_section_skipped() {
    let doc = DocumentBuilder::new()
        .section(&[("FILENAME", "one.bin"), ("TYPE", "ZIP")], b"PK\x03\x04first")
        .raw_section(b"\r\nFILENAME/broken.txt\r\nTYPE/PLAINTEXT\r\nno marker at all\r\n")
        .section(&[("FILENAME", "three.bin"), ("TYPE", "ZIP")], b"PK\x03\x04third")
        .build();
    let sink = CollectingSink::new();

    let report = parse_reader(doc.as_slice(), &ParseConfig::default(), &sink).unwrap();

    let names: Vec<&str> = report.records.iter().map(|r| r.filename()).collect();
    assert_eq!(names, ["one.bin", "three.bin"]);
    assert_eq!(report.sections_scanned, 3);
    assert_eq!(report.sections_dropped, 1);
    assert_eq!(sink.count(DiagnosticCode::MalformedSection), 1);
}

#[test]
fn test_trailing_section_without_delimiter_flushed() {
    let doc = DocumentBuilder::new()
        .section(&[("FILENAME", "last.xml"), ("TYPE", "XML")], b"<?xml version=\"1.0\"?><a/>")
        .unterminated()
        .build();

    let report = parse_reader(doc.as_slice(), &ParseConfig::default(), &NoopSink).unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(
        report.records[0].content().as_text(),
        Some("<?xml version=\"1.0\"?><a/>")
    );
}

#[test]
fn test_no_delimiter_yields_nothing() {
    let report = parse_reader(
        &b"FILENAME/a.txt\r\n_SIG/D.C.orphan payload"[..],
        &ParseConfig::default(),
        &NoopSink,
    )
    .unwrap();
    assert!(report.records.is_empty());
}

#[test]
fn test_parallel_preserves_order() {
    let mut builder = DocumentBuilder::new();
    for i in 0..200 {
        let name = format!("file{i:03}.txt");
        let body = format!("payload number {i} with enough text");
        builder = builder.section(
            &[("FILENAME", name.as_str()), ("TYPE", "PLAINTEXT")],
            body.as_bytes(),
        );
    }
    let doc = builder.build();

    let sequential = ParseConfig::default()
        .with_parallel(false)
        .with_chunk_size(4096);
    let parallel = ParseConfig::default().with_parallel(true).with_chunk_size(4096);

    let seq = parse_reader(doc.as_slice(), &sequential, &NoopSink).unwrap();
    let par = parse_reader(doc.as_slice(), &parallel, &NoopSink).unwrap();

    assert_eq!(seq.records.len(), 200);
    assert_eq!(seq.records, par.records);
    for (i, record) in par.records.iter().enumerate() {
        assert_eq!(record.section_index(), i);
        assert_eq!(record.filename(), format!("file{i:03}.txt"));
    }
}

#[test]
fn test_extract_twice_succeeds() {
    let temp = TempDir::new().unwrap();
    let source = write_archive(&temp, &text_and_image_document());
    let out = temp.path().join("out");
    let parsed = parse_archive(&source, &ParseConfig::default(), &NoopSink).unwrap();

    for _ in 0..2 {
        let report =
            extract_records(&parsed.records, &out, &ExtractConfig::default(), &NoopSink).unwrap();
        assert_eq!(report.files_written, 2);
        assert!(report.is_complete());
    }

    assert_eq!(
        fs::read_to_string(out.join("greeting.txt")).unwrap(),
        "Hello World!"
    );
    let image = fs::read(out.join("scan.jpg")).unwrap();
    assert_eq!(&image[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_traversal_filename_contained() {
    let temp = TempDir::new().unwrap();
    let doc = DocumentBuilder::new()
        .section(
            &[("FILENAME", "../../../etc/evil.txt"), ("TYPE", "PLAINTEXT")],
            b"nothing to see here",
        )
        .build();
    let parsed = parse_reader(doc.as_slice(), &ParseConfig::default(), &NoopSink).unwrap();
    let out = temp.path().join("nested").join("out");
    let sink = CollectingSink::new();

    let report = extract_records(&parsed.records, &out, &ExtractConfig::default(), &sink).unwrap();

    assert_eq!(report.files_written, 1);
    let canonical_out = out.canonicalize().unwrap();
    assert_eq!(report.written[0].parent(), Some(canonical_out.as_path()));
    assert!(!temp.path().join("etc").exists());
    assert_eq!(sink.count(DiagnosticCode::FilenameSanitized), 1);
}

#[test]
fn test_missing_source_is_error() {
    let temp = TempDir::new().unwrap();
    let result = parse_archive(
        temp.path().join("absent.docu"),
        &ParseConfig::default(),
        &NoopSink,
    );
    match result {
        Err(DocuError::SourceNotFound { path }) => assert!(path.ends_with("absent.docu")),
        other => panic!("expected SourceNotFound, got {other:?}"),
    }
}

#[test]
fn test_destination_file_rejected_before_writing() {
    let temp = TempDir::new().unwrap();
    let source = write_archive(&temp, &text_and_image_document());
    let parsed = parse_archive(&source, &ParseConfig::default(), &NoopSink).unwrap();
    let blocker = temp.path().join("not-a-dir");
    fs::write(&blocker, b"occupied").unwrap();

    let result = extract_records(&parsed.records, &blocker, &ExtractConfig::default(), &NoopSink);

    assert!(matches!(result, Err(DocuError::DestinationInvalid { .. })));
    assert_eq!(fs::read(&blocker).unwrap(), b"occupied");
}

#[cfg(feature = "image-codec")]
#[test]
fn test_png_declared_as_jpg_is_renamed() {
    use docusplit_core::test_utils::encoded_png;

    let png = encoded_png(4, 3);
    let doc = DocumentBuilder::new()
        .bare_section(
            &[("FILENAME", "photo.jpg"), ("EXT", "jpg"), ("TYPE", "IMAGE")],
            &png,
        )
        .build();
    let sink = CollectingSink::new();

    let report = parse_reader(doc.as_slice(), &ParseConfig::default(), &sink).unwrap();
    let record = &report.records[0];

    assert_eq!(record.filename(), "photo.png");
    assert_eq!(record.extension(), "png");
    assert_eq!(record.content().as_bytes(), png.as_slice());
    assert_eq!(sink.count(DiagnosticCode::ExtensionCorrected), 1);
    assert_eq!(sink.count(DiagnosticCode::CodecFailure), 0);
}

#[test]
fn test_injected_signature_codec() {
    // A valid JPEG header over an undecodable body: the signature codec
    // accepts it as is.
    let stream = jpeg_like_stream(64);
    let doc = DocumentBuilder::new()
        .bare_section(
            &[("FILENAME", "thumb.jpg"), ("EXT", "jpg"), ("TYPE", "IMAGE")],
            &stream,
        )
        .build();
    let sink = CollectingSink::new();

    let report = parse_reader_with_assembler(
        doc.as_slice(),
        &signature_assembler(),
        &ParseConfig::default(),
        &sink,
        &mut NoopProgress,
    )
    .unwrap();

    assert_eq!(report.records[0].filename(), "thumb.jpg");
    assert_eq!(report.records[0].content().as_bytes(), stream.as_slice());
    assert_eq!(sink.count(DiagnosticCode::CodecFailure), 0);

    // The decoding codec rejects the same stream.
    #[cfg(feature = "image-codec")]
    {
        let sink = CollectingSink::new();
        parse_reader(doc.as_slice(), &ParseConfig::default(), &sink).unwrap();
        assert_eq!(sink.count(DiagnosticCode::CodecFailure), 1);
    }
}

#[test]
fn test_injected_codec_corrects_extension() {
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(b"not really pixels");
    let doc = DocumentBuilder::new()
        .bare_section(
            &[("FILENAME", "photo.jpg"), ("EXT", "jpg"), ("TYPE", "IMAGE")],
            &png,
        )
        .build();
    let sink = CollectingSink::new();

    let report =
        parse_document_with_assembler(&doc, &signature_assembler(), &ParseConfig::default(), &sink);

    assert_eq!(report.records[0].filename(), "photo.png");
    assert_eq!(report.records[0].content().as_bytes(), png.as_slice());
    assert_eq!(sink.count(DiagnosticCode::ExtensionCorrected), 1);
}

#[test]
fn test_archive_builder_with_injected_codec() {
    let temp = TempDir::new().unwrap();
    let stream = jpeg_like_stream(16);
    let doc = DocumentBuilder::new()
        .bare_section(&[("FILENAME", "a.jpg"), ("TYPE", "IMAGE")], &stream)
        .build();
    let source = write_archive(&temp, &doc);
    let out = temp.path().join("out");
    let sink = CollectingSink::new();

    let (parsed, extracted) = ArchiveBuilder::new()
        .archive(&source)
        .output_dir(&out)
        .assembler(signature_assembler())
        .extract(&sink)
        .unwrap();

    assert_eq!(parsed.records.len(), 1);
    assert_eq!(extracted.files_written, 1);
    assert_eq!(fs::read(out.join("a.jpg")).unwrap(), stream);
    assert_eq!(sink.count(DiagnosticCode::CodecFailure), 0);
}

#[test]
fn test_repeated_sections_get_distinct_positions() {
    let headers = [("FILENAME", "same.txt"), ("TYPE", "PLAINTEXT")];
    let doc = DocumentBuilder::new()
        .preamble(b"one\ntwo\n")
        .section(&headers, b"identical body")
        .section(&[("FILENAME", "other.txt"), ("TYPE", "PLAINTEXT")], b"different")
        .section(&headers, b"identical body")
        .build();

    let report = parse_document(&doc, &ParseConfig::default(), &NoopSink);
    let lines: Vec<(usize, usize)> = report
        .records
        .iter()
        .map(|r| {
            let range = r.position().lines().unwrap();
            (range.start, range.end)
        })
        .collect();

    // Each section spans four line feeds: leading CRLF, two headers, trailer.
    assert_eq!(lines, [(3, 7), (7, 11), (11, 15)]);
    assert_eq!(report.records[0].content(), report.records[2].content());
}

#[test]
fn test_document_mode_scales_linearly() {
    const SECTIONS: usize = 40_000;

    let mut builder = DocumentBuilder::new();
    for _ in 0..SECTIONS {
        builder = builder.section(&[("TYPE", "OTHER")], b"x");
    }
    let doc = builder.unterminated().build();
    let config = ParseConfig::default().with_parallel(false);

    let start = Instant::now();
    let report = parse_document(&doc, &config, &NoopSink);
    let elapsed = start.elapsed();

    assert_eq!(report.records.len(), SECTIONS);
    // Sections are "\r\nTYPE/OTHER\r\n_SIG/D.C.x\r\n": three line feeds each.
    let last = report.records[SECTIONS - 1].position().lines().unwrap();
    assert_eq!((last.start, last.end), (1 + 3 * (SECTIONS - 1), 1 + 3 * SECTIONS));
    // Rescanning from the start for every section is orders of magnitude slower here.
    assert!(
        elapsed < Duration::from_secs(10),
        "parse_document took {elapsed:?} for {SECTIONS} sections"
    );
}
