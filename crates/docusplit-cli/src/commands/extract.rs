//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use docusplit_core::Archive;
use docusplit_core::DiskExtractor;
use docusplit_core::ExtractConfig;
use docusplit_core::NoopProgress;
use docusplit_core::diagnostics::CollectingSink;
use std::env;

pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let archive = add_archive_context(Archive::open(&args.archive), &args.archive)?
        .with_parse_config(super::parse_config(&args.parse))
        .with_extract_config(
            ExtractConfig::default()
                .with_placeholder(args.placeholder)
                .with_create_missing(!args.no_create),
        );

    // The destination is validated before the archive is read.
    let extractor = add_archive_context(
        DiskExtractor::new(&output_dir, archive.extract_config().clone()),
        &args.archive,
    )?;

    let sink = CollectingSink::new();
    let parsed = if show_progress {
        let total = std::fs::metadata(archive.path()).map_or(0, |m| m.len());
        let mut progress = CliProgress::new(total, "Scanning");
        add_archive_context(archive.parse_with_progress(&sink, &mut progress), &args.archive)?
    } else {
        add_archive_context(
            archive.parse_with_progress(&sink, &mut NoopProgress),
            &args.archive,
        )?
    };

    let extracted = extractor.extract(&parsed.records, &sink);

    formatter.format_extraction_result(&parsed, &extracted, &sink.drain())?;

    Ok(())
}
