//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use docusplit_core::DocuError;
use docusplit_core::diagnostics::CollectingSink;
use docusplit_core::parse_archive;
use docusplit_core::parse_document;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = super::parse_config(&args.parse);
    let sink = CollectingSink::new();

    // Line positions need the whole document in memory.
    let report = if args.positions {
        let bytes = add_archive_context(
            std::fs::read(&args.archive).map_err(|e| DocuError::from_source_io(e, &args.archive)),
            &args.archive,
        )?;
        parse_document(&bytes, &config, &sink)
    } else {
        add_archive_context(parse_archive(&args.archive, &config, &sink), &args.archive)?
    };

    if args.long {
        formatter.format_listing_long(&report, args.human_readable)?;
    } else {
        formatter.format_listing_short(&report)?;
    }

    Ok(())
}
