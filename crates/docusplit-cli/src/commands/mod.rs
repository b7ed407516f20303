//! Subcommand implementations.

pub mod completion;
pub mod extract;
pub mod list;

use crate::cli::ParseArgs;
use docusplit_core::ParseConfig;

/// Builds the parse configuration from the shared flags.
pub fn parse_config(args: &ParseArgs) -> ParseConfig {
    let mut config = ParseConfig::default().with_parallel(!args.sequential);
    if let Some(size) = args.chunk_size {
        config = config.with_chunk_size(usize::try_from(size).unwrap_or(usize::MAX));
    }
    config
}
