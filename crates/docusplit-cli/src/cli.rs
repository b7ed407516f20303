//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docusplit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract embedded files from an archive
    Extract(ExtractArgs),
    /// List embedded files without writing anything
    List(ListArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

/// Parsing options shared by every command that reads an archive.
#[derive(clap::Args)]
pub struct ParseArgs {
    /// Read buffer size in bytes (suffixes K, M, G)
    #[arg(long, value_parser = parse_byte_size)]
    pub chunk_size: Option<u64>,

    /// Normalize sections on the calling thread only
    #[arg(long)]
    pub sequential: bool,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Character substituted for illegal filename characters
    #[arg(long, default_value_t = '_')]
    pub placeholder: char,

    /// Fail instead of creating a missing output directory
    #[arg(long)]
    pub no_create: bool,

    #[command(flatten)]
    pub parse: ParseArgs,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show GUID, checksum and source position
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,

    /// Load the whole archive so line positions can be reported
    #[arg(long)]
    pub positions: bool,

    #[command(flatten)]
    pub parse: ParseArgs,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parse byte size with optional suffix (K, M, G)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    let size = num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })?;

    if size == 0 {
        return Err("chunk size must be greater than zero".to_string());
    }
    Ok(size)
}
