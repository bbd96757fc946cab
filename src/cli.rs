//! Command-line interface definitions.
//!
//! The CLI only collects values; [`ScanArgs::overrides`] turns them into the
//! top configuration layer and [`crate::config::ScanConfig::load`] merges
//! them over the config file and environment.
//!
//! # Example
//!
//! ```bash
//! # Recursive scan of two trees with 4 KiB blocks
//! blockdupe scan ~/Photos /mnt/backup/Photos --block-size 4KiB
//!
//! # Only the top level of Downloads, ISO images only
//! blockdupe scan ~/Downloads --depth 0 --mask '*.iso'
//!
//! # Skip a directory and emit JSON
//! blockdupe scan /srv --exclude /srv/cache --output json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{ChecksumAlgorithm, ConfigOverrides};

/// Find duplicate files by comparing per-block content fingerprints.
#[derive(Debug, Parser)]
#[command(name = "blockdupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
///
/// Every option left unset falls through to the config file, then the
/// `BLOCKDUPE_*` environment, then the built-in default.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Directory to skip together with its subtree (exact path, repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "DIR")]
    pub exclude: Vec<PathBuf>,

    /// Traversal depth: 0 scans only the roots themselves, 1 or more recurses
    #[arg(short, long, value_name = "N")]
    pub depth: Option<u32>,

    /// Fingerprint block size (e.g. 512, 4KiB) [default: 512]
    #[arg(short, long, value_name = "SIZE", value_parser = parse_block_size)]
    pub block_size: Option<usize>,

    /// Ignore files smaller than this (e.g. 1, 10KB) [default: 1]
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Filename mask with `*` and `?`, case-insensitive [default: *]
    #[arg(short, long, value_name = "GLOB")]
    pub mask: Option<String>,

    /// Per-block checksum [default: crc32]
    #[arg(short, long, value_enum, value_name = "ALGORITHM")]
    pub checksum: Option<ChecksumAlgorithm>,

    /// Fingerprinting threads, 1 for sequential [default: 4]
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", env = "BLOCKDUPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl ScanArgs {
    /// Collect the options given on the command line as a config layer.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            roots: self.roots.clone(),
            exclude: self.exclude.clone(),
            depth: self.depth,
            block_size: self.block_size,
            min_size: self.min_size,
            mask: self.mask.clone(),
            checksum: self.checksum,
            threads: self.threads,
        }
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One path per line, blank line between groups
    Text,
    /// Machine-readable JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size such as `4096`, `10KB`, `1.5MiB`.
///
/// Decimal suffixes (`KB`, `MB`, ...) are powers of 1000 and binary
/// suffixes (`KiB`, `MiB`, ...) powers of 1024. Case-insensitive.
///
/// # Errors
///
/// Returns a message suitable for clap when the number or suffix is invalid.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a block size. Zero is accepted here and rejected by validation.
///
/// # Errors
///
/// Returns a message when the size is malformed or does not fit in memory.
pub fn parse_block_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    usize::try_from(bytes).map_err(|_| format!("Block size too large: {bytes}"))
}
