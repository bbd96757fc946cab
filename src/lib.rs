//! blockdupe - duplicate file finder
//!
//! Files are compared by fingerprint: the ordered sequence of per-block
//! checksums of their content, read in fixed-size zero-padded blocks.
//! Files with equal fingerprints are reported as duplicates without a
//! byte-for-byte comparison, so a report is only as strong as the chosen
//! checksum (CRC-32 by default, BLAKE3 on request).
//!
//! The library is split into the walker and fingerprinter
//! ([`scanner`]), the grouper and scan orchestration ([`duplicates`]),
//! and the thin binary glue ([`cli`], [`output`], [`progress`],
//! [`signal`], [`logging`], [`error`]).

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::ScanConfig;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{write_summary, JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// Reports go to stdout; progress, the summary, and logs go to stderr.
///
/// # Errors
///
/// Returns an error when the configuration is invalid, the scan is
/// interrupted, or the report cannot be written. Use
/// [`ExitCode::for_error`] to map it to a process exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan(args) => handle_scan(&args, cli.quiet),
    }
}

fn handle_scan(args: &ScanArgs, quiet: bool) -> Result<ExitCode> {
    let config = ScanConfig::load(args.config.as_deref(), &args.overrides())?;
    config.validate()?;
    log::debug!("Effective configuration: {:?}", config);

    let handler = signal::install_handler();
    let mut finder = DuplicateFinder::new(config).with_shutdown_flag(handler.get_flag());

    if !quiet && !args.no_progress && io::stderr().is_terminal() {
        finder = finder.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let (groups, summary) = finder.find_duplicates()?;
    let exit_code = ExitCode::for_scan(groups.len(), summary.diagnostics.len());

    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Text => {
            TextOutput::new(&groups)
                .write_to(&mut stdout)
                .context("Failed to write report")?;
            if !quiet {
                write_summary(&summary, &mut io::stderr().lock())
                    .context("Failed to write summary")?;
            }
        }
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, exit_code)
                .write_to(&mut stdout, true)
                .context("Failed to write JSON report")?;
        }
    }

    Ok(exit_code)
}
