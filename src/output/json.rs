//! JSON output formatter for scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "fingerprint": "1c291ca3...",
//!       "algorithm": "crc32",
//!       "block_count": 2,
//!       "files": [
//!         { "path": "/data/a.bin", "size": 1000 },
//!         { "path": "/data/b.bin", "size": 1000 }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "repeated_paths": 0,
//!     "total_size": 1048576,
//!     "fingerprinted_files": 99,
//!     "failed_files": 1,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 3,
//!     "exit_code_name": "BD003"
//!   },
//!   "diagnostics": [
//!     { "kind": "unreadable_file", "path": "/data/locked", "message": "Permission denied: /data/locked" }
//!   ]
//! }
//! ```
//!
//! Groups and diagnostics are separate arrays; a skipped file never shows
//! up inside a group.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::Diagnostic;

/// One file of a group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Concatenated block digests as hexadecimal
    pub fingerprint: String,
    /// Per-block checksum name
    pub algorithm: &'static str,
    /// Number of blocks
    pub block_count: usize,
    /// Member files, sorted by path
    pub files: Vec<JsonFile>,
}

impl JsonDuplicateGroup {
    /// Convert a [`DuplicateGroup`].
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            fingerprint: group.fingerprint_hex(),
            algorithm: group.fingerprint.algorithm().name(),
            block_count: group.fingerprint.block_count(),
            files: group
                .files
                .iter()
                .map(|f| JsonFile {
                    path: f.path.to_string_lossy().into_owned(),
                    size: f.size,
                })
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Distinct candidate files produced by the walker
    pub total_files: usize,
    /// Paths yielded again by overlapping roots
    pub repeated_paths: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Candidates fingerprinted successfully
    pub fingerprinted_files: usize,
    /// Candidates that could not be read
    pub failed_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files beyond the first of each group
    pub duplicate_files: usize,
    /// Bytes freed by removing every duplicate
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "BD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a [`ScanSummary`] and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            repeated_paths: summary.repeated_paths,
            total_size: summary.total_size,
            fingerprinted_files: summary.fingerprinted_files,
            failed_files: summary.failed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A non-fatal event recorded during the scan.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDiagnostic {
    /// Stable machine-readable kind (e.g., "missing_root")
    pub kind: &'static str,
    /// The path concerned
    pub path: String,
    /// Human-readable message
    pub message: String,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            kind: diagnostic.kind(),
            path: diagnostic.path().to_string_lossy().into_owned(),
            message: diagnostic.to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Skipped roots, entries, and files
    pub diagnostics: Vec<JsonDiagnostic>,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate groups, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use blockdupe::duplicates::{DuplicateGroup, ScanSummary};
    /// use blockdupe::error::ExitCode;
    /// use blockdupe::output::json::JsonOutput;
    /// use blockdupe::scanner::{FileDescriptor, Fingerprint};
    /// use std::path::PathBuf;
    ///
    /// let groups = vec![DuplicateGroup::new(
    ///     Fingerprint::from_crc32(&[0xcafe]),
    ///     vec![
    ///         FileDescriptor::new(PathBuf::from("/file1.txt"), 10),
    ///         FileDescriptor::new(PathBuf::from("/file2.txt"), 10),
    ///     ],
    /// )];
    ///
    /// let output = JsonOutput::new(&groups, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// assert_eq!(output.duplicates[0].fingerprint, "0000cafe");
    /// ```
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            diagnostics: summary.diagnostics.iter().map(JsonDiagnostic::from).collect(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing JSON: {0}")]
    Io(#[from] std::io::Error),
}
