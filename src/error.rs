//! Exit codes and structured error reporting.

use serde::Serialize;

use crate::config::ConfigError;
use crate::duplicates::FinderError;

/// Process exit codes.
///
/// - 0: scan completed, duplicates found
/// - 1: the scan could not run (bad configuration, unexpected failure)
/// - 2: scan completed, no duplicates
/// - 3: scan completed, but some paths produced diagnostics
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// The scan could not run.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Scan completed with diagnostics.
    PartialSuccess = 3,
    /// Scan was interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "BD000",
            Self::GeneralError => "BD001",
            Self::NoDuplicates => "BD002",
            Self::PartialSuccess => "BD003",
            Self::Interrupted => "BD130",
        }
    }

    /// Exit code for a completed scan.
    ///
    /// Diagnostics take precedence: a scan that skipped paths is partial
    /// even when it found duplicates among the rest.
    #[must_use]
    pub fn for_scan(group_count: usize, diagnostic_count: usize) -> Self {
        if diagnostic_count > 0 {
            Self::PartialSuccess
        } else if group_count == 0 {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }

    /// Exit code for an error that ended the run.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::Interrupted) => Self::Interrupted,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "BD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the configuration was rejected
    pub invalid_config: bool,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        let invalid_config = err.downcast_ref::<ConfigError>().is_some()
            || matches!(
                err.downcast_ref::<FinderError>(),
                Some(FinderError::InvalidConfig(_))
            );
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            invalid_config,
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
