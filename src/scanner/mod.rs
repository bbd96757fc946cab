//! Scanner module for directory traversal and block fingerprinting.
//!
//! This module provides functionality for:
//! - Walking configured roots with depth, exclusion, size and mask filters
//! - Streaming per-block fingerprints (CRC-32 by default)
//! - Unicode-aware path normalization for exclusion matching
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`fingerprint`]: Bounded-memory block fingerprinting
//! - [`mask`]: Filename mask matching
//! - [`path_utils`]: Path normalization helpers
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::config::ScanConfig;
//! use blockdupe::scanner::Walker;
//!
//! let config = ScanConfig::new(vec!["/home/user/Downloads".into()]).with_min_size(1024);
//! let walker = Walker::new(&config).expect("valid configuration");
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Skipped: {}", e),
//!     }
//! }
//! ```

pub mod fingerprint;
pub mod mask;
pub mod path_utils;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use fingerprint::{Fingerprint, Fingerprinter};
pub use mask::NameMask;
pub use walker::Walker;

/// A regular file that survived every walker filter.
///
/// Read-only; consumed once by the [`Fingerprinter`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileDescriptor {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes at discovery time
    pub size: u64,
}

impl FileDescriptor {
    /// Create a new FileDescriptor.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Non-fatal traversal events. The walker yields these instead of files
/// and keeps going.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A root was itself listed in the exclusion set.
    #[error("Root is excluded: {0}")]
    Excluded(PathBuf),

    /// A symbolic link was encountered and skipped.
    #[error("Skipped symbolic link: {0}")]
    Symlink(PathBuf),

    /// A socket, FIFO, or device node was encountered and skipped.
    #[error("Skipped special file: {0}")]
    SpecialFile(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Path the event refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::Excluded(p)
            | Self::Symlink(p)
            | Self::SpecialFile(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur while fingerprinting a single file.
///
/// Every variant names the file; the finder drops the file and continues.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The file vanished between discovery and reading.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl FingerprintError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// A non-fatal event recorded during a scan.
///
/// Diagnostics travel beside the duplicate groups, never inside them.
#[derive(thiserror::Error, Debug)]
pub enum Diagnostic {
    /// Raised by the walker.
    #[error(transparent)]
    Traversal(#[from] ScanError),

    /// Raised by the fingerprinter; the file was dropped.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

impl Diagnostic {
    /// Path the diagnostic refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Traversal(e) => e.path(),
            Self::Fingerprint(e) => e.path(),
        }
    }

    /// Short machine-readable category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Traversal(ScanError::PermissionDenied(_)) => "permission_denied",
            Self::Traversal(ScanError::NotFound(_)) => "missing_root",
            Self::Traversal(ScanError::NotADirectory(_)) => "not_a_directory",
            Self::Traversal(ScanError::Excluded(_)) => "excluded_root",
            Self::Traversal(ScanError::Symlink(_)) => "symlink",
            Self::Traversal(ScanError::SpecialFile(_)) => "special_file",
            Self::Traversal(ScanError::Io { .. }) => "traversal_io",
            Self::Fingerprint(_) => "unreadable_file",
        }
    }
}
