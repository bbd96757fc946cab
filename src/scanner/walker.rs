//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing the configured
//! roots and yielding the regular files that are candidates for duplicate
//! detection.
//!
//! # Filters
//!
//! Each entry is checked in this order and silently dropped on the first
//! failure:
//!
//! 1. It must be a regular file (symlinks and special files are reported
//!    as diagnostics and skipped).
//! 2. Its parent directory must not be excluded. Excluded directories are
//!    pruned with their whole subtree.
//! 3. Its size must be at least the configured minimum.
//! 4. Its file name must match the mask.
//!
//! Missing roots, roots that are not directories, and unreadable entries
//! are yielded as [`ScanError`] values; iteration always continues.
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::config::{ScanConfig, ScanDepth};
//! use blockdupe::scanner::Walker;
//!
//! let config = ScanConfig::new(vec!["/home/user/Downloads".into()])
//!     .with_depth(ScanDepth::Flat)
//!     .with_mask("*.iso");
//!
//! let walker = Walker::new(&config).unwrap();
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} candidates", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::path_utils::{absolute_path, exclusion_path, ExclusionSet};
use super::{FileDescriptor, NameMask, ScanError};
use crate::config::{ConfigError, ScanConfig, ScanDepth};

/// Directory walker for file discovery.
///
/// Holds no state between calls to [`Walker::walk`]; every call re-reads
/// the filesystem.
#[derive(Debug)]
pub struct Walker {
    /// Roots in configured order
    roots: Vec<PathBuf>,
    /// Pruned directories
    exclusions: ExclusionSet,
    /// Flat or recursive
    depth: ScanDepth,
    /// Inclusive size floor
    min_size: u64,
    /// Compiled filename mask
    mask: NameMask,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a walker from a scan configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the filename mask does not compile.
    pub fn new(config: &ScanConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            roots: config.roots.clone(),
            exclusions: ExclusionSet::new(&config.exclude),
            depth: config.depth,
            min_size: config.min_size,
            mask: config.name_mask()?,
            shutdown_flag: None,
        })
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root, yielding candidate files and traversal diagnostics.
    ///
    /// Entries within a directory are visited in file-name order, so an
    /// unchanged tree always yields the same sequence.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileDescriptor, ScanError>> + '_ {
        self.roots
            .iter()
            .flat_map(move |root| self.walk_root(root))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
    }

    /// Walk a single root.
    fn walk_root<'a>(
        &'a self,
        root: &Path,
    ) -> Box<dyn Iterator<Item = Result<FileDescriptor, ScanError>> + 'a> {
        if let Err(e) = self.check_root(root) {
            return Box::new(std::iter::once(Err(e)));
        }

        // A root may be excluded by the spelling it was given or by its target
        let as_given = exclusion_path(root);
        let root = absolute_path(root);
        if self.exclusions.contains(&root) || self.exclusions.contains(&as_given) {
            log::info!("Skipping excluded root: {}", root.display());
            return Box::new(std::iter::once(Err(ScanError::Excluded(root))));
        }

        log::debug!("Walking {} ({:?})", root.display(), self.depth);

        let entries = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(self.depth.max_walk_depth())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded_dir(entry));

        Box::new(entries.filter_map(move |entry_result| match entry_result {
            Ok(entry) => self.process_entry(entry),
            Err(e) => Some(Err(self.handle_walkdir_error(e))),
        }))
    }

    /// Verify that a root exists and is a directory.
    fn check_root(&self, root: &Path) -> Result<(), ScanError> {
        match std::fs::metadata(root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => {
                log::warn!("Skipping root that is not a directory: {}", root.display());
                Err(ScanError::NotADirectory(root.to_path_buf()))
            }
            Err(e) => {
                log::warn!("Skipping root {}: {}", root.display(), e);
                Err(self.handle_io_error(root, e))
            }
        }
    }

    /// Pruning predicate for walkdir: true for directories in the exclusion set.
    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        if entry.file_type().is_dir() && self.exclusions.contains(entry.path()) {
            log::debug!("Pruning excluded directory: {}", entry.path().display());
            true
        } else {
            false
        }
    }

    /// Apply the per-entry filters and create a FileDescriptor if valid.
    fn process_entry(&self, entry: DirEntry) -> Option<Result<FileDescriptor, ScanError>> {
        let file_type = entry.file_type();

        // Directories only matter for recursion
        if file_type.is_dir() {
            return None;
        }

        if file_type.is_symlink() {
            log::debug!("Skipping symlink: {}", entry.path().display());
            return Some(Err(ScanError::Symlink(entry.into_path())));
        }

        if !file_type.is_file() {
            log::debug!("Skipping special file: {}", entry.path().display());
            return Some(Err(ScanError::SpecialFile(entry.into_path())));
        }

        if entry
            .path()
            .parent()
            .is_some_and(|parent| self.exclusions.contains(parent))
        {
            log::trace!("Skipping file in excluded directory: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walkdir_error(e))),
        };

        let size = metadata.len();
        if size < self.min_size {
            log::trace!(
                "Skipping file below minimum size ({} < {}): {}",
                size,
                self.min_size,
                entry.path().display()
            );
            return None;
        }

        if !self.mask.matches(entry.file_name()) {
            log::trace!(
                "Skipping file not matching mask '{}': {}",
                self.mask.pattern(),
                entry.path().display()
            );
            return None;
        }

        Some(Ok(FileDescriptor::new(entry.into_path(), size)))
    }

    /// Handle I/O errors during root access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
            _ => ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Handle walkdir errors.
    fn handle_walkdir_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(PathBuf::new, std::borrow::ToOwned::to_owned);

        let permission_denied = error
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);

        if permission_denied {
            log::warn!("Permission denied: {}", path.display());
            ScanError::PermissionDenied(path)
        } else {
            log::warn!("Walker error for {}: {}", path.display(), error);
            ScanError::Io {
                path,
                source: error.into(),
            }
        }
    }
}
