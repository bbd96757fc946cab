//! Duplicate finder: the scan pipeline orchestrator.
//!
//! # Overview
//!
//! A scan runs in three steps:
//! 1. **Walk** - collect candidate files from every root (see [`crate::scanner::walker`])
//! 2. **Fingerprint** - compute the per-block fingerprint of each candidate
//!    on a bounded rayon pool
//! 3. **Group** - fold `(file, fingerprint)` pairs into a
//!    [`GroupAccumulator`] on the calling thread and drop singletons
//!
//! Traversal and read failures never abort a scan. They are collected as
//! [`Diagnostic`]s in the [`ScanSummary`] and the affected file is left out
//! of every group.
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::config::ScanConfig;
//! use blockdupe::duplicates::DuplicateFinder;
//!
//! let config = ScanConfig::new(vec!["/srv/photos".into()]).with_block_size(4096);
//! let finder = DuplicateFinder::new(config);
//!
//! let (groups, summary) = finder.find_duplicates().unwrap();
//! for group in &groups {
//!     for file in &group.files {
//!         println!("{}", file.path.display());
//!     }
//!     println!();
//! }
//! eprintln!("{} diagnostics", summary.diagnostics.len());
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{DuplicateGroup, GroupAccumulator};
use crate::config::{ConfigError, ScanConfig};
use crate::progress::{ProgressCallback, PHASE_FINGERPRINTING, PHASE_WALKING};
use crate::scanner::{
    Diagnostic, FileDescriptor, Fingerprint, FingerprintError, Fingerprinter, Walker,
};

/// Files above this size get a debug line when fingerprinting starts.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Distinct candidate files produced by the walker
    pub total_files: usize,
    /// Walker results dropped because overlapping roots yielded them again
    pub repeated_paths: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Candidates fingerprinted successfully
    pub fingerprinted_files: usize,
    /// Candidates that could not be read
    pub failed_files: usize,
    /// Fingerprints held by a single file
    pub unique_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files beyond the first of each group
    pub duplicate_files: usize,
    /// Space that removing every duplicate would free
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Problems encountered along the way, in discovery order
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanSummary {
    /// Percentage of the scanned bytes held by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }

    /// Check if any diagnostics were recorded.
    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Errors that end a scan without a result.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The configuration was rejected before any I/O.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,
}

/// Runs the walk, fingerprint, and group steps for one configuration.
///
/// Each call to [`DuplicateFinder::find_duplicates`] builds a fresh
/// accumulator, so repeated scans are independent.
pub struct DuplicateFinder {
    config: ScanConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl DuplicateFinder {
    /// Create a finder for the given configuration.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The configuration this finder scans with.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Scan the configured roots and return the duplicate groups.
    ///
    /// Groups are ordered by their first path and hold files ordered by
    /// path, so the result does not depend on thread scheduling.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidConfig`] before touching the
    /// filesystem if the configuration is invalid, and
    /// [`FinderError::Interrupted`] if the shutdown flag was raised. An
    /// interrupted scan never returns partial groups.
    pub fn find_duplicates(&self) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        self.config.validate()?;

        let fingerprinter =
            Fingerprinter::new(self.config.block_size()?).with_algorithm(self.config.checksum);
        let mut walker = Walker::new(&self.config)?;
        if let Some(ref flag) = self.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        log::info!(
            "Starting duplicate scan of {} root(s), block size {}, {}",
            self.config.roots.len(),
            fingerprinter.block_size(),
            fingerprinter.algorithm()
        );

        let mut summary = ScanSummary::default();

        let files = self.collect_candidates(&walker, &mut summary);
        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.total_files = files.len();
        summary.total_size = files.iter().map(|f| f.size).sum();
        log::info!(
            "Found {} candidate files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        let results = self.fingerprint_all(files, &fingerprinter);
        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Single writer: only this thread touches the accumulator
        let mut accumulator = GroupAccumulator::new();
        for (file, result) in results {
            match result {
                Ok(fingerprint) => {
                    summary.fingerprinted_files += 1;
                    accumulator.insert(file, fingerprint);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    summary.failed_files += 1;
                    summary.diagnostics.push(e.into());
                }
            }
        }

        let (groups, stats) = accumulator.finalize();

        summary.unique_files = stats.singletons;
        summary.duplicate_groups = stats.duplicate_groups;
        summary.duplicate_files = stats.duplicate_files;
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable, {} diagnostics",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.diagnostics.len()
        );

        Ok((groups, summary))
    }

    /// Drain the walker, recording traversal diagnostics as they appear.
    ///
    /// Overlapping roots make the walker yield some paths more than once;
    /// each file and each diagnostic is kept only the first time.
    fn collect_candidates(
        &self,
        walker: &Walker,
        summary: &mut ScanSummary,
    ) -> Vec<FileDescriptor> {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut files = Vec::new();
        let mut seen_files: HashSet<PathBuf> = HashSet::new();
        let mut seen_diagnostics: HashSet<(&'static str, PathBuf)> = HashSet::new();
        for result in walker.walk() {
            match result {
                Ok(file) if !seen_files.insert(file.path.clone()) => {
                    log::trace!("Already collected: {}", file.path.display());
                    summary.repeated_paths += 1;
                }
                Ok(file) => {
                    if let Some(ref callback) = self.progress_callback {
                        let path = file.path.to_string_lossy();
                        callback.on_progress(files.len() + 1, path.as_ref());
                    }
                    files.push(file);
                }
                // Already logged by the walker
                Err(e) => {
                    let diagnostic = Diagnostic::from(e);
                    let key = (diagnostic.kind(), diagnostic.path().to_path_buf());
                    if seen_diagnostics.insert(key) {
                        summary.diagnostics.push(diagnostic);
                    }
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }
        files
    }

    /// Fingerprint every candidate on a pool of `threads` workers.
    ///
    /// Workers only compute; results come back in input order. Files not
    /// yet started when shutdown is requested are skipped.
    fn fingerprint_all(
        &self,
        files: Vec<FileDescriptor>,
        fingerprinter: &Fingerprinter,
    ) -> Vec<(FileDescriptor, Result<Fingerprint, FingerprintError>)> {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_FINGERPRINTING, files.len());
        }

        let work = || -> Vec<(FileDescriptor, Result<Fingerprint, FingerprintError>)> {
            files
                .into_par_iter()
                .enumerate()
                .filter_map(|(idx, file)| {
                    if self.is_shutdown_requested() {
                        return None;
                    }

                    if file.size > LARGE_FILE_THRESHOLD {
                        log::debug!(
                            "Fingerprinting large file ({}): {}",
                            ByteSize::b(file.size),
                            file.path.display()
                        );
                    }

                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
                    }

                    let result = fingerprinter.fingerprint(&file);
                    if result.is_ok() {
                        log::trace!("Fingerprinted: {}", file.path.display());
                        if let Some(ref callback) = self.progress_callback {
                            callback.on_item_completed(file.size);
                        }
                    }
                    Some((file, result))
                })
                .collect()
        };

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(e) => {
                log::warn!(
                    "Failed to create thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                work()
            }
        };

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_FINGERPRINTING);
        }
        results
    }
}
