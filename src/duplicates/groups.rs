//! Duplicate grouping by fingerprint.
//!
//! # Overview
//!
//! [`GroupAccumulator`] is the aggregation object for one scan. Each
//! `(file, fingerprint)` pair is inserted into a hash map keyed by the full
//! fingerprint sequence, so grouping costs one hash lookup per file instead
//! of a comparison against every other file. [`GroupAccumulator::finalize`]
//! consumes the accumulator, drops singleton fingerprints, and returns the
//! immutable list of [`DuplicateGroup`]s.
//!
//! Files whose fingerprints have different block counts can never share a
//! group, even if one is a prefix of the other.
//!
//! # Example
//!
//! ```
//! use blockdupe::duplicates::GroupAccumulator;
//! use blockdupe::scanner::{FileDescriptor, Fingerprint};
//! use std::path::PathBuf;
//!
//! let mut acc = GroupAccumulator::new();
//! acc.insert(FileDescriptor::new(PathBuf::from("/a"), 10), Fingerprint::from_crc32(&[1, 2]));
//! acc.insert(FileDescriptor::new(PathBuf::from("/b"), 10), Fingerprint::from_crc32(&[1, 2]));
//! acc.insert(FileDescriptor::new(PathBuf::from("/c"), 10), Fingerprint::from_crc32(&[1, 3]));
//!
//! let (groups, stats) = acc.finalize();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].len(), 2);
//! assert_eq!(stats.singletons, 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::scanner::{FileDescriptor, Fingerprint};

/// A set of two or more distinct files sharing one fingerprint.
///
/// Files are ordered by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The shared fingerprint
    pub fingerprint: Fingerprint,
    /// Member files, sorted by path
    pub files: Vec<FileDescriptor>,
}

impl DuplicateGroup {
    /// Create a new duplicate group. Files are sorted by path.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, mut files: Vec<FileDescriptor>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { fingerprint, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Space held by every copy but one.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        match self.files.first() {
            Some(first) if self.files.len() > 1 => self.total_size().saturating_sub(first.size),
            _ => 0,
        }
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Fingerprint as hexadecimal string.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.to_hex()
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Check whether `path` belongs to this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

/// Statistics from the grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Distinct files accepted
    pub total_files: usize,
    /// Total size of accepted files in bytes
    pub total_size: u64,
    /// Inserts ignored because the path was already recorded
    pub repeated_paths: usize,
    /// Number of distinct fingerprints
    pub unique_fingerprints: usize,
    /// Fingerprints held by exactly one file (discarded)
    pub singletons: usize,
    /// Groups with 2+ files
    pub duplicate_groups: usize,
    /// Files in groups beyond the first of each
    pub duplicate_files: usize,
}

/// Accumulates `(file, fingerprint)` pairs for a single scan.
///
/// Owned by the scan that fills it; there is no shared or global state.
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    groups: HashMap<Fingerprint, Vec<FileDescriptor>>,
    seen: HashSet<PathBuf>,
    stats: GroupingStats,
}

impl GroupAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file and its fingerprint.
    ///
    /// Returns `false` (and records nothing) if the path was already
    /// inserted, which happens when configured roots overlap.
    pub fn insert(&mut self, file: FileDescriptor, fingerprint: Fingerprint) -> bool {
        if !self.seen.insert(file.path.clone()) {
            log::trace!("Ignoring repeated path: {}", file.path.display());
            self.stats.repeated_paths += 1;
            return false;
        }

        self.stats.total_files += 1;
        self.stats.total_size += file.size;
        self.groups.entry(fingerprint).or_default().push(file);
        true
    }

    /// Number of distinct files recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.total_files
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.total_files == 0
    }

    /// Drop singletons and produce the final groups, ordered by first path.
    #[must_use]
    pub fn finalize(self) -> (Vec<DuplicateGroup>, GroupingStats) {
        let mut stats = self.stats;
        stats.unique_fingerprints = self.groups.len();

        let mut groups: Vec<DuplicateGroup> = self
            .groups
            .into_iter()
            .filter_map(|(fingerprint, files)| {
                if files.len() < 2 {
                    stats.singletons += 1;
                    return None;
                }
                log::debug!(
                    "Duplicate group of {} files ({} blocks)",
                    files.len(),
                    fingerprint.block_count()
                );
                Some(DuplicateGroup::new(fingerprint, files))
            })
            .collect();

        groups.sort_by(|a, b| a.files[0].path.cmp(&b.files[0].path));

        stats.duplicate_groups = groups.len();
        stats.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();

        (groups, stats)
    }
}

/// Pairwise O(N²) grouping.
///
/// Reference baseline only: compares every candidate with every other. It
/// produces the same groups as [`GroupAccumulator`] and exists to check that
/// implementation, not to scan real trees.
#[must_use]
pub fn pairwise_groups(entries: &[(FileDescriptor, Fingerprint)]) -> Vec<DuplicateGroup> {
    // Drop repeated paths, keeping the first occurrence
    let mut seen = HashSet::new();
    let entries: Vec<&(FileDescriptor, Fingerprint)> = entries
        .iter()
        .filter(|(file, _)| seen.insert(file.path.clone()))
        .collect();

    let mut assigned = vec![false; entries.len()];
    let mut groups = Vec::new();

    for i in 0..entries.len() {
        if assigned[i] {
            continue;
        }
        let mut members = vec![entries[i].0.clone()];
        for j in (i + 1)..entries.len() {
            if !assigned[j] && entries[j].1 == entries[i].1 {
                assigned[j] = true;
                members.push(entries[j].0.clone());
            }
        }
        if members.len() > 1 {
            groups.push(DuplicateGroup::new(entries[i].1.clone(), members));
        }
    }

    groups.sort_by(|a, b| a.files[0].path.cmp(&b.files[0].path));
    groups
}
