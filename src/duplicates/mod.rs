//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping files by full fingerprint sequence
//! - Orchestrating the walk, fingerprint, and group pipeline

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderError, ScanSummary};
pub use groups::{pairwise_groups, DuplicateGroup, GroupAccumulator, GroupingStats};
