//! Plain text report.
//!
//! Each group is printed as its paths, one per line, with a blank line
//! between groups. Nothing else goes to the writer, so the output can be
//! piped straight into other tools. The summary and diagnostics are
//! written separately (to stderr by the binary).

use std::io::{self, Write};

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Text formatter for duplicate groups.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> TextOutput<'a> {
    /// Wrap the groups of a finished scan.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write every group to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }
            for file in &group.files {
                writeln!(writer, "{}", file.path.display())?;
            }
        }
        writer.flush()
    }

    /// Render the groups to a string.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Write a one-line summary followed by one line per diagnostic.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(summary: &ScanSummary, writer: &mut W) -> io::Result<()> {
    for diagnostic in &summary.diagnostics {
        writeln!(writer, "skipped [{}] {}", diagnostic.kind(), diagnostic)?;
    }
    writeln!(
        writer,
        "{} files scanned ({}), {} duplicate groups, {} duplicate files, {} reclaimable ({:.1}%), {} skipped, in {:.2?}",
        summary.total_files,
        summary.total_size_display(),
        summary.duplicate_groups,
        summary.duplicate_files,
        summary.reclaimable_display(),
        summary.wasted_percentage(),
        summary.diagnostics.len(),
        summary.scan_duration
    )
}
