//! Filename mask matching.
//!
//! Masks are glob patterns applied to the file name only (never to the
//! directory part). `*` matches any run of characters and `?` matches exactly
//! one. Matching is case-insensitive and anchored: the whole file name must
//! match, so `*.txt` rejects `notes.txt.bak`. Every other character,
//! including `[`, `]`, `{`, `}` and `\`, matches itself.

use std::ffi::OsStr;

use globset::{GlobBuilder, GlobMatcher};

/// The mask that accepts every file name.
pub const MATCH_ALL: &str = "*";

/// A compiled filename mask.
#[derive(Debug, Clone)]
pub struct NameMask {
    pattern: String,
    matcher: Option<GlobMatcher>,
}

impl NameMask {
    /// Compile a mask.
    ///
    /// # Errors
    ///
    /// Returns the underlying glob error if globset rejects the escaped
    /// pattern.
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        if pattern == MATCH_ALL {
            return Ok(Self::match_all());
        }

        let glob = GlobBuilder::new(&to_glob(pattern))
            .case_insensitive(true)
            .literal_separator(true)
            .backslash_escape(false)
            .build()?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher: Some(glob.compile_matcher()),
        })
    }

    /// A mask that accepts everything without running a matcher.
    #[must_use]
    pub fn match_all() -> Self {
        Self {
            pattern: MATCH_ALL.to_string(),
            matcher: None,
        }
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check a file name (not a full path) against the mask.
    #[must_use]
    pub fn matches(&self, file_name: &OsStr) -> bool {
        match &self.matcher {
            None => true,
            Some(m) => m.is_match(file_name),
        }
    }
}

/// Translate a mask into globset syntax where only `*` and `?` are special.
fn to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len() * 3);
    let mut prev_star = false;
    for c in pattern.chars() {
        match c {
            // `**` has its own meaning in globset
            '*' if prev_star => continue,
            '*' | '?' => glob.push(c),
            '[' | ']' | '{' | '}' | '\\' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            _ => glob.push(c),
        }
        prev_star = c == '*';
    }
    glob
}

impl Default for NameMask {
    fn default() -> Self {
        Self::match_all()
    }
}
