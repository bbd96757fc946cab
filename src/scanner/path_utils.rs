//! Path normalization for exclusion matching.
//!
//! Exclusions match by exact equality of normalized absolute paths, never by
//! prefix or glob. Two spellings of the same directory must compare equal,
//! so every path goes through the same pipeline before comparison:
//!
//! 1. Resolve to an absolute path. Exclusion entries keep their last
//!    component as written: a symlink named in the exclusion list excludes
//!    the link, never its target. Ancestors are canonicalized so that paths
//!    through symlinked parents agree with what the walker yields.
//! 2. Clean `.` and `..` components lexically.
//! 3. On macOS only, normalize Unicode to NFC. APFS and HFS+ treat NFC and
//!    NFD spellings as the same name; elsewhere they are distinct names and
//!    compare by bytes.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use blockdupe::scanner::path_utils::path_key;
//!
//! let spelled = path_key(Path::new("/data/./photos/../photos"));
//! assert_eq!(spelled, path_key(Path::new("/data/photos")));
//! ```

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Remove `.` components and resolve `..` against preceding components
/// without touching the filesystem.
#[must_use]
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Resolve a path to the absolute form used for every comparison.
///
/// Canonicalizes when the path exists so that symlinked spellings of a root
/// agree with the paths the walker produces. Falls back to a lexical
/// absolute path for paths that do not exist yet.
#[must_use]
pub fn absolute_path(path: &Path) -> PathBuf {
    match path.canonicalize() {
        Ok(canonical) => canonical,
        Err(_) => match std::path::absolute(path) {
            Ok(abs) => lexical_clean(&abs),
            Err(_) => lexical_clean(path),
        },
    }
}

/// Resolve an exclusion entry without following a symlink at its leaf.
///
/// Only the parent is canonicalized; the final component is kept as
/// written, since the walker never descends through links.
#[must_use]
pub fn exclusion_path(path: &Path) -> PathBuf {
    let abs = match std::path::absolute(path) {
        Ok(abs) => lexical_clean(&abs),
        Err(_) => lexical_clean(path),
    };
    match (abs.parent(), abs.file_name()) {
        (Some(parent), Some(name)) => absolute_path(parent).join(name),
        _ => abs,
    }
}

/// Create a comparison key for an already-absolute path.
///
/// Paths that are not valid UTF-8 are keyed by their lossy conversion.
#[must_use]
pub fn path_key(path: &Path) -> String {
    let key = lexical_clean(path).to_string_lossy().into_owned();
    if cfg!(target_os = "macos") {
        normalize_path_str(&key)
    } else {
        key
    }
}

/// The set of excluded directories, keyed by normalized absolute path.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    keys: HashSet<String>,
}

impl ExclusionSet {
    /// Build the set from user-supplied paths, resolving each one.
    #[must_use]
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let keys = paths
            .into_iter()
            .map(|p| path_key(&exclusion_path(p.as_ref())))
            .collect();
        Self { keys }
    }

    /// Check whether `dir` (an absolute path produced by the walker) is excluded.
    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        !self.keys.is_empty() && self.keys.contains(&path_key(dir))
    }

    /// Number of excluded directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
