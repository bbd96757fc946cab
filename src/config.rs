//! Scan configuration.
//!
//! [`ScanConfig`] is the complete, immutable description of one scan: which
//! roots to walk, which directories to exclude, how deep to go, the block
//! size, the minimum file size, and the filename mask.
//!
//! # Layered loading
//!
//! Values are merged with figment in increasing priority:
//!
//! 1. Built-in defaults ([`ScanConfig::default`])
//! 2. A TOML file (`--config PATH`, or `config.toml` in the platform config
//!    directory when present)
//! 3. Environment variables prefixed `BLOCKDUPE_` (e.g. `BLOCKDUPE_BLOCK_SIZE=4096`)
//! 4. Command-line flags ([`ConfigOverrides`])
//!
//! ```toml
//! roots = ["/srv/media", "/mnt/backup"]
//! exclude = ["/srv/media/.thumbnails"]
//! depth = 1
//! block_size = 4096
//! min_size = 1
//! mask = "*.jpg"
//! checksum = "crc32"
//! threads = 4
//! ```

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::NameMask;

pub use crate::scanner::fingerprint::ChecksumAlgorithm;

/// Default block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Default minimum file size. Keeps empty files out of the results.
pub const DEFAULT_MIN_SIZE: u64 = 1;

/// Default number of fingerprinting threads.
pub const DEFAULT_THREADS: usize = 4;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "BLOCKDUPE_";

/// Traversal mode.
///
/// Configured as a numeric level for compatibility: `0` is flat and any
/// value `>= 1` is fully recursive. There is no bounded intermediate depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ScanDepth {
    /// Direct children of each root only
    Flat,
    /// Every descendant of each root
    #[default]
    Recursive,
}

impl ScanDepth {
    /// Map a numeric depth level to a traversal mode.
    #[must_use]
    pub fn from_level(level: u32) -> Self {
        if level == 0 {
            Self::Flat
        } else {
            Self::Recursive
        }
    }

    /// Numeric level (`0` or `1`).
    #[must_use]
    pub fn level(self) -> u32 {
        match self {
            Self::Flat => 0,
            Self::Recursive => 1,
        }
    }

    /// Maximum walkdir depth, counting the root as depth 0.
    #[must_use]
    pub fn max_walk_depth(self) -> usize {
        match self {
            Self::Flat => 1,
            Self::Recursive => usize::MAX,
        }
    }
}

impl From<u32> for ScanDepth {
    fn from(level: u32) -> Self {
        Self::from_level(level)
    }
}

impl From<ScanDepth> for u32 {
    fn from(depth: ScanDepth) -> Self {
        depth.level()
    }
}

/// Errors that make a configuration unusable. Raised before any scanning.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Block size must be positive.
    #[error("Block size must be greater than zero")]
    ZeroBlockSize,

    /// At least one root is required.
    #[error("No directories to scan")]
    NoRoots,

    /// The mask is empty.
    #[error("Filename mask cannot be empty (use \"*\" to match everything)")]
    EmptyMask,

    /// The mask failed to compile.
    #[error("Invalid filename mask '{mask}': {source}")]
    InvalidMask {
        /// The offending mask
        mask: String,
        /// The glob parse error
        #[source]
        source: globset::Error,
    },

    /// Thread count must be positive.
    #[error("Thread count must be greater than zero")]
    ZeroThreads,

    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    MissingFile(PathBuf),

    /// A configuration layer could not be parsed.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Configuration for one duplicate scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Root directories, scanned in order
    pub roots: Vec<PathBuf>,
    /// Directories skipped with their whole subtree (exact path match)
    pub exclude: Vec<PathBuf>,
    /// Flat or recursive traversal
    pub depth: ScanDepth,
    /// Block size in bytes for fingerprinting
    pub block_size: usize,
    /// Files smaller than this many bytes are ignored
    pub min_size: u64,
    /// Filename mask (`*` and `?`, case-insensitive, whole name)
    pub mask: String,
    /// Per-block checksum
    pub checksum: ChecksumAlgorithm,
    /// Fingerprinting threads (1 = sequential)
    pub threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            exclude: Vec::new(),
            depth: ScanDepth::Recursive,
            block_size: DEFAULT_BLOCK_SIZE,
            min_size: DEFAULT_MIN_SIZE,
            mask: crate::scanner::mask::MATCH_ALL.to_string(),
            checksum: ChecksumAlgorithm::Crc32,
            threads: DEFAULT_THREADS,
        }
    }
}

impl ScanConfig {
    /// Create a configuration with default settings for the given roots.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Set the excluded directories.
    #[must_use]
    pub fn with_exclude(mut self, exclude: Vec<PathBuf>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set the traversal mode.
    #[must_use]
    pub fn with_depth(mut self, depth: ScanDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Set the block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the minimum file size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the filename mask.
    #[must_use]
    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = mask.into();
        self
    }

    /// Set the per-block checksum.
    #[must_use]
    pub fn with_checksum(mut self, checksum: ChecksumAlgorithm) -> Self {
        self.checksum = checksum;
        self
    }

    /// Set the number of fingerprinting threads.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Check every constraint. Nothing is scanned until this passes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roots.is_empty() {
            return Err(ConfigError::NoRoots);
        }
        self.block_size()?;
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        self.name_mask()?;
        Ok(())
    }

    /// The block size as a non-zero value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBlockSize`] when the block size is 0.
    pub fn block_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.block_size).ok_or(ConfigError::ZeroBlockSize)
    }

    /// Compile the filename mask.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyMask`] or [`ConfigError::InvalidMask`].
    pub fn name_mask(&self) -> Result<NameMask, ConfigError> {
        if self.mask.is_empty() {
            return Err(ConfigError::EmptyMask);
        }
        NameMask::new(&self.mask).map_err(|source| ConfigError::InvalidMask {
            mask: self.mask.clone(),
            source,
        })
    }

    /// Build the layered figment: defaults, TOML file, environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] when `config_file` is given but
    /// does not exist. The default config file is optional.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::MissingFile(path.to_path_buf()));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = default_config_path() {
                    log::debug!("Looking for configuration at {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load configuration from every layer, then apply command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer cannot be read or parsed. The
    /// result is not validated; call [`ScanConfig::validate`].
    pub fn load(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(config_file)?
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(Box::new)?;
        Ok(config)
    }
}

/// Values supplied on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    /// Root directories
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<PathBuf>,
    /// Excluded directories
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<PathBuf>,
    /// Depth level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    /// Block size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_size: Option<usize>,
    /// Minimum file size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// Filename mask
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    /// Per-block checksum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChecksumAlgorithm>,
    /// Fingerprinting threads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

/// Platform-specific location of the optional configuration file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "blockdupe", "blockdupe")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
