//! Streaming block fingerprinter.
//!
//! # Overview
//!
//! A file is read sequentially in blocks of exactly `block_size` bytes and
//! each block is reduced to a fixed-width checksum. The ordered sequence of
//! checksums is the file's [`Fingerprint`]. Only one block buffer is ever
//! held, so memory use is O(block_size) regardless of file size.
//!
//! The final block, when short, is padded on the right with zero bytes up
//! to `block_size` before hashing. An empty file has zero blocks and an
//! empty fingerprint.
//!
//! # Accuracy
//!
//! CRC-32 is a fast non-cryptographic checksum: two different blocks can
//! collide and produce a false-positive duplicate. Zero padding also means
//! two files that differ only by trailing zero bytes inside their last block
//! fingerprint identically. [`ChecksumAlgorithm::Blake3`] removes the
//! collision risk (not the padding caveat) at some speed cost.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use blockdupe::scanner::Fingerprinter;
//!
//! let fp = Fingerprinter::new(NonZeroUsize::new(4).unwrap());
//! let print = fp.fingerprint_reader(&b"hello world"[..]).unwrap();
//! assert_eq!(print.block_count(), 3);
//! ```

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{FileDescriptor, FingerprintError};

/// Per-block checksum function.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    /// CRC-32 (IEEE), 4 bytes per block
    #[default]
    Crc32,
    /// BLAKE3, 32 bytes per block
    Blake3,
}

impl ChecksumAlgorithm {
    /// Bytes each block contributes to the fingerprint.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            Self::Crc32 => 4,
            Self::Blake3 => blake3::OUT_LEN,
        }
    }

    /// Lowercase name, as accepted in configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Crc32 => "crc32",
            Self::Blake3 => "blake3",
        }
    }

    fn append_digest(self, block: &[u8], out: &mut Vec<u8>) {
        match self {
            Self::Crc32 => out.extend_from_slice(&crc32fast::hash(block).to_be_bytes()),
            Self::Blake3 => out.extend_from_slice(blake3::hash(block).as_bytes()),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered sequence of fixed-width block checksums.
///
/// Equality is sequence equality: same algorithm, same number of blocks,
/// same checksums in the same order. The concatenated digest bytes double
/// as the grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    algorithm: ChecksumAlgorithm,
    digests: Box<[u8]>,
}

impl Fingerprint {
    /// Build a CRC-32 fingerprint from block checksum values.
    #[must_use]
    pub fn from_crc32(checksums: &[u32]) -> Self {
        let digests: Vec<u8> = checksums.iter().flat_map(|c| c.to_be_bytes()).collect();
        Self {
            algorithm: ChecksumAlgorithm::Crc32,
            digests: digests.into_boxed_slice(),
        }
    }

    /// Checksum function used for every block.
    #[must_use]
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Number of blocks read from the file.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.digests.len() / self.algorithm.width()
    }

    /// Check if the file had no readable blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Iterate over per-block digests in file order.
    pub fn blocks(&self) -> std::slice::ChunksExact<'_, u8> {
        self.digests.chunks_exact(self.algorithm.width())
    }

    /// The digest of block `index`.
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&[u8]> {
        self.blocks().nth(index)
    }

    /// Concatenated digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.digests
    }

    /// Lowercase hexadecimal rendering of the whole digest sequence.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.digests.len() * 2);
        for byte in self.digests.iter() {
            // Writing to a String cannot fail
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

/// Computes block fingerprints with a fixed block size and checksum.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    block_size: NonZeroUsize,
    algorithm: ChecksumAlgorithm,
}

impl Fingerprinter {
    /// Create a CRC-32 fingerprinter.
    #[must_use]
    pub fn new(block_size: NonZeroUsize) -> Self {
        Self {
            block_size,
            algorithm: ChecksumAlgorithm::Crc32,
        }
    }

    /// Select the per-block checksum.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Configured block size in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size.get()
    }

    /// Configured checksum.
    #[must_use]
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Fingerprint a file discovered by the walker.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError`] naming the path when the file cannot be
    /// opened or a read fails part-way.
    pub fn fingerprint(&self, file: &FileDescriptor) -> Result<Fingerprint, FingerprintError> {
        self.fingerprint_path(&file.path)
    }

    /// Fingerprint the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError`] naming the path when the file cannot be
    /// opened or a read fails part-way.
    pub fn fingerprint_path(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        let file = File::open(path).map_err(|e| FingerprintError::from_io(path, e))?;
        self.fingerprint_reader(file)
            .map_err(|e| FingerprintError::from_io(path, e))
    }

    /// Fingerprint any byte stream.
    ///
    /// Reads never request more than `block_size` bytes at a time.
    ///
    /// # Errors
    ///
    /// Propagates the first read error other than `Interrupted`.
    pub fn fingerprint_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let block_size = self.block_size.get();
        let mut block = vec![0u8; block_size];
        let mut digests = Vec::new();

        loop {
            let filled = read_block(&mut reader, &mut block)?;
            if filled == 0 {
                break;
            }
            if filled < block_size {
                block[filled..].fill(0);
            }
            self.algorithm.append_digest(&block, &mut digests);
            if filled < block_size {
                break;
            }
        }

        Ok(Fingerprint {
            algorithm: self.algorithm,
            digests: digests.into_boxed_slice(),
        })
    }
}

/// Fill `buf` from `reader`, looping over short reads. Returns the number of
/// bytes placed, which is less than `buf.len()` only at end of stream.
fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
