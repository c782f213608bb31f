//! Boundary policy on top of the rolling hash.
//!
//! A chunk ends at the first byte where
//!
//! - the chunk holds at least `min_size` bytes, and
//! - the low `average_bits` bits of the digest are zero, or the chunk has
//!   reached `max_size`.
//!
//! Only the last [`WINDOW_SIZE`] bytes feed the digest, so the first
//! `min_size - WINDOW_SIZE` bytes of each chunk are counted without hashing.
//! Cut points are identical to hashing every byte.

use std::sync::Arc;

use crate::cdc::{RollingHash, Tables};
use crate::config::{ChunkConfig, WINDOW_SIZE};

/// A boundary found by [`RabinCdc::find_boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cut {
    /// Bytes of the scanned slice that belong to the finished chunk.
    pub len: usize,
    /// Digest at the cut point.
    pub fingerprint: u64,
}

/// Sans-I/O boundary scanner. Feed it consecutive slices of a stream; it
/// keeps the running chunk's length and hash state between calls.
#[derive(Debug, Clone)]
pub(crate) struct RabinCdc {
    hash: RollingHash,
    min_size: usize,
    max_size: usize,
    mask: u64,
    /// Bytes still to count before hashing starts.
    skip: usize,
    /// Bytes in the running chunk.
    count: usize,
}

impl RabinCdc {
    /// Creates a scanner. `config` must already be validated.
    pub(crate) fn new(config: &ChunkConfig, tables: Arc<Tables>) -> Self {
        let mut cdc = Self {
            hash: RollingHash::new(tables),
            min_size: config.min_size(),
            max_size: config.max_size(),
            mask: config.mask(),
            skip: 0,
            count: 0,
        };
        cdc.reset();
        cdc
    }

    /// Starts a new chunk.
    pub(crate) fn reset(&mut self) {
        self.hash.reset();
        self.count = 0;
        self.skip = self.min_size.saturating_sub(WINDOW_SIZE);
    }

    /// Scans `data` as the continuation of the running chunk.
    ///
    /// Returns the cut if the chunk ends inside `data`; the scanner is then
    /// reset and the bytes after `cut.len` start the next chunk. Returns
    /// `None` if all of `data` belongs to the running chunk.
    pub(crate) fn find_boundary(&mut self, data: &[u8]) -> Option<Cut> {
        let mut start = 0;
        if self.skip > 0 {
            start = self.skip.min(data.len());
            self.skip -= start;
            self.count += start;
            if self.skip > 0 {
                return None;
            }
        }

        for (i, &byte) in data[start..].iter().enumerate() {
            let digest = self.hash.roll(byte);
            self.count += 1;

            if self.count < self.min_size {
                continue;
            }

            if digest & self.mask == 0 || self.count >= self.max_size {
                self.reset();
                return Some(Cut {
                    len: start + i + 1,
                    fingerprint: digest,
                });
            }
        }

        None
    }

    /// Ends the running chunk at end of stream and returns its digest.
    pub(crate) fn finish(&mut self) -> u64 {
        let digest = self.hash.digest();
        self.reset();
        digest
    }

    /// Returns the number of bytes in the running chunk.
    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.count
    }
}
