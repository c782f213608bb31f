//! 64-byte sliding-window Rabin fingerprint.

use std::sync::Arc;

use crate::cdc::Tables;
use crate::config::WINDOW_SIZE;
use crate::error::ChunkError;
use crate::polynomial::Pol;

/// Byte rolled in by [`RollingHash::reset`] so that an empty window has a
/// non-zero digest. Part of the boundary format; changing it moves cuts.
const RESET_PAD_BYTE: u8 = 1;

/// Rabin fingerprint over the trailing [`WINDOW_SIZE`] bytes of a stream.
///
/// Once at least `WINDOW_SIZE` bytes have been rolled since the last
/// [`reset`](Self::reset), [`digest`](Self::digest) equals the fingerprint of
/// exactly the bytes in the window. Each [`roll`](Self::roll) costs two table
/// lookups, independent of the window size.
///
/// # Example
///
/// ```
/// use rabin_chunker::{RollingHash, DEFAULT_POLYNOMIAL};
///
/// let mut a = RollingHash::for_polynomial(DEFAULT_POLYNOMIAL)?;
/// let mut b = a.clone();
///
/// // different prefixes, same trailing 64 bytes
/// a.roll(0x42);
/// for byte in 0..64u8 {
///     a.roll(byte);
///     b.roll(byte);
/// }
/// assert_eq!(a.digest(), b.digest());
/// # Ok::<(), rabin_chunker::ChunkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RollingHash {
    tables: Arc<Tables>,
    window: [u8; WINDOW_SIZE],
    wpos: usize,
    digest: u64,
}

impl RollingHash {
    /// Creates a hash over prebuilt tables, already reset.
    pub fn new(tables: Arc<Tables>) -> Self {
        let mut hash = Self {
            tables,
            window: [0; WINDOW_SIZE],
            wpos: 0,
            digest: 0,
        };
        hash.reset();
        hash
    }

    /// Creates a hash for `polynomial`, using the shared table cache.
    pub fn for_polynomial(polynomial: Pol) -> Result<Self, ChunkError> {
        Ok(Self::new(Tables::for_polynomial(polynomial)?))
    }

    /// Clears the window to zero bytes and rolls in the pad byte.
    pub fn reset(&mut self) {
        self.window = [0; WINDOW_SIZE];
        self.wpos = 0;
        self.digest = 0;
        self.roll(RESET_PAD_BYTE);
    }

    /// Slides `byte` into the window, evicting the oldest byte, and returns
    /// the new digest.
    #[inline]
    pub fn roll(&mut self, byte: u8) -> u64 {
        let evicted = self.window[self.wpos];
        self.window[self.wpos] = byte;
        self.wpos = (self.wpos + 1) % WINDOW_SIZE;

        let mut digest = self.digest ^ self.tables.out(evicted);
        let index = ((digest >> self.tables.shift()) & 0xff) as usize;
        digest = ((digest << 8) | byte as u64) ^ self.tables.modulo(index);

        self.digest = digest;
        digest
    }

    /// Returns the digest of the current window.
    #[inline]
    pub fn digest(&self) -> u64 {
        self.digest
    }

    /// Returns the polynomial this hash reduces by.
    pub fn polynomial(&self) -> Pol {
        self.tables.polynomial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdc::tables::append_byte;
    use crate::config::DEFAULT_POLYNOMIAL;

    fn pseudo_random(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect()
    }

    fn fingerprint(window: &[u8]) -> u64 {
        window
            .iter()
            .fold(Pol::new(0), |h, &b| append_byte(h, b, DEFAULT_POLYNOMIAL))
            .value()
    }

    #[test]
    fn test_digest_matches_direct_fingerprint() {
        let mut hash = RollingHash::for_polynomial(DEFAULT_POLYNOMIAL).unwrap();
        let data = pseudo_random(500, 7);

        for (i, &byte) in data.iter().enumerate() {
            let digest = hash.roll(byte);
            if i + 1 >= WINDOW_SIZE {
                let window = &data[i + 1 - WINDOW_SIZE..=i];
                assert_eq!(digest, fingerprint(window), "position {i}");
            }
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut fresh = RollingHash::for_polynomial(DEFAULT_POLYNOMIAL).unwrap();
        let mut used = fresh.clone();
        for byte in pseudo_random(100, 3) {
            used.roll(byte);
        }
        used.reset();

        assert_eq!(used.digest(), fresh.digest());
        for byte in pseudo_random(80, 11) {
            assert_eq!(used.roll(byte), fresh.roll(byte));
        }
    }

    #[test]
    fn test_reset_digest_is_pad_byte() {
        let hash = RollingHash::for_polynomial(DEFAULT_POLYNOMIAL).unwrap();
        assert_eq!(hash.digest(), RESET_PAD_BYTE as u64);
        assert_eq!(hash.polynomial(), DEFAULT_POLYNOMIAL);
    }

    #[test]
    fn test_pad_byte_stays_in_window_until_evicted() {
        let mut hash = RollingHash::for_polynomial(DEFAULT_POLYNOMIAL).unwrap();

        // 0x01 followed by 63 zero bytes is x^(8 * 63)
        let mut expected = Pol::new(0x01);
        for _ in 1..WINDOW_SIZE {
            hash.roll(0);
            expected = expected.mul_mod(Pol::new(0x100), DEFAULT_POLYNOMIAL);
        }
        assert_eq!(hash.digest(), expected.value());
        assert_ne!(hash.digest(), 0);

        hash.roll(0);
        assert_eq!(hash.digest(), 0);
    }

    #[test]
    fn test_zero_window_digest_is_zero() {
        let mut hash = RollingHash::for_polynomial(DEFAULT_POLYNOMIAL).unwrap();
        for _ in 0..WINDOW_SIZE {
            hash.roll(0);
        }
        assert_eq!(hash.digest(), 0);
    }

    #[test]
    fn test_window_forgets_old_bytes() {
        let mut a = RollingHash::for_polynomial(DEFAULT_POLYNOMIAL).unwrap();
        let mut b = a.clone();

        for byte in pseudo_random(37, 1) {
            a.roll(byte);
        }
        for byte in pseudo_random(91, 2) {
            b.roll(byte);
        }

        let tail = pseudo_random(WINDOW_SIZE, 5);
        for &byte in &tail {
            a.roll(byte);
            b.roll(byte);
        }
        assert_eq!(a.digest(), b.digest());
    }
}
