//! Configuration for chunking behavior.
//!
//! [`ChunkConfig`] fixes the size boundaries, the boundary mask and the
//! polynomial of a chunker. All four are part of the on-disk contract: two
//! parties only produce the same chunk boundaries if they agree on every one.
//!
//! # Example
//!
//! ```
//! use rabin_chunker::ChunkConfig;
//!
//! // restic-compatible defaults
//! let config = ChunkConfig::default();
//!
//! // Small chunks for tests and tiny inputs
//! let config = ChunkConfig::new(1024, 8192)?.with_average_bits(12);
//! assert_eq!(config.mask(), 0xfff);
//! # Ok::<(), rabin_chunker::ChunkError>(())
//! ```

use crate::error::ChunkError;
use crate::polynomial::Pol;

/// Number of trailing bytes covered by the rolling hash.
pub const WINDOW_SIZE: usize = 64;

/// Default minimum chunk size (512 KiB).
pub const DEFAULT_MIN_SIZE: usize = 512 * 1024;

/// Default maximum chunk size (8 MiB).
pub const DEFAULT_MAX_SIZE: usize = 8 * 1024 * 1024;

/// Default number of digest bits that must be zero at a boundary (~1 MiB chunks).
pub const DEFAULT_AVERAGE_BITS: u32 = 20;

/// Default irreducible polynomial of degree 53.
pub const DEFAULT_POLYNOMIAL: Pol = Pol::new(0x3DA3_358B_4DC1_73);

/// Smallest polynomial degree the hash tables support.
pub(crate) const MIN_POLYNOMIAL_DEGREE: i32 = 9;

/// Largest polynomial degree the hash tables support: the digest is shifted
/// left by one byte before reduction and must stay inside 64 bits.
pub(crate) const MAX_POLYNOMIAL_DEGREE: i32 = 56;

/// Configuration for content-defined chunking.
///
/// Size constraints: `0 < min_size < max_size`. A boundary is declared where
/// the low `average_bits` bits of the rolling digest are all zero, so chunks
/// average about `2^average_bits` bytes on random input (plus `min_size`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkConfig {
    min_size: usize,
    max_size: usize,
    average_bits: u32,
    polynomial: Pol,
}

impl ChunkConfig {
    /// Creates a configuration with the given size bounds and default mask
    /// and polynomial.
    ///
    /// Returns an error if `min_size` is zero or not below `max_size`.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self, ChunkError> {
        let config = Self {
            min_size,
            max_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the minimum chunk size.
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self
    }

    /// Sets the maximum chunk size.
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Sets how many low digest bits must be zero at a boundary (0-63).
    pub fn with_average_bits(mut self, bits: u32) -> Self {
        self.average_bits = bits;
        self
    }

    /// Sets the polynomial. It must be irreducible; that is checked when a
    /// [`Chunker`](crate::Chunker) is first built for it.
    pub fn with_polynomial(mut self, polynomial: Pol) -> Self {
        self.polynomial = polynomial;
        self
    }

    /// Returns the minimum chunk size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Returns the maximum chunk size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the number of mask bits.
    pub fn average_bits(&self) -> u32 {
        self.average_bits
    }

    /// Returns the polynomial.
    pub fn polynomial(&self) -> Pol {
        self.polynomial
    }

    /// Returns the boundary mask, `2^average_bits - 1`.
    pub fn mask(&self) -> u64 {
        (1u64 << self.average_bits) - 1
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.min_size == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "min_size must be non-zero",
            });
        }

        if self.min_size >= self.max_size {
            return Err(ChunkError::InvalidConfig {
                message: "min_size must be smaller than max_size",
            });
        }

        if self.average_bits > 63 {
            return Err(ChunkError::InvalidConfig {
                message: "average_bits must be at most 63",
            });
        }

        let deg = self.polynomial.deg();
        if !(MIN_POLYNOMIAL_DEGREE..=MAX_POLYNOMIAL_DEGREE).contains(&deg) {
            return Err(ChunkError::InvalidPolynomial {
                polynomial: self.polynomial,
                reason: "degree must be between 9 and 56",
            });
        }

        Ok(())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            average_bits: DEFAULT_AVERAGE_BITS,
            polynomial: DEFAULT_POLYNOMIAL,
        }
    }
}
