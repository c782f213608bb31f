//! Lookup tables for the Rabin rolling hash.
//!
//! Both tables are a fixed function of the polynomial and [`WINDOW_SIZE`]:
//!
//! - `out[b] = H(b || 0^63)`: XOR-ing it into the digest cancels byte `b`
//!   leaving the window, because the hash is linear over GF(2).
//! - `modulo[b] = ((b << k) mod p) | (b << k)` where `k = deg(p)`: after the
//!   digest is shifted left by one byte, its top byte `b` indexes this table
//!   and a single XOR both clears those eight bits and adds their residue.
//!
//! Tables are built once per polynomial per process and shared through a
//! global cache.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use tracing::debug;

use crate::config::{MAX_POLYNOMIAL_DEGREE, MIN_POLYNOMIAL_DEGREE, WINDOW_SIZE};
use crate::error::ChunkError;
use crate::polynomial::Pol;

static CACHE: LazyLock<Mutex<HashMap<Pol, Arc<Tables>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Precomputed sliding and reduction tables for one polynomial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    polynomial: Pol,
    shift: u32,
    out: [u64; 256],
    modulo: [u64; 256],
}

impl Tables {
    /// Returns the shared tables for `polynomial`, building them on first use.
    ///
    /// Fails if the polynomial is reducible or its degree is outside `9..=56`.
    pub fn for_polynomial(polynomial: Pol) -> Result<Arc<Tables>, ChunkError> {
        let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tables) = cache.get(&polynomial) {
            return Ok(Arc::clone(tables));
        }

        let deg = polynomial.deg();
        if !(MIN_POLYNOMIAL_DEGREE..=MAX_POLYNOMIAL_DEGREE).contains(&deg) {
            return Err(ChunkError::InvalidPolynomial {
                polynomial,
                reason: "degree must be between 9 and 56",
            });
        }
        if !polynomial.is_irreducible() {
            return Err(ChunkError::InvalidPolynomial {
                polynomial,
                reason: "polynomial is reducible",
            });
        }

        let tables = Arc::new(Tables::build(polynomial));
        debug!(%polynomial, "built rolling hash tables");
        cache.insert(polynomial, Arc::clone(&tables));
        Ok(tables)
    }

    fn build(polynomial: Pol) -> Self {
        let k = polynomial.deg() as u32;

        let mut out = [0u64; 256];
        for (b, entry) in out.iter_mut().enumerate() {
            let mut h = append_byte(Pol::new(0), b as u8, polynomial);
            for _ in 0..WINDOW_SIZE - 1 {
                h = append_byte(h, 0, polynomial);
            }
            *entry = h.value();
        }

        let mut modulo = [0u64; 256];
        for (b, entry) in modulo.iter_mut().enumerate() {
            let high = (b as u64) << k;
            *entry = (Pol::new(high) % polynomial).value() | high;
        }

        Self {
            polynomial,
            shift: k - 8,
            out,
            modulo,
        }
    }

    /// Returns the polynomial these tables were built for.
    pub fn polynomial(&self) -> Pol {
        self.polynomial
    }

    /// Right shift that brings the byte above the polynomial's degree down
    /// to bits 0-7.
    #[inline]
    pub(crate) fn shift(&self) -> u32 {
        self.shift
    }

    #[inline]
    pub(crate) fn out(&self, byte: u8) -> u64 {
        self.out[byte as usize]
    }

    #[inline]
    pub(crate) fn modulo(&self, index: usize) -> u64 {
        self.modulo[index]
    }
}

/// `(hash * x^8 + b) mod polynomial`, the non-incremental definition the
/// tables are derived from.
pub(crate) fn append_byte(hash: Pol, b: u8, polynomial: Pol) -> Pol {
    Pol::new((hash.value() << 8) | b as u64) % polynomial
}
