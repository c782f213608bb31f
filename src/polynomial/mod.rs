//! Polynomials over GF(2) packed into a `u64`.
//!
//! Bit `i` of the value is the coefficient of `x^i`, so `0b1011` is
//! `x^3 + x + 1`. Addition is XOR; multiplication and division are carry-less.
//! The rolling hash reduces modulo an irreducible polynomial of degree 53, see
//! [`crate::config::DEFAULT_POLYNOMIAL`].

use std::fmt;
use std::io::Read;
use std::ops::{Add, Rem};
use std::str::FromStr;

use crate::error::ChunkError;

/// Upper bound on candidates tested by [`Pol::derive`].
pub const DERIVE_MAX_ATTEMPTS: usize = 1_000_000;

/// A polynomial over GF(2) of degree at most 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pol(u64);

impl Pol {
    /// Wraps a raw coefficient mask.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw coefficient mask.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the degree, or `-1` for the zero polynomial.
    pub const fn deg(self) -> i32 {
        63 - self.0.leading_zeros() as i32
    }

    /// Multiplies two polynomials, or returns `None` if the product has
    /// degree 64 or more.
    pub fn checked_mul(self, rhs: Pol) -> Option<Pol> {
        if self.0 == 0 || rhs.0 == 0 {
            return Some(Pol(0));
        }
        if self.deg() + rhs.deg() >= 64 {
            return None;
        }

        let mut res = 0u64;
        for i in 0..=rhs.deg() {
            if rhs.0 & (1 << i) != 0 {
                res ^= self.0 << i;
            }
        }
        Some(Pol(res))
    }

    /// Returns quotient and remainder of `self / d`.
    ///
    /// # Panics
    ///
    /// Panics if `d` is zero.
    pub fn div_rem(self, d: Pol) -> (Pol, Pol) {
        assert!(d.0 != 0, "division by the zero polynomial");

        let dd = d.deg();
        let mut q = 0u64;
        let mut x = self.0;
        loop {
            let diff = Pol(x).deg() - dd;
            if diff < 0 {
                break;
            }
            q |= 1 << diff;
            x ^= d.0 << diff;
        }
        (Pol(q), Pol(x))
    }

    /// Returns `self / d`, discarding the remainder.
    pub fn div(self, d: Pol) -> Pol {
        self.div_rem(d).0
    }

    /// Greatest common divisor.
    pub fn gcd(self, other: Pol) -> Pol {
        let (mut a, mut b) = (self, other);
        while b.0 != 0 {
            let r = a % b;
            a = b;
            b = r;
        }
        a
    }

    /// Computes `(self * f) mod g` without overflowing intermediate products.
    pub fn mul_mod(self, f: Pol, g: Pol) -> Pol {
        let mut a = self % g;
        let mut f = f.0;
        let mut res = 0u64;
        while f != 0 {
            if f & 1 != 0 {
                res ^= a.0;
            }
            f >>= 1;
            // deg(a) < deg(g) <= 63, so the shift cannot drop a coefficient
            a = Pol(a.0 << 1) % g;
        }
        Pol(res)
    }

    /// Ben-Or irreducibility test: `self` is irreducible iff
    /// `gcd(self, x^(2^i) - x mod self) == 1` for every `i` up to `deg / 2`.
    pub fn is_irreducible(self) -> bool {
        let deg = self.deg();
        if deg < 1 {
            return false;
        }
        (1..=deg / 2).all(|i| self.gcd(qp(i as u32, self)) == Pol(1))
    }

    /// Renders the polynomial in `x^n+...+x+1` notation.
    pub fn expand(self) -> String {
        if self.0 == 0 {
            return "0".to_string();
        }

        let mut terms = Vec::new();
        for i in (2..=self.deg()).rev() {
            if self.0 & (1 << i) != 0 {
                terms.push(format!("x^{i}"));
            }
        }
        if self.0 & 2 != 0 {
            terms.push("x".to_string());
        }
        if self.0 & 1 != 0 {
            terms.push("1".to_string());
        }
        terms.join("+")
    }

    /// Draws candidates of degree 53 from `source` until one is irreducible.
    ///
    /// Each candidate consumes eight little-endian bytes; bits above 53 are
    /// masked off and the `x^53` and constant terms are forced on. Feed it an
    /// OS randomness source to pick a fresh polynomial for a new repository.
    pub fn derive<R: Read>(mut source: R) -> Result<Pol, ChunkError> {
        let mut buf = [0u8; 8];
        for _ in 0..DERIVE_MAX_ATTEMPTS {
            source.read_exact(&mut buf)?;

            let f = (u64::from_le_bytes(buf) & ((1 << 54) - 1)) | (1 << 53) | 1;
            let candidate = Pol(f);
            if candidate.is_irreducible() {
                return Ok(candidate);
            }
        }

        Err(ChunkError::NoIrreduciblePolynomial {
            attempts: DERIVE_MAX_ATTEMPTS,
        })
    }
}

/// `(x^(2^p) - x) mod g`.
fn qp(p: u32, g: Pol) -> Pol {
    let mut res = Pol(2);
    for _ in 0..p {
        res = res.mul_mod(res, g);
    }
    (res + Pol(2)) % g
}

impl Add for Pol {
    type Output = Pol;

    fn add(self, rhs: Pol) -> Pol {
        Pol(self.0 ^ rhs.0)
    }
}

impl Rem for Pol {
    type Output = Pol;

    fn rem(self, d: Pol) -> Pol {
        self.div_rem(d).1
    }
}

impl From<u64> for Pol {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Pol> for u64 {
    fn from(pol: Pol) -> Self {
        pol.0
    }
}

impl fmt::Display for Pol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Pol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for Pol {
    type Err = std::num::ParseIntError;

    /// Parses hex, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u64::from_str_radix(digits, 16).map(Pol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_POLYNOMIAL;

    #[test]
    fn test_deg() {
        assert_eq!(Pol(0).deg(), -1);
        assert_eq!(Pol(1).deg(), 0);
        assert_eq!(Pol(2).deg(), 1);
        assert_eq!(Pol(0xB).deg(), 3);
        assert_eq!(Pol(1 << 63).deg(), 63);
        assert_eq!(DEFAULT_POLYNOMIAL.deg(), 53);
    }

    #[test]
    fn test_add_is_xor() {
        assert_eq!(Pol(23) + Pol(16), Pol(23 ^ 16));
        assert_eq!(Pol(0xB) + Pol(0xB), Pol(0));
    }

    #[test]
    fn test_checked_mul() {
        // (x + 1)^2 = x^2 + 1 over GF(2)
        assert_eq!(Pol(3).checked_mul(Pol(3)), Some(Pol(5)));
        assert_eq!(Pol(2).checked_mul(Pol(2)), Some(Pol(4)));
        assert_eq!(Pol(0).checked_mul(Pol(1 << 63)), Some(Pol(0)));
        assert_eq!(Pol(1 << 63).checked_mul(Pol(2)), None);
    }

    #[test]
    fn test_div_rem() {
        assert_eq!(Pol(5).div_rem(Pol(3)), (Pol(3), Pol(0)));
        assert_eq!(Pol(5).div(Pol(3)), Pol(3));
        // x^3 = 1 * (x^3 + x + 1) + (x + 1)
        assert_eq!(Pol(8).div_rem(Pol(0xB)), (Pol(1), Pol(3)));
        // dividend of lower degree is its own remainder
        assert_eq!(Pol(3) % Pol(0xB), Pol(3));
    }

    #[test]
    #[should_panic(expected = "division by the zero polynomial")]
    fn test_div_by_zero_panics() {
        let _ = Pol(5) % Pol(0);
    }

    #[test]
    fn test_gcd() {
        assert_eq!(Pol(5).gcd(Pol(3)), Pol(3));
        assert_eq!(Pol(3).gcd(Pol(5)), Pol(3));
        assert_eq!(Pol(0xB).gcd(Pol(7)), Pol(1));
        assert_eq!(Pol(0).gcd(Pol(7)), Pol(7));
    }

    #[test]
    fn test_mul_mod() {
        assert_eq!(Pol(3).mul_mod(Pol(3), Pol(0xB)), Pol(5));
        // x^2 * x = x^3 = x + 1 mod (x^3 + x + 1)
        assert_eq!(Pol(4).mul_mod(Pol(2), Pol(0xB)), Pol(3));

        let a = Pol(0x1234_5678);
        let b = Pol(0xfedc_ba98);
        let direct = a.checked_mul(b).map(|p| p % DEFAULT_POLYNOMIAL);
        assert_eq!(Some(a.mul_mod(b, DEFAULT_POLYNOMIAL)), direct);
    }

    #[test]
    fn test_irreducible() {
        assert!(Pol(2).is_irreducible());
        assert!(Pol(3).is_irreducible());
        assert!(Pol(7).is_irreducible());
        assert!(Pol(0xB).is_irreducible());
        assert!(Pol(0x1F).is_irreducible());

        assert!(!Pol(0).is_irreducible());
        assert!(!Pol(1).is_irreducible());
        assert!(!Pol(5).is_irreducible());
        // (x^2 + x + 1)^2
        assert!(!Pol(0x15).is_irreducible());
        // x^53 + 1 has root 1
        assert!(!Pol((1 << 53) | 1).is_irreducible());
    }

    #[test]
    fn test_default_polynomial_is_irreducible() {
        assert!(DEFAULT_POLYNOMIAL.is_irreducible());
    }

    #[test]
    fn test_expand() {
        assert_eq!(Pol(0).expand(), "0");
        assert_eq!(Pol(1).expand(), "1");
        assert_eq!(Pol(2).expand(), "x");
        assert_eq!(Pol(0xB).expand(), "x^3+x+1");
        assert_eq!(Pol(0x14).expand(), "x^4+x^2");
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(DEFAULT_POLYNOMIAL.to_string(), "0x3da3358b4dc173");
        assert_eq!("0x3da3358b4dc173".parse::<Pol>().unwrap(), DEFAULT_POLYNOMIAL);
        assert_eq!("3DA3358B4DC173".parse::<Pol>().unwrap(), DEFAULT_POLYNOMIAL);
        assert!("0xzz".parse::<Pol>().is_err());
    }

    #[test]
    fn test_derive_skips_reducible_candidates() {
        // first candidate becomes x^53 + 1 (reducible), second is the default
        let mut source = vec![0u8; 8];
        source.extend_from_slice(&DEFAULT_POLYNOMIAL.value().to_le_bytes());

        let pol = Pol::derive(&source[..]).unwrap();
        assert_eq!(pol, DEFAULT_POLYNOMIAL);
        assert_eq!(pol.deg(), 53);
    }

    #[test]
    fn test_derive_short_source() {
        let err = Pol::derive(&[1u8, 2, 3][..]).unwrap_err();
        assert!(matches!(err, ChunkError::Io(_)));
    }
}
