//! Arbitrary-precision arithmetic adapter.
//!
//! Digests and offsets travel as [`Uint256`], a 32-byte little-endian value laid out
//! the way block headers store them. All arithmetic happens on
//! [`num_bigint::BigUint`]; the helpers here cover the conversions and the few
//! number-theoretic primitives the consensus rules need beyond what `num-bigint`
//! provides directly.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;

/// A 256-bit value stored little-endian (byte 0 is least significant).
///
/// Hex formatting follows the block-explorer convention: most significant byte first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uint256(pub [u8; 32]);

impl Uint256 {
    /// The all-zero value.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Wrap raw little-endian bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw little-endian bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&value.to_le_bytes());
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The low 16 bits, used to tag the PoW encoding version of an offset.
    pub fn low_u16(&self) -> u16 {
        u16::from_le_bytes([self.0[0], self.0[1]])
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0)
    }

    /// Convert back from a big integer; `None` if it needs more than 256 bits.
    pub fn from_biguint(value: &BigUint) -> Option<Self> {
        if value.bits() > 256 {
            return None;
        }
        let le = value.to_bytes_le();
        let mut bytes = [0u8; 32];
        bytes[..le.len()].copy_from_slice(&le);
        Some(Self(bytes))
    }

    /// Parse display-order hex (most significant byte first).
    ///
    /// A `0x` prefix is accepted and short strings are zero-extended on the left.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() > 64 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let padded = format!("{:0>64}", s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(padded, &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }

    /// Display-order hex (most significant byte first).
    pub fn to_hex(&self) -> String {
        let mut be = self.0;
        be.reverse();
        hex::encode(be)
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uint256({})", self.to_hex())
    }
}

impl FromStr for Uint256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Interpret a little-endian byte slice as an unsigned integer.
pub fn from_le_slice(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}

/// `2^exponent`.
pub fn pow2(exponent: u32) -> BigUint {
    BigUint::one() << exponent
}

/// The 256 bits of `value` in reverse order: bit 0 of byte 0 becomes the most
/// significant bit of the result.
pub fn bit_reversed(value: &Uint256) -> BigUint {
    let reversed: Vec<u8> = value.0.iter().map(|b| b.reverse_bits()).collect();
    BigUint::from_bytes_be(&reversed)
}

pub fn is_perfect_square(n: &BigUint) -> bool {
    let root = n.sqrt();
    &root * &root == *n
}

/// Jacobi symbol `(a | n)` for a small signed `a` and odd positive `n`.
///
/// Returns 0 for an even `n`, where the symbol is undefined.
pub fn jacobi(a: i64, n: &BigUint) -> i32 {
    if n.is_even() {
        return 0;
    }
    let n_low = n.iter_u32_digits().next().unwrap_or(0);
    let mut result = 1i32;

    // (-1 | n) = (-1)^((n-1)/2)
    if a < 0 && n_low & 3 == 3 {
        result = -result;
    }

    let mut m = a.unsigned_abs();
    if m == 0 {
        return if n.is_one() { 1 } else { 0 };
    }
    while m & 1 == 0 {
        m >>= 1;
        if matches!(n_low & 7, 3 | 5) {
            result = -result;
        }
    }
    if m == 1 {
        return result;
    }

    // Quadratic reciprocity moves the big modulus into the small argument.
    if m & 3 == 3 && n_low & 3 == 3 {
        result = -result;
    }
    let reduced = (n % m).to_u64().unwrap_or(0);
    result * jacobi_u64(reduced, m)
}

fn jacobi_u64(mut a: u64, mut n: u64) -> i32 {
    let mut result = 1i32;
    a %= n;
    while a != 0 {
        while a & 1 == 0 {
            a >>= 1;
            if matches!(n & 7, 3 | 5) {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if a & 3 == 3 && n & 3 == 3 {
            result = -result;
        }
        a %= n;
    }
    if n == 1 {
        result
    } else {
        0
    }
}

/// Floor of the `k`-th root.
pub fn integer_root(value: &BigUint, k: u32) -> BigUint {
    if value.is_zero() || k <= 1 {
        return value.clone();
    }
    value.nth_root(k)
}
