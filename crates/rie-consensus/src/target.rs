//! Constellation target construction.
//!
//! The target is a big integer with exactly `difficulty` significant bits: a
//! leading one, an 8-bit length field, the 256 digest bits, then zero padding.
//! The padding width ("trailing zeros") bounds the offset a solution may add.

use num_bigint::BigUint;
use tracing::trace;

use crate::bignum::{bit_reversed, pow2, Uint256};
use crate::compact::{fractional_length, legacy_difficulty_u64, linear_fraction, linear_integer_part};
use crate::params::{MIN_SIGNIFICANT_BITS, POW_VERSION_TAG};
use crate::{PowError, PowResult};

/// PoW encoding version selected by the low bits of a header's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowVersion {
    /// Offset bit 0 set: legacy compact bits, digest bits interleaved, raw offset.
    Legacy,
    /// Low 16 bits equal the version tag: linear bits, digest suffix, primorial offset.
    Linear,
}

impl PowVersion {
    /// Read the version tag from an offset.
    pub fn from_offset(offset: &Uint256) -> PowResult<Self> {
        let low_bits = offset.low_u16();
        if low_bits & 1 == 1 {
            Ok(PowVersion::Legacy)
        } else if low_bits == POW_VERSION_TAG {
            Ok(PowVersion::Linear)
        } else {
            Err(PowError::UnknownPowVersion { low_bits })
        }
    }

    /// Numeric form used in logs and header tooling: -1 legacy, 1 linear.
    pub fn as_i32(self) -> i32 {
        match self {
            PowVersion::Legacy => -1,
            PowVersion::Linear => 1,
        }
    }
}

/// A constructed target and the number of zero bits padded below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub value: BigUint,
    pub trailing_zeros: u32,
}

impl Target {
    /// Exclusive upper bound on the offset: `2^trailing_zeros`.
    pub fn offset_limit(&self) -> BigUint {
        pow2(self.trailing_zeros)
    }
}

/// Build the target for `hash` at difficulty `bits` under `version`.
///
/// Fails with [`PowError::InsufficientSignificantDigits`] when the difficulty is
/// below the 265 bits the leading one, length field and digest occupy.
pub fn generate_target(hash: &Uint256, bits: u32, version: PowVersion) -> PowResult<Target> {
    let (difficulty, head) = match version {
        PowVersion::Legacy => {
            let difficulty = legacy_difficulty_u64(bits)?;
            // 1, eight zero bits, then the digest bits in reverse order
            let head = pow2(MIN_SIGNIFICANT_BITS - 1) + bit_reversed(hash);
            (difficulty, head)
        }
        PowVersion::Linear => {
            let difficulty = u64::from(linear_integer_part(bits));
            // 1 and the fractional length field, then the digest as a suffix
            let length = BigUint::from(256 + fractional_length(linear_fraction(bits)));
            let head = (length << 256u32) + hash.to_biguint();
            (difficulty, head)
        }
    };

    if difficulty < u64::from(MIN_SIGNIFICANT_BITS) {
        return Err(PowError::InsufficientSignificantDigits {
            difficulty,
            required: MIN_SIGNIFICANT_BITS,
        });
    }
    let trailing_zeros = u32::try_from(difficulty - u64::from(MIN_SIGNIFICANT_BITS))
        .map_err(|_| PowError::MalformedEncoding(format!("difficulty {} too large", difficulty)))?;

    trace!(
        version = version.as_i32(),
        bits,
        difficulty,
        trailing_zeros,
        "Generated target"
    );

    Ok(Target {
        value: head << trailing_zeros,
        trailing_zeros,
    })
}
