//! Compact difficulty ("bits") encodings.
//!
//! Two encodings have been used over the chain's history:
//!
//! - **Legacy**: exponent + mantissa like Bitcoin's nBits. The top byte is a byte
//!   length, the low 23 bits a mantissa and bit 23 a sign flag.
//! - **Linear**: the 32-bit value is `256 * difficulty`, i.e. 8 fractional bits.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::target::PowVersion;
use crate::{PowError, PowResult};

/// Result of decoding a legacy compact value, flags included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCompact {
    pub value: BigUint,
    pub negative: bool,
    pub overflow: bool,
}

/// Decode a legacy compact value.
pub fn decode_compact(bits: u32) -> DecodedCompact {
    let size = bits >> 24;
    let word = bits & 0x007f_ffff;
    let value = if size <= 3 {
        BigUint::from(word >> (8 * (3 - size)))
    } else {
        BigUint::from(word) << (8 * (size - 3))
    };
    let negative = word != 0 && (bits & 0x0080_0000) != 0;
    let overflow =
        word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
    DecodedCompact {
        value,
        negative,
        overflow,
    }
}

/// Encode a non-negative value in the legacy compact form.
///
/// Precision beyond the 23-bit mantissa is truncated.
pub fn encode_compact(value: &BigUint) -> u32 {
    let mut size = ((value.bits() + 7) / 8) as u32;
    let mut compact = if size <= 3 {
        low_u64(value) << (8 * (3 - size))
    } else {
        low_u64(&(value >> (8 * (size - 3))))
    } as u32;
    // The 0x00800000 bit is the sign; move into the next byte instead.
    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }
    compact | (size << 24)
}

fn low_u64(value: &BigUint) -> u64 {
    value.iter_u64_digits().next().unwrap_or(0)
}

/// Decode a legacy compact value, rejecting negative or overflowing encodings.
pub fn legacy_difficulty(bits: u32) -> PowResult<BigUint> {
    let decoded = decode_compact(bits);
    if decoded.negative {
        return Err(PowError::MalformedEncoding(format!(
            "negative compact difficulty {:#010x}",
            bits
        )));
    }
    if decoded.overflow {
        return Err(PowError::MalformedEncoding(format!(
            "overflowing compact difficulty {:#010x}",
            bits
        )));
    }
    Ok(decoded.value)
}

/// [`legacy_difficulty`] narrowed to `u64`.
pub fn legacy_difficulty_u64(bits: u32) -> PowResult<u64> {
    legacy_difficulty(bits)?.to_u64().ok_or_else(|| {
        PowError::MalformedEncoding(format!("compact difficulty {:#010x} too large", bits))
    })
}

/// Integer part of a linear difficulty.
pub fn linear_integer_part(bits: u32) -> u32 {
    bits >> 8
}

/// Fractional step (0..=255) of a linear difficulty.
pub fn linear_fraction(bits: u32) -> u32 {
    bits & 0xff
}

/// Length of the fractional padding for a linear difficulty step.
///
/// Equals `round(2^(8 + step/256) - 256)` for every step in 0..=255, computed
/// with integer arithmetic only.
pub fn fractional_length(step: u32) -> u64 {
    let df = u64::from(step & 0xff);
    (10 * df * df * df + 7383 * df * df + 5_840_720 * df + 3_997_440) >> 23
}

/// Difficulty for display: decoded integer for legacy bits, `bits / 256` for linear.
pub fn difficulty_from_bits(bits: u32, version: PowVersion) -> f64 {
    if version == PowVersion::Legacy {
        let decoded = decode_compact(bits);
        if decoded.value.is_zero() {
            return 0.0;
        }
        decoded.value.to_f64().unwrap_or(f64::INFINITY)
    } else {
        f64::from(bits) / 256.0
    }
}
