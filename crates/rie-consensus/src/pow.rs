//! Constellation proof-of-work validation.
//!
//! A header proves work when `target + offset` starts an accepted prime
//! constellation. Cheap structural checks (version tag, bits range, offset bound)
//! run before any primality testing so malformed headers are rejected without
//! big-integer exponentiation.

use num_bigint::BigUint;
use num_traits::One;
use tracing::{instrument, trace};

use crate::bignum::{from_le_slice, Uint256};
use crate::chain_params::ConsensusParams;
use crate::compact::legacy_difficulty;
use crate::primality::{is_probable_prime, passes_quick_check};
use crate::primes::prime_table;
use crate::target::{generate_target, PowVersion, Target};
use crate::{PowError, PowResult};

/// Byte ranges of the structured offset used by the linear PoW version.
pub mod offset_layout {
    use std::ops::Range;

    /// Version tag.
    pub const TAG: Range<usize> = 0..2;
    /// Residual added after aligning to the primorial (12 bytes).
    pub const RESIDUAL: Range<usize> = 2..14;
    /// Primorial multiplier (16 bytes).
    pub const MULTIPLIER: Range<usize> = 14..30;
    /// Number of primes in the primorial (u16).
    pub const PRIMORIAL_COUNT: Range<usize> = 30..32;
}

/// Validates constellation proofs of work against one network's parameters.
pub struct ConstellationVerifier<'a> {
    params: &'a ConsensusParams,
}

impl<'a> ConstellationVerifier<'a> {
    pub fn new(params: &'a ConsensusParams) -> Self {
        Self { params }
    }

    /// Check that `offset` turns the target built from `hash` and `bits` into an
    /// accepted constellation.
    #[instrument(skip(self, hash, offset), fields(network = %self.params.network))]
    pub fn verify(&self, hash: &Uint256, bits: u32, offset: &Uint256) -> PowResult<()> {
        if *hash == self.params.genesis_pow_hash {
            trace!("Genesis digest, proof of work not required");
            return Ok(());
        }

        let version = PowVersion::from_offset(offset)?;
        match version {
            PowVersion::Legacy => self.check_legacy_bits(bits)?,
            PowVersion::Linear => self.check_linear_bits(bits)?,
        }

        let target = generate_target(hash, bits, version)?;
        let delta = self.decode_offset(offset, version, &target)?;
        if delta >= target.offset_limit() {
            return Err(PowError::OffsetOutOfRange {
                bits_allowed: target.trailing_zeros,
            });
        }

        let base = target.value + delta;
        let patterns = self.params.patterns_for(version);
        match patterns
            .iter()
            .position(|pattern| constellation_holds(&base, pattern))
        {
            Some(index) => {
                trace!(version = version.as_i32(), pattern = index, "Constellation found");
                Ok(())
            }
            None => Err(PowError::PatternMismatch),
        }
    }

    /// Bounds on legacy bits: a valid encoding within the historical difficulty range.
    pub fn check_legacy_bits(&self, bits: u32) -> PowResult<()> {
        let difficulty = legacy_difficulty(bits)?;
        if difficulty < BigUint::from(self.params.pow_limit_legacy) {
            return Err(PowError::MalformedEncoding(format!(
                "legacy difficulty {} below minimum {}",
                difficulty, self.params.pow_limit_legacy
            )));
        }
        if difficulty > BigUint::from(self.params.legacy_difficulty_max) {
            return Err(PowError::MalformedEncoding(format!(
                "legacy difficulty {} above maximum {}",
                difficulty, self.params.legacy_difficulty_max
            )));
        }
        Ok(())
    }

    /// Bounds on linear bits: between the network floor and ceiling.
    pub fn check_linear_bits(&self, bits: u32) -> PowResult<()> {
        if bits < self.params.n_bits_min {
            return Err(PowError::MalformedEncoding(format!(
                "linear bits {} below minimum {}",
                bits, self.params.n_bits_min
            )));
        }
        if bits > self.params.n_bits_max {
            return Err(PowError::MalformedEncoding(format!(
                "linear bits {} above maximum {}",
                bits, self.params.n_bits_max
            )));
        }
        Ok(())
    }

    /// Turn the raw offset into the integer added to the target.
    ///
    /// Legacy offsets are the integer itself. Linear offsets select a residue class
    /// modulo a primorial: `P - (target mod P) + multiplier * P + residual`.
    pub fn decode_offset(
        &self,
        offset: &Uint256,
        version: PowVersion,
        target: &Target,
    ) -> PowResult<BigUint> {
        match version {
            PowVersion::Legacy => Ok(offset.to_biguint()),
            PowVersion::Linear => {
                let bytes = offset.as_bytes();
                let count_bytes = &bytes[offset_layout::PRIMORIAL_COUNT];
                let count = u16::from_le_bytes([count_bytes[0], count_bytes[1]]);

                let limit = target.offset_limit();
                let mut primorial = BigUint::one();
                for &p in prime_table().iter().take(usize::from(count)) {
                    primorial *= p;
                    if primorial > limit {
                        return Err(PowError::PrimorialTooLarge {
                            count,
                            bits_allowed: target.trailing_zeros,
                        });
                    }
                }

                let multiplier = from_le_slice(&bytes[offset_layout::MULTIPLIER]);
                let residual = from_le_slice(&bytes[offset_layout::RESIDUAL]);
                let alignment = &primorial - (&target.value % &primorial);
                Ok(alignment + multiplier * &primorial + residual)
            }
        }
    }
}

/// Whether `base` plus each cumulative gap of `pattern` is prime.
///
/// Every member first passes a single-round filter; only then does each get the
/// full BPSW test.
pub fn constellation_holds(base: &BigUint, pattern: &[u32]) -> bool {
    let mut members = Vec::with_capacity(pattern.len());
    let mut candidate = base.clone();
    for &gap in pattern {
        candidate += gap;
        if !passes_quick_check(&candidate) {
            return false;
        }
        members.push(candidate.clone());
    }
    members.iter().all(is_probable_prime)
}

/// Validate a proof of work, reporting why it fails.
pub fn verify_proof_of_work(
    hash: &Uint256,
    bits: u32,
    offset: &Uint256,
    params: &ConsensusParams,
) -> PowResult<()> {
    ConstellationVerifier::new(params).verify(hash, bits, offset)
}

/// Validate a proof of work.
pub fn check_proof_of_work(
    hash: &Uint256,
    bits: u32,
    offset: &Uint256,
    params: &ConsensusParams,
) -> bool {
    match verify_proof_of_work(hash, bits, offset, params) {
        Ok(()) => true,
        Err(e) => {
            trace!(error = %e, "Proof of work rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bignum::pow2;
    use crate::compact::encode_compact;

    /// 2^303 + QUADRUPLET_DELTA starts a prime quadruplet (n, n+2, n+6, n+8).
    const QUADRUPLET_DELTA: u64 = 0x14a0_c64b;

    fn quadruplet_params() -> ConsensusParams {
        ConsensusParams {
            patterns_legacy: vec![vec![0, 2, 4, 2]],
            patterns: vec![vec![0, 2, 4, 2]],
            ..ConsensusParams::mainnet()
        }
    }

    /// Quadruplet parameters without a linear floor, so 304-bit targets stay usable.
    fn floorless_quadruplet_params() -> ConsensusParams {
        ConsensusParams {
            n_bits_min: 0,
            ..quadruplet_params()
        }
    }

    fn linear_offset(count: u16, multiplier: u64, residual: u64) -> Uint256 {
        let mut bytes = [0u8; 32];
        bytes[offset_layout::TAG].copy_from_slice(&2u16.to_le_bytes());
        bytes[2..10].copy_from_slice(&residual.to_le_bytes());
        bytes[14..22].copy_from_slice(&multiplier.to_le_bytes());
        bytes[offset_layout::PRIMORIAL_COUNT].copy_from_slice(&count.to_le_bytes());
        Uint256(bytes)
    }

    // ============ Genesis ============

    #[test]
    fn test_genesis_digest_accepted_without_arithmetic() {
        let params = ConsensusParams::mainnet();
        // Zero offset carries no valid version tag; only the genesis rule accepts it.
        assert!(check_proof_of_work(
            &params.genesis_pow_hash,
            0x0201_3000,
            &Uint256::ZERO,
            &params
        ));
        assert!(!check_proof_of_work(
            &Uint256::from_u64(1),
            0x0201_3000,
            &Uint256::ZERO,
            &params
        ));
    }

    // ============ Legacy version ============

    #[test]
    fn test_legacy_quadruplet_accepted() {
        let params = quadruplet_params();
        let offset = Uint256::from_u64(QUADRUPLET_DELTA);
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, 0x0201_3000, &offset, &params),
            Ok(())
        );
    }

    #[test]
    fn test_legacy_quadruplet_rejected_by_sextuplet_network() {
        let params = ConsensusParams::mainnet();
        let offset = Uint256::from_u64(QUADRUPLET_DELTA);
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, 0x0201_3000, &offset, &params),
            Err(PowError::PatternMismatch)
        );
    }

    #[test]
    fn test_mutated_offset_rejected() {
        let params = quadruplet_params();
        for delta in [QUADRUPLET_DELTA + 2, QUADRUPLET_DELTA - 2] {
            assert_eq!(
                verify_proof_of_work(&Uint256::ZERO, 0x0201_3000, &Uint256::from_u64(delta), &params),
                Err(PowError::PatternMismatch)
            );
        }
    }

    #[test]
    fn test_mutated_pattern_rejected() {
        let base = pow2(303) + QUADRUPLET_DELTA;
        assert!(constellation_holds(&base, &[0, 2, 4, 2]));
        for i in 1..4 {
            let mut pattern = vec![0, 2, 4, 2];
            pattern[i] += 1;
            assert!(!constellation_holds(&base, &pattern), "{:?}", pattern);
        }
    }

    #[test]
    fn test_regtest_single_prime() {
        // 2^303 + 101 is prime
        let params = ConsensusParams::regtest();
        assert!(check_proof_of_work(
            &Uint256::ZERO,
            0x0201_3000,
            &Uint256::from_u64(101),
            &params
        ));
        assert!(!check_proof_of_work(
            &Uint256::ZERO,
            0x0201_3000,
            &Uint256::from_u64(103),
            &params
        ));
    }

    #[test]
    fn test_legacy_offset_out_of_range() {
        let params = quadruplet_params();
        let offset = Uint256::from_biguint(&(pow2(39) + 1u32)).unwrap();
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, 0x0201_3000, &offset, &params),
            Err(PowError::OffsetOutOfRange { bits_allowed: 39 })
        );
    }

    #[test]
    fn test_legacy_bits_bounds() {
        let params = ConsensusParams::mainnet();
        let offset = Uint256::from_u64(1);
        let below = encode_compact(&BigUint::from(303u32));
        let above = encode_compact(&BigUint::from(65_536u32));
        for bits in [below, above, 0x0280_0130, 0xff12_3456] {
            assert!(
                matches!(
                    verify_proof_of_work(&Uint256::ZERO, bits, &offset, &params),
                    Err(PowError::MalformedEncoding(_))
                ),
                "{:#x}",
                bits
            );
        }
    }

    // ============ Linear version ============

    #[test]
    fn test_linear_quadruplet_accepted() {
        let params = quadruplet_params();
        // Difficulty 600, the mainnet floor; P = 6469693230 (ten primes)
        let bits = 600 << 8;
        let offset = linear_offset(10, 26_843_771, 101);
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, bits, &offset, &params),
            Ok(())
        );
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, bits, &linear_offset(10, 26_843_771, 103), &params),
            Err(PowError::PatternMismatch)
        );
    }

    #[test]
    fn test_linear_offset_decodes_to_residue_class() {
        let params = floorless_quadruplet_params();
        // P = 510510 (seven primes); target 2^303
        let offset = linear_offset(7, 677, 405_521);
        let verifier = ConstellationVerifier::new(&params);
        let target = generate_target(&Uint256::ZERO, 304 << 8, PowVersion::Linear).unwrap();
        let delta = verifier
            .decode_offset(&offset, PowVersion::Linear, &target)
            .unwrap();
        assert_eq!(delta, BigUint::from(QUADRUPLET_DELTA));
        assert_eq!(verifier.verify(&Uint256::ZERO, 304 << 8, &offset), Ok(()));
    }

    #[test]
    fn test_linear_wrong_residual_rejected() {
        let params = floorless_quadruplet_params();
        let offset = linear_offset(7, 677, 405_523);
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, 304 << 8, &offset, &params),
            Err(PowError::PatternMismatch)
        );
    }

    #[test]
    fn test_linear_primorial_too_large() {
        let params = floorless_quadruplet_params();
        // primorial of 11 primes fits below 2^39, of 12 does not
        let fits = linear_offset(11, 0, 0);
        assert!(!matches!(
            verify_proof_of_work(&Uint256::ZERO, 304 << 8, &fits, &params),
            Err(PowError::PrimorialTooLarge { .. })
        ));
        let too_many = linear_offset(12, 0, 0);
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, 304 << 8, &too_many, &params),
            Err(PowError::PrimorialTooLarge {
                count: 12,
                bits_allowed: 39
            })
        );
        let max_count = linear_offset(u16::MAX, 0, 0);
        assert!(verify_proof_of_work(&Uint256::ZERO, 304 << 8, &max_count, &params).is_err());
    }

    #[test]
    fn test_linear_multiplier_out_of_range() {
        let params = floorless_quadruplet_params();
        let offset = linear_offset(7, 1 << 30, 0);
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, 304 << 8, &offset, &params),
            Err(PowError::OffsetOutOfRange { bits_allowed: 39 })
        );
    }

    #[test]
    fn test_linear_insufficient_digits() {
        let params = floorless_quadruplet_params();
        let offset = linear_offset(0, 0, 1);
        assert!(matches!(
            verify_proof_of_work(&Uint256::ZERO, 264 << 8, &offset, &params),
            Err(PowError::InsufficientSignificantDigits { .. })
        ));
    }

    #[test]
    fn test_linear_bits_bounds() {
        let params = quadruplet_params();
        let verifier = ConstellationVerifier::new(&params);
        let offset = linear_offset(10, 26_843_771, 101);

        for bits in [0, 304 << 8, params.n_bits_min - 1] {
            assert!(
                matches!(
                    verifier.verify(&Uint256::ZERO, bits, &offset),
                    Err(PowError::MalformedEncoding(_))
                ),
                "{:#x}",
                bits
            );
        }
        assert!(verifier.check_linear_bits(params.n_bits_min).is_ok());
        assert!(verifier.check_linear_bits(params.n_bits_max).is_ok());
        assert!(verifier.check_linear_bits(params.n_bits_max + 1).is_err());
    }

    #[test]
    fn test_huge_linear_bits_rejected_before_target() {
        // u32::MAX would describe a target millions of bits wide.
        let params = quadruplet_params();
        let offset = linear_offset(10, 0, 1);
        assert_eq!(
            verify_proof_of_work(&Uint256::from_u64(7), u32::MAX, &offset, &params),
            Err(PowError::MalformedEncoding(format!(
                "linear bits {} above maximum {}",
                u32::MAX,
                params.n_bits_max
            )))
        );
    }

    #[test]
    fn test_unknown_version_rejected() {
        let params = ConsensusParams::mainnet();
        assert_eq!(
            verify_proof_of_work(&Uint256::ZERO, 304 << 8, &Uint256::from_u64(4), &params),
            Err(PowError::UnknownPowVersion { low_bits: 4 })
        );
    }
}
