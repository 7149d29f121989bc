//! Difficulty transition validation.
//!
//! Decides whether a header may claim `new_bits` given its parent's `old_bits`,
//! without access to the rest of the chain. Rules that depend on timestamps are
//! checked against the widest range those timestamps could produce.

use num_bigint::BigUint;
use tracing::debug;

use crate::chain_params::ConsensusParams;
use crate::compact::{decode_compact, encode_compact, legacy_difficulty};
use crate::difficulty::{superblock_difficulty, DifficultyRetarget};
use crate::params::{
    MAX_SOLVE_TIME_FACTOR, SUPERBLOCK_DIFFICULTY_NUMERATOR, SUPERBLOCK_DIFFICULTY_SHIFT,
};
use crate::{PowError, PowResult};

/// Check the transition from `old_bits` (parent) to `new_bits` (block at `height`).
pub fn check_difficulty_transition(
    params: &ConsensusParams,
    height: u32,
    old_bits: u32,
    new_bits: u32,
) -> PowResult<()> {
    if params.allow_min_difficulty_blocks {
        return Ok(());
    }
    let permitted = if params.no_retargeting {
        new_bits == old_bits
    } else if params.is_fork2_active(height) {
        linear_transition_permitted(params, height, old_bits, new_bits)?
    } else {
        legacy_transition_permitted(params, height, old_bits, new_bits)?
    };

    if permitted {
        Ok(())
    } else {
        debug!(height, old_bits, new_bits, "Difficulty transition rejected");
        Err(PowError::ConsensusMismatch {
            height,
            old_bits,
            new_bits,
        })
    }
}

/// Whether the transition from `old_bits` to `new_bits` at `height` is permitted.
pub fn permitted_difficulty_transition(
    params: &ConsensusParams,
    height: u32,
    old_bits: u32,
    new_bits: u32,
) -> bool {
    check_difficulty_transition(params, height, old_bits, new_bits).is_ok()
}

fn linear_transition_permitted(
    params: &ConsensusParams,
    height: u32,
    old_bits: u32,
    new_bits: u32,
) -> PowResult<bool> {
    let engine = DifficultyRetarget::new(params);
    if height == params.fork2_height {
        return Ok(new_bits == engine.fork2_transition_bits(old_bits)?);
    }
    // Slowest credible block lowers the difficulty most, a block stamped
    // max_future_block_time before its parent raises it most.
    let lowest = engine.asert_next_bits(old_bits, MAX_SOLVE_TIME_FACTOR * params.target_spacing);
    let highest = engine.asert_next_bits(old_bits, -params.max_future_block_time);
    Ok(lowest <= new_bits && new_bits <= highest)
}

fn legacy_transition_permitted(
    params: &ConsensusParams,
    height: u32,
    old_bits: u32,
    new_bits: u32,
) -> PowResult<bool> {
    let interval = params.difficulty_adjustment_interval();

    if height % interval == 0 {
        let new_difficulty = legacy_difficulty(new_bits)?;
        let limit = BigUint::from(params.pow_limit_legacy);
        if height < 2 * interval {
            return Ok(new_difficulty >= limit);
        }
        let engine = DifficultyRetarget::new(params);
        let old_difficulty = legacy_difficulty(old_bits)?;
        let timespan = params.target_timespan;
        let smallest = compact_round_trip(
            engine
                .retarget_legacy(&old_difficulty, timespan * 4, height)
                .max(limit.clone()),
        );
        let largest = compact_round_trip(
            engine
                .retarget_legacy(&old_difficulty, timespan / 4, height)
                .max(limit),
        );
        return Ok(smallest <= new_difficulty && new_difficulty <= largest);
    }

    if params.superblocks_active(height) {
        if params.is_superblock(height) {
            let expected = encode_compact(&superblock_difficulty(&legacy_difficulty(old_bits)?));
            return Ok(new_bits == expected);
        }
        if height > 0 && params.is_superblock(height - 1) {
            // The block after a superblock restores the previous difficulty; the
            // inverse of the superblock scaling is only accurate to one unit.
            let old_difficulty = legacy_difficulty(old_bits)?;
            let new_difficulty = legacy_difficulty(new_bits)?;
            let restored = (old_difficulty << SUPERBLOCK_DIFFICULTY_SHIFT)
                / SUPERBLOCK_DIFFICULTY_NUMERATOR;
            let distance = if new_difficulty > restored {
                new_difficulty - restored
            } else {
                restored - new_difficulty
            };
            return Ok(distance <= BigUint::from(1u32));
        }
    }

    Ok(new_bits == old_bits)
}

/// The value a difficulty takes after compact encoding.
fn compact_round_trip(difficulty: BigUint) -> BigUint {
    decode_compact(encode_compact(&difficulty)).value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_of(difficulty: u32) -> u32 {
        encode_compact(&BigUint::from(difficulty))
    }

    // ============ Exemptions ============

    #[test]
    fn test_min_difficulty_networks_exempt() {
        for params in [ConsensusParams::testnet(), ConsensusParams::regtest()] {
            assert!(permitted_difficulty_transition(&params, 10, 0x0201_3000, 0x1d00_ffff));
        }
    }

    // ============ Post-fork2 ============

    #[test]
    fn test_linear_range() {
        let params = ConsensusParams::mainnet();
        let engine = DifficultyRetarget::new(&params);
        let height = params.fork2_height + 100;
        let old = 300_000;
        let lowest = engine.asert_next_bits(old, 12 * params.target_spacing);
        let highest = engine.asert_next_bits(old, -params.max_future_block_time);
        assert!(lowest < old && old < highest);

        for new in [lowest, old, highest] {
            assert!(permitted_difficulty_transition(&params, height, old, new));
        }
        assert!(!permitted_difficulty_transition(&params, height, old, lowest - 1));
        assert!(!permitted_difficulty_transition(&params, height, old, highest + 1));
    }

    #[test]
    fn test_fork2_transition_exact() {
        let params = ConsensusParams::mainnet();
        let height = params.fork2_height;
        assert!(permitted_difficulty_transition(&params, height, 0x0205_f200, 1522 * 171));
        assert!(!permitted_difficulty_transition(&params, height, 0x0205_f200, 1522 * 171 + 1));
        assert!(!permitted_difficulty_transition(&params, height, 0x0480_0001, 1522 * 171));
    }

    #[test]
    fn test_mismatch_error_carries_context() {
        let params = ConsensusParams::mainnet();
        assert_eq!(
            check_difficulty_transition(&params, 1_000, 0x0205_f200, 0x0205_f300),
            Err(PowError::ConsensusMismatch {
                height: 1_000,
                old_bits: 0x0205_f200,
                new_bits: 0x0205_f300,
            })
        );
    }

    // ============ Legacy ============

    #[test]
    fn test_legacy_between_retargets_requires_equality() {
        let params = ConsensusParams::mainnet();
        assert!(permitted_difficulty_transition(&params, 1_000, 0x0205_f200, 0x0205_f200));
        assert!(!permitted_difficulty_transition(&params, 1_000, 0x0205_f200, 0x0205_f300));
    }

    #[test]
    fn test_legacy_interval_bounds() {
        let params = ConsensusParams::mainnet();
        let old = bits_of(1522);
        for difficulty in [1304, 1522, 1775] {
            assert!(
                permitted_difficulty_transition(&params, 288_000, old, bits_of(difficulty)),
                "{}",
                difficulty
            );
        }
        for difficulty in [1303, 1776] {
            assert!(
                !permitted_difficulty_transition(&params, 288_000, old, bits_of(difficulty)),
                "{}",
                difficulty
            );
        }
        assert!(!permitted_difficulty_transition(&params, 288_000, old, 0x0480_0001));
    }

    #[test]
    fn test_first_interval_only_floors() {
        let params = ConsensusParams::mainnet();
        assert!(permitted_difficulty_transition(&params, 288, bits_of(304), bits_of(5_000)));
        assert!(!permitted_difficulty_transition(&params, 288, bits_of(304), bits_of(303)));
    }

    #[test]
    fn test_superblock_exact() {
        let params = ConsensusParams::mainnet();
        assert!(permitted_difficulty_transition(&params, 160_848, 0x0205_f200, 0x0208_b200));
        assert!(!permitted_difficulty_transition(&params, 160_848, 0x0205_f200, 0x0205_f200));
    }

    #[test]
    fn test_after_superblock_within_one() {
        let params = ConsensusParams::mainnet();
        let superblock = 0x0208_b200;
        // 2226 * 65536 / 95859 = 1521
        for difficulty in [1520, 1521, 1522] {
            assert!(
                permitted_difficulty_transition(&params, 160_849, superblock, bits_of(difficulty)),
                "{}",
                difficulty
            );
        }
        for difficulty in [1519, 1523] {
            assert!(
                !permitted_difficulty_transition(&params, 160_849, superblock, bits_of(difficulty)),
                "{}",
                difficulty
            );
        }
    }
}
