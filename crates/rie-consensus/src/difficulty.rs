//! Difficulty retarget engine.
//!
//! Two regimes, chosen by the height of the block being built:
//!
//! - **Before fork2**: legacy compact bits, retargeted once per interval
//!   (`target_timespan / target_spacing` blocks) by a power-law rule. The
//!   difficulty is raised to `3 + tuple length`, scaled by target/actual
//!   timespan and rooted back. Between fork1 and fork2 a weekly superblock
//!   carries a raised difficulty and the surrounding retargets compensate for it.
//! - **From fork2**: linear bits, adjusted every block by an ASERT-style
//!   exponential rule with fixed-point unit 65536.
//!
//! All functions are pure: the same chain and parameters always give the same bits.

use num_bigint::BigUint;
use tracing::{debug, instrument, trace};

use crate::bignum::integer_root;
use crate::chain::BlockIndex;
use crate::chain_params::ConsensusParams;
use crate::compact::{encode_compact, legacy_difficulty, legacy_difficulty_u64};
use crate::header::BlockHeader;
use crate::params::{
    ASERT_GAIN, ASERT_PATTERN_BIAS, ASERT_PATTERN_WEIGHT, ASERT_UNIT, ASERT_WINDOW,
    FORK2_TRANSITION_FACTOR, MAX_SOLVE_TIME_FACTOR, MIN_DIFFICULTY_GAP_FACTOR,
    RETARGET_EXPONENT_BASE, SUPERBLOCK_DIFFICULTY_NUMERATOR, SUPERBLOCK_DIFFICULTY_SHIFT,
    SUPERBLOCK_RETARGET_DENOMINATOR, SUPERBLOCK_RETARGET_NUMERATOR,
};
use crate::{PowError, PowResult};

/// Computes the bits the next block must carry.
pub struct DifficultyRetarget<'a> {
    params: &'a ConsensusParams,
}

impl<'a> DifficultyRetarget<'a> {
    pub fn new(params: &'a ConsensusParams) -> Self {
        Self { params }
    }

    /// Required bits for the block after `tip`, whose timestamp is `candidate_time`.
    #[instrument(skip(self, tip), fields(tip_height = tip.height()))]
    pub fn next_work_required<B: BlockIndex>(
        &self,
        tip: &B,
        candidate_time: i64,
    ) -> PowResult<u32> {
        let next_height = tip.height() + 1;

        if self.params.is_fork2_active(next_height) {
            return self.per_block_bits(tip, next_height);
        }

        let interval = self.params.difficulty_adjustment_interval();
        if next_height % interval != 0 {
            return self.between_retargets(tip, next_height, candidate_time);
        }

        // Go back by one interval minus one block; genesis has no meaningful time.
        let first_height = (tip.height() + 1 - interval).max(1);
        let first = tip
            .ancestor(first_height)
            .ok_or(PowError::MissingAncestor {
                height: first_height,
            })?;
        self.calculate_next_work_required(tip, first.time())
    }

    /// Legacy retarget at an interval boundary, given the time of the first block
    /// of the closing interval.
    pub fn calculate_next_work_required<B: BlockIndex>(
        &self,
        tip: &B,
        first_block_time: i64,
    ) -> PowResult<u32> {
        if self.params.no_retargeting {
            return Ok(tip.bits());
        }
        let next_height = tip.height() + 1;
        let interval = self.params.difficulty_adjustment_interval();
        let timespan = self.params.target_timespan;

        let mut actual_timespan = tip.time() - first_block_time;
        if next_height >= 2 * interval {
            actual_timespan = actual_timespan.clamp(timespan / 4, timespan * 4);
        }
        let actual_timespan = actual_timespan.max(1);

        let old_difficulty = legacy_difficulty(tip.bits())?;
        let new_difficulty = self
            .retarget_legacy(&old_difficulty, actual_timespan, next_height)
            .max(BigUint::from(self.params.pow_limit_legacy));
        let bits = encode_compact(&new_difficulty);

        debug!(
            height = next_height,
            actual_timespan,
            old_difficulty = %old_difficulty,
            new_difficulty = %new_difficulty,
            "Legacy retarget"
        );
        Ok(bits)
    }

    /// Power-law retarget of a legacy difficulty over `actual_timespan` seconds,
    /// including the superblock interval corrections for `next_height`.
    pub fn retarget_legacy(
        &self,
        old_difficulty: &BigUint,
        actual_timespan: i64,
        next_height: u32,
    ) -> BigUint {
        let exponent = RETARGET_EXPONENT_BASE + self.params.legacy_tuple_length();
        let actual = actual_timespan.max(1).unsigned_abs();
        let mut linearized =
            old_difficulty.pow(exponent) * self.params.target_timespan.unsigned_abs() / actual;

        if self.params.superblocks_active(next_height) {
            if self.params.is_in_superblock_interval(next_height) {
                trace!(height = next_height, "Entering superblock interval");
                linearized = linearized * SUPERBLOCK_RETARGET_NUMERATOR
                    / SUPERBLOCK_RETARGET_DENOMINATOR;
            } else if self
                .params
                .is_in_superblock_interval(next_height.saturating_sub(1))
            {
                trace!(height = next_height, "Leaving superblock interval");
                linearized = linearized * SUPERBLOCK_RETARGET_DENOMINATOR
                    / SUPERBLOCK_RETARGET_NUMERATOR;
            }
        }
        integer_root(&linearized, exponent)
    }

    /// ASERT-style per-block adjustment of linear bits after a block solved in
    /// `solve_time` seconds. Solve times beyond twelve spacings count as twelve.
    pub fn asert_next_bits(&self, bits: u32, solve_time: i64) -> u32 {
        let spacing = self.params.target_spacing;
        let solve_time = i128::from(solve_time.min(MAX_SOLVE_TIME_FACTOR * spacing));
        let spacing = i128::from(spacing);
        let damping = ASERT_PATTERN_WEIGHT * i128::from(self.params.tuple_length())
            + ASERT_PATTERN_BIAS;

        let factor = ASERT_UNIT
            + ASERT_UNIT * ASERT_GAIN * (spacing - solve_time) / (ASERT_WINDOW * damping * spacing);
        let next = i128::from(bits) * factor / ASERT_UNIT;
        next.clamp(i128::from(self.params.n_bits_min), i128::from(u32::MAX)) as u32
    }

    /// Linear bits of the first fork2 block: the legacy difficulty scaled by 171/256.
    pub fn fork2_transition_bits(&self, old_bits: u32) -> PowResult<u32> {
        let difficulty = legacy_difficulty_u64(old_bits)?;
        let bits = difficulty
            .saturating_mul(FORK2_TRANSITION_FACTOR)
            .max(u64::from(self.params.n_bits_min))
            .min(u64::from(u32::MAX));
        Ok(bits as u32)
    }

    fn per_block_bits<B: BlockIndex>(&self, tip: &B, next_height: u32) -> PowResult<u32> {
        if self.params.no_retargeting {
            return Ok(tip.bits());
        }
        if next_height == self.params.fork2_height {
            let bits = self.fork2_transition_bits(tip.bits())?;
            debug!(height = next_height, bits, "Fork2 transition difficulty");
            return Ok(bits);
        }
        let parent = match tip.parent() {
            Some(parent) => parent,
            None => return Ok(tip.bits()),
        };
        let solve_time = tip.time() - parent.time();
        let bits = self.asert_next_bits(tip.bits(), solve_time);
        trace!(height = next_height, solve_time, bits, "Per-block retarget");
        Ok(bits)
    }

    fn between_retargets<B: BlockIndex>(
        &self,
        tip: &B,
        next_height: u32,
        candidate_time: i64,
    ) -> PowResult<u32> {
        if self.params.superblocks_active(next_height) {
            if self.params.is_superblock(next_height) {
                let difficulty = superblock_difficulty(&legacy_difficulty(tip.bits())?);
                debug!(height = next_height, difficulty = %difficulty, "Superblock difficulty");
                return Ok(encode_compact(&difficulty));
            }
            if self.params.is_superblock(tip.height()) {
                let parent = tip.parent().ok_or(PowError::MissingAncestor {
                    height: tip.height().saturating_sub(1),
                })?;
                return Ok(parent.bits());
            }
        }

        if self.params.allow_min_difficulty_blocks {
            let limit_bits = self.params.pow_limit_legacy_bits();
            if candidate_time > tip.time() + MIN_DIFFICULTY_GAP_FACTOR * self.params.target_spacing
            {
                return Ok(limit_bits);
            }
            // Last block that was not a minimum-difficulty exception.
            let interval = self.params.difficulty_adjustment_interval();
            let mut cursor = tip.clone();
            while cursor.height() % interval != 0 && cursor.bits() == limit_bits {
                match cursor.parent() {
                    Some(parent) => cursor = parent,
                    None => break,
                }
            }
            return Ok(cursor.bits());
        }

        Ok(tip.bits())
    }
}

/// Superblock difficulty: `difficulty * 95859 / 65536`, rounded down.
pub fn superblock_difficulty(difficulty: &BigUint) -> BigUint {
    (difficulty * SUPERBLOCK_DIFFICULTY_NUMERATOR) >> SUPERBLOCK_DIFFICULTY_SHIFT
}

/// Required bits for `candidate`, the block to be built on `tip`.
pub fn get_next_work_required<B: BlockIndex>(
    tip: &B,
    candidate: &BlockHeader,
    params: &ConsensusParams,
) -> PowResult<u32> {
    DifficultyRetarget::new(params).next_work_required(tip, candidate.time_i64())
}

/// Legacy interval retarget from `tip` and the first block time of its interval.
pub fn calculate_next_work_required<B: BlockIndex>(
    tip: &B,
    first_block_time: i64,
    params: &ConsensusParams,
) -> PowResult<u32> {
    DifficultyRetarget::new(params).calculate_next_work_required(tip, first_block_time)
}
