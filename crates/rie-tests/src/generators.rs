//! Test data generators.
//!
//! Synthetic chains for the retarget engine and constellation solutions for the
//! proof-of-work validator.

use rie_consensus::{
    constellation_holds, generate_target, offset_layout, primorial, BlockEntry, BlockIndex,
    ChainIndex, ConsensusParams, DifficultyRetarget, PowVersion, PowResult, Uint256,
};

/// `2^303 + QUADRUPLET_DELTA` starts the prime quadruplet `{n, n+2, n+6, n+8}`.
///
/// With a zero digest and difficulty 304 the target is exactly `2^303`.
pub const QUADRUPLET_DELTA: u64 = 0x14a0_c64b;

/// Linear offset fields reaching the same quadruplet: seven primes, multiplier, residual.
pub const QUADRUPLET_LINEAR: (u16, u64, u64) = (7, 677, 405_521);

/// Linear offset fields of a quadruplet at difficulty 600 with a zero digest:
/// ten primes, multiplier, residual.
pub const QUADRUPLET_LINEAR_600: (u16, u64, u64) = (10, 26_843_771, 101);

/// Linear bits for difficulty 600, the mainnet floor.
pub const BITS_600_LINEAR: u32 = 600 << 8;

/// Legacy bits for difficulty 304.
pub const BITS_304_LEGACY: u32 = 0x0201_3000;

/// Linear bits for difficulty 304.
pub const BITS_304_LINEAR: u32 = 304 << 8;

/// Build a structured offset for the linear PoW version.
pub fn linear_offset(primorial_count: u16, multiplier: u64, residual: u64) -> Uint256 {
    let mut bytes = [0u8; 32];
    bytes[offset_layout::TAG].copy_from_slice(&2u16.to_le_bytes());
    bytes[offset_layout::RESIDUAL][..8].copy_from_slice(&residual.to_le_bytes());
    bytes[offset_layout::MULTIPLIER][..8].copy_from_slice(&multiplier.to_le_bytes());
    bytes[offset_layout::PRIMORIAL_COUNT].copy_from_slice(&primorial_count.to_le_bytes());
    Uint256(bytes)
}

/// Search the multiplier field for a linear offset that solves `pattern`.
///
/// Candidates are `target + P - (target mod P) + f * P + residual` with `P` the
/// primorial of `primorial_count` primes; `residual` should keep every member of
/// the pattern coprime to `P`. Returns `None` after `max_tries` multipliers.
pub fn mine_linear_offset(
    hash: &Uint256,
    bits: u32,
    pattern: &[u32],
    primorial_count: u16,
    residual: u64,
    max_tries: u64,
) -> PowResult<Option<Uint256>> {
    let target = generate_target(hash, bits, PowVersion::Linear)?;
    let p = primorial(usize::from(primorial_count)).expect("primorial count within prime table");
    let aligned = &target.value + &p - (&target.value % &p) + residual;

    let mut candidate = aligned;
    for multiplier in 0..max_tries {
        if constellation_holds(&candidate, pattern) {
            return Ok(Some(linear_offset(primorial_count, multiplier, residual)));
        }
        candidate += &p;
    }
    Ok(None)
}

/// A segment of `len` blocks with constant bits at a fixed spacing.
pub fn steady_chain(
    base_height: u32,
    len: usize,
    start_time: i64,
    spacing: i64,
    bits: u32,
) -> ChainIndex {
    let entries = (0..len)
        .map(|i| BlockEntry {
            time: start_time + i as i64 * spacing,
            bits,
        })
        .collect();
    ChainIndex::from_entries(base_height, entries)
}

/// Extend `chain` block by block, each carrying the bits the engine requires and
/// arriving `solve_times[i]` seconds after its parent.
pub fn extend_with_engine(
    chain: &mut ChainIndex,
    params: &ConsensusParams,
    solve_times: &[i64],
) -> PowResult<Vec<u32>> {
    let engine = DifficultyRetarget::new(params);
    let mut produced = Vec::with_capacity(solve_times.len());
    for &solve_time in solve_times {
        let (time, bits) = {
            let tip = chain
                .tip()
                .expect("extend_with_engine needs a non-empty chain");
            let time = tip.time() + solve_time;
            (time, engine.next_work_required(&tip, time)?)
        };
        chain.push(time, bits);
        produced.push(bits);
    }
    Ok(produced)
}

/// Relative change between two linear bit values.
pub fn relative_change(old_bits: u32, new_bits: u32) -> f64 {
    (f64::from(new_bits) - f64::from(old_bits)) / f64::from(old_bits)
}
