//! # rie-consensus
//!
//! Proof-of-work consensus rules for a prime-constellation blockchain.
//!
//! This crate provides:
//! - A deterministic BPSW primality oracle
//! - Target construction from a header digest and compact difficulty
//! - Constellation proof-of-work validation
//! - The difficulty retarget engine (legacy power-law and per-block ASERT)
//! - Difficulty transition validation
//! - Per-network consensus parameters
//!
//! ## Proof of work
//!
//! A block solves the puzzle when `target + offset` is the first member of an
//! accepted prime constellation, e.g. a septuplet `{0, 2, 6, 8, 12, 18, 20}`.
//! The target is built from the header digest and has exactly `difficulty`
//! significant bits, so the difficulty is the size of the primes being searched.
//!
//! ## Difficulty adjustment
//!
//! Until fork2 the difficulty is retargeted every 288 blocks (mainnet, 12 hours at
//! 150 s per block). From fork2 on it moves every block by an exponential rule
//! with a 64-block smoothing window.
//!
//! Nothing here holds global state: every call takes the [`ConsensusParams`] it
//! should apply, so several networks can be validated side by side.

mod bignum;
mod chain;
mod chain_params;
mod compact;
mod difficulty;
mod error;
mod header;
mod pow;
mod primality;
mod primes;
mod target;
mod transition;

pub use bignum::{integer_root, jacobi, Uint256};
pub use chain::{BlockEntry, BlockIndex, ChainCursor, ChainIndex};
pub use chain_params::{
    ChainParamsError, ConsensusParams, ConsensusParamsConfig, Network, MAINNET_GENESIS_POW_HASH,
    REGTEST_GENESIS_POW_HASH, TESTNET_GENESIS_POW_HASH,
};
pub use compact::{
    decode_compact, difficulty_from_bits, encode_compact, fractional_length, legacy_difficulty,
    DecodedCompact,
};
pub use difficulty::{
    calculate_next_work_required, get_next_work_required, superblock_difficulty,
    DifficultyRetarget,
};
pub use error::{PowError, PowResult};
pub use header::{sha256d, BlockHeader};
pub use pow::{
    check_proof_of_work, constellation_holds, offset_layout, verify_proof_of_work,
    ConstellationVerifier,
};
pub use primality::{is_probable_prime, next_prime, passes_quick_check};
pub use primes::{prime_table, primorial};
pub use target::{generate_target, PowVersion, Target};
pub use transition::{check_difficulty_transition, permitted_difficulty_transition};

/// Protocol constants shared by every network.
pub mod params {
    /// Leading one + 8-bit length field + 256 digest bits.
    pub const MIN_SIGNIFICANT_BITS: u32 = 265;

    /// Low 16 bits of an offset selecting the linear PoW version.
    pub const POW_VERSION_TAG: u16 = 2;

    /// Largest |D| tried when searching Selfridge parameters.
    pub const LUCAS_D_SEARCH_LIMIT: u64 = 1_000_000;

    /// Retarget intervals per superblock cycle (one week on mainnet).
    pub const SUPERBLOCK_CYCLE: u32 = 14;

    /// Position of the superblock interval within its cycle.
    pub const SUPERBLOCK_INTERVAL_POSITION: u32 = 12;

    /// Position of the superblock within its interval.
    pub const SUPERBLOCK_HEIGHT_OFFSET: u32 = 144;

    /// Superblock difficulty is `difficulty * 95859 >> 16`.
    ///
    /// Approximates `(4168/136)^(1/9)` for sextuplets only. Kept as is for
    /// compatibility with the historical chain.
    pub const SUPERBLOCK_DIFFICULTY_NUMERATOR: u32 = 95_859;
    pub const SUPERBLOCK_DIFFICULTY_SHIFT: u32 = 16;

    /// Linearized retarget correction entering (`68/75`) and leaving (`75/68`)
    /// a superblock interval.
    pub const SUPERBLOCK_RETARGET_NUMERATOR: u32 = 68;
    pub const SUPERBLOCK_RETARGET_DENOMINATOR: u32 = 75;

    /// Legacy retarget exponent is this plus the tuple length.
    pub const RETARGET_EXPONENT_BASE: u32 = 3;

    /// Fixed-point unit of the per-block retarget.
    pub const ASERT_UNIT: i128 = 65_536;

    /// Smoothing window in blocks.
    pub const ASERT_WINDOW: i128 = 64;

    /// Numerator of the per-block gain.
    pub const ASERT_GAIN: i128 = 10;

    /// Damping is `10 * tuple length + 23`.
    pub const ASERT_PATTERN_WEIGHT: i128 = 10;
    pub const ASERT_PATTERN_BIAS: i128 = 23;

    /// Solve times are capped at this many spacings.
    pub const MAX_SOLVE_TIME_FACTOR: i64 = 12;

    /// Test networks drop to minimum difficulty after this many spacings without a block.
    pub const MIN_DIFFICULTY_GAP_FACTOR: i64 = 4;

    /// First fork2 block: linear bits are legacy difficulty times this (171/256 scaling).
    pub const FORK2_TRANSITION_FACTOR: u64 = 171;
}
