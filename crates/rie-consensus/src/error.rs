//! Error types for proof-of-work validation and difficulty computation.

use thiserror::Error;

/// Reasons a proof of work, difficulty encoding or difficulty transition is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PowError {
    /// A compact difficulty or offset failed structural sanity bounds.
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// The difficulty is too low to embed the mandatory 265 significant bits.
    #[error("Difficulty {difficulty} below the {required} significant bits required")]
    InsufficientSignificantDigits { difficulty: u64, required: u32 },

    /// The offset's low bits select neither the legacy nor the versioned PoW.
    #[error("Unknown PoW version tag in offset (low bits {low_bits:#06x})")]
    UnknownPowVersion { low_bits: u16 },

    /// The decoded offset does not fit the bit budget implied by the difficulty.
    #[error("Offset out of range: must be below 2^{bits_allowed}")]
    OffsetOutOfRange { bits_allowed: u32 },

    /// The primorial selected by the offset exceeds the allowed search window.
    #[error("Primorial of the first {count} primes exceeds 2^{bits_allowed}")]
    PrimorialTooLarge { count: u16, bits_allowed: u32 },

    /// No accepted constellation pattern holds at the candidate.
    #[error("Candidate does not satisfy any accepted constellation pattern")]
    PatternMismatch,

    /// A claimed next difficulty lies outside the permitted bound.
    #[error("Difficulty transition at height {height} not permitted: {old_bits:#010x} -> {new_bits:#010x}")]
    ConsensusMismatch {
        height: u32,
        old_bits: u32,
        new_bits: u32,
    },

    /// The block index could not supply an ancestor it is required to have.
    #[error("Ancestor at height {height} not found")]
    MissingAncestor { height: u32 },
}

/// Result type for proof-of-work operations.
pub type PowResult<T> = Result<T, PowError>;
