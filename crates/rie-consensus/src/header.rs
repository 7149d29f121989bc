//! Block header fields consumed by the proof-of-work rules.

use sha2::{Digest, Sha256};

use crate::bignum::Uint256;
use crate::target::PowVersion;
use crate::PowResult;

/// Size of the serialized PoW preimage.
pub const POW_PREIMAGE_SIZE: usize = 80;

/// The header fields that take part in proof-of-work validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: Uint256,
    pub merkle_root: Uint256,
    pub time: u64,
    pub bits: u32,
    /// Constellation offset; its low bits select the PoW version.
    pub nonce: Uint256,
}

impl BlockHeader {
    /// PoW version selected by the offset.
    pub fn pow_version(&self) -> PowResult<PowVersion> {
        PowVersion::from_offset(&self.nonce)
    }

    /// Headers with a legacy offset, or an all-zero low tag such as genesis, hash
    /// `bits` before `time`.
    pub fn uses_legacy_layout(&self) -> bool {
        let low = self.nonce.low_u16();
        low & 1 == 1 || low == 0
    }

    /// Bytes hashed to produce the PoW digest. The offset is not included.
    pub fn pow_preimage(&self) -> [u8; POW_PREIMAGE_SIZE] {
        let mut buf = [0u8; POW_PREIMAGE_SIZE];
        buf[0..4].copy_from_slice(&self.version.to_le_bytes());
        buf[4..36].copy_from_slice(self.prev_block.as_bytes());
        buf[36..68].copy_from_slice(self.merkle_root.as_bytes());
        if self.uses_legacy_layout() {
            buf[68..72].copy_from_slice(&self.bits.to_le_bytes());
            buf[72..80].copy_from_slice(&self.time.to_le_bytes());
        } else {
            buf[68..76].copy_from_slice(&self.time.to_le_bytes());
            buf[76..80].copy_from_slice(&self.bits.to_le_bytes());
        }
        buf
    }

    /// Double SHA-256 of the PoW preimage.
    pub fn pow_hash(&self) -> Uint256 {
        sha256d(&self.pow_preimage())
    }

    /// Timestamp as a signed value for timespan arithmetic.
    pub fn time_i64(&self) -> i64 {
        i64::try_from(self.time).unwrap_or(i64::MAX)
    }
}

/// SHA-256 applied twice.
pub fn sha256d(data: &[u8]) -> Uint256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&second);
    Uint256(bytes)
}
