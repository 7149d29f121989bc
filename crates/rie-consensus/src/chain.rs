//! Block index contract consumed by the retarget engine.
//!
//! The engine only reads height, time, bits and ancestors. [`ChainIndex`] is a
//! plain in-memory chain implementing the contract for tests and tooling.

use serde::{Deserialize, Serialize};

/// Read-only view of a block in the active chain.
///
/// Implementations are handles: cloning one must be cheap and must not copy the chain.
pub trait BlockIndex: Clone {
    fn height(&self) -> u32;
    fn time(&self) -> i64;
    fn bits(&self) -> u32;
    fn parent(&self) -> Option<Self>;

    /// Ancestor at `height` (the block itself when `height` is its own), walking
    /// parents by default.
    fn ancestor(&self, height: u32) -> Option<Self> {
        if height > self.height() {
            return None;
        }
        let mut cursor = self.clone();
        while cursor.height() > height {
            cursor = cursor.parent()?;
        }
        Some(cursor)
    }
}

/// Timestamp and bits of one stored block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub time: i64,
    pub bits: u32,
}

/// An in-memory run of consecutive blocks.
///
/// Entry `i` is the block at height `base_height + i`. Blocks below the base are
/// unknown, so a segment loaded from the middle of a chain reports them as missing.
#[derive(Debug, Clone, Default)]
pub struct ChainIndex {
    base_height: u32,
    entries: Vec<BlockEntry>,
}

impl ChainIndex {
    /// An empty chain starting at genesis.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty segment whose first block will sit at `base_height`.
    pub fn with_base_height(base_height: u32) -> Self {
        Self {
            base_height,
            entries: Vec::new(),
        }
    }

    pub fn from_entries(base_height: u32, entries: Vec<BlockEntry>) -> Self {
        Self {
            base_height,
            entries,
        }
    }

    /// Append a block and return its height.
    pub fn push(&mut self, time: i64, bits: u32) -> u32 {
        self.entries.push(BlockEntry { time, bits });
        self.base_height + (self.entries.len() - 1) as u32
    }

    pub fn base_height(&self) -> u32 {
        self.base_height
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn at(&self, height: u32) -> Option<ChainCursor<'_>> {
        let index = height.checked_sub(self.base_height)? as usize;
        (index < self.entries.len()).then_some(ChainCursor {
            chain: self,
            index,
        })
    }

    pub fn tip(&self) -> Option<ChainCursor<'_>> {
        let last = self.entries.len().checked_sub(1)?;
        Some(ChainCursor {
            chain: self,
            index: last,
        })
    }
}

/// Handle to one block of a [`ChainIndex`].
#[derive(Debug, Clone, Copy)]
pub struct ChainCursor<'a> {
    chain: &'a ChainIndex,
    index: usize,
}

impl ChainCursor<'_> {
    fn entry(&self) -> &BlockEntry {
        &self.chain.entries[self.index]
    }
}

impl BlockIndex for ChainCursor<'_> {
    fn height(&self) -> u32 {
        self.chain.base_height + self.index as u32
    }

    fn time(&self) -> i64 {
        self.entry().time
    }

    fn bits(&self) -> u32 {
        self.entry().bits
    }

    fn parent(&self) -> Option<Self> {
        let index = self.index.checked_sub(1)?;
        Some(ChainCursor {
            chain: self.chain,
            index,
        })
    }

    fn ancestor(&self, height: u32) -> Option<Self> {
        if height > self.height() {
            return None;
        }
        self.chain.at(height)
    }
}
