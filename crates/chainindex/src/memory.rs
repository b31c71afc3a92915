//! Hash-keyed in-memory block index with skip pointers.

use std::collections::HashMap;
use std::fmt;

use anchor_consensus::Hash256;

use crate::node::{BlockIndex, BlockIndexNode};

const NULL_HASH: Hash256 = [0u8; 32];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexError {
    MissingParent,
    DuplicateBlock,
    DuplicateGenesis,
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::MissingParent => write!(f, "missing parent block"),
            IndexError::DuplicateBlock => write!(f, "block already indexed"),
            IndexError::DuplicateGenesis => write!(f, "index already has a genesis block"),
        }
    }
}

impl std::error::Error for IndexError {}

#[derive(Clone, Debug)]
struct IndexEntry {
    prev_hash: Hash256,
    skip_hash: Hash256,
    height: i32,
    time: u32,
    tx_count: u32,
    chain_tx: u64,
}

fn invert_lowest_one(value: i32) -> i32 {
    value & value.saturating_sub(1)
}

/// Height the skip pointer of a block at `height` jumps to.
pub fn get_skip_height(height: i32) -> i32 {
    if height < 2 {
        0
    } else if (height & 1) != 0 {
        invert_lowest_one(invert_lowest_one(height - 1)) + 1
    } else {
        invert_lowest_one(height)
    }
}

#[derive(Default)]
pub struct MemoryBlockIndex {
    entries: HashMap<Hash256, IndexEntry>,
    genesis: Option<Hash256>,
}

impl MemoryBlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn genesis(&self) -> Option<BlockIndexNode> {
        self.genesis.and_then(|hash| self.get(&hash))
    }

    pub fn get(&self, hash: &Hash256) -> Option<BlockIndexNode> {
        self.entries.get(hash).map(|entry| BlockIndexNode {
            hash: *hash,
            height: entry.height,
            chain_tx: entry.chain_tx,
            time: entry.time,
        })
    }

    pub fn tx_count(&self, hash: &Hash256) -> Option<u32> {
        self.entries.get(hash).map(|entry| entry.tx_count)
    }

    pub fn prev_hash(&self, hash: &Hash256) -> Option<Hash256> {
        self.entries
            .get(hash)
            .filter(|entry| entry.height > 0)
            .map(|entry| entry.prev_hash)
    }

    /// Indexes a block on top of `prev_hash`; an all-zero `prev_hash` marks
    /// genesis.
    pub fn insert(
        &mut self,
        hash: Hash256,
        prev_hash: Hash256,
        time: u32,
        tx_count: u32,
    ) -> Result<BlockIndexNode, IndexError> {
        if self.entries.contains_key(&hash) {
            return Err(IndexError::DuplicateBlock);
        }

        let entry = if prev_hash == NULL_HASH {
            if self.genesis.is_some() {
                return Err(IndexError::DuplicateGenesis);
            }
            IndexEntry {
                prev_hash,
                skip_hash: NULL_HASH,
                height: 0,
                time,
                tx_count,
                chain_tx: u64::from(tx_count),
            }
        } else {
            let prev = self.get(&prev_hash).ok_or(IndexError::MissingParent)?;
            let height = prev.height + 1;
            let skip_hash = self
                .ancestor(&prev, get_skip_height(height))
                .map(|node| node.hash)
                .unwrap_or(NULL_HASH);
            IndexEntry {
                prev_hash,
                skip_hash,
                height,
                time,
                tx_count,
                chain_tx: prev.chain_tx + u64::from(tx_count),
            }
        };

        if entry.height == 0 {
            self.genesis = Some(hash);
        }
        self.entries.insert(hash, entry);
        self.get(&hash).ok_or(IndexError::MissingParent)
    }
}

impl BlockIndex for MemoryBlockIndex {
    fn lookup(&self, hash: &Hash256) -> Option<BlockIndexNode> {
        self.get(hash)
    }

    fn ancestor(&self, node: &BlockIndexNode, target_height: i32) -> Option<BlockIndexNode> {
        if target_height < 0 || target_height > node.height {
            return None;
        }
        let mut current_hash = node.hash;
        let mut entry = self.entries.get(&current_hash)?;

        while entry.height > target_height {
            let skip_height = get_skip_height(entry.height);
            current_hash = if entry.skip_hash != NULL_HASH && skip_height >= target_height {
                entry.skip_hash
            } else {
                entry.prev_hash
            };
            entry = self.entries.get(&current_hash)?;
        }

        self.get(&current_hash)
    }
}
