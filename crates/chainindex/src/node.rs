use anchor_consensus::Hash256;

/// Read-only view of one indexed block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockIndexNode {
    pub hash: Hash256,
    pub height: i32,
    /// Transactions from genesis up to and including this block.
    pub chain_tx: u64,
    pub time: u32,
}

impl BlockIndexNode {
    pub fn block_time(&self) -> i64 {
        i64::from(self.time)
    }
}

/// Hash lookup plus ancestor-at-height queries over indexed blocks.
///
/// Implementations are not required to be internally synchronized; callers
/// hold a shared borrow for the whole query, which is the snapshot the answer
/// refers to.
pub trait BlockIndex {
    fn lookup(&self, hash: &Hash256) -> Option<BlockIndexNode>;

    /// The unique block at `height` on the chain `node` terminates.
    ///
    /// Returns `None` when `height` is negative or above `node.height`, or when
    /// the walk hits a block the index no longer holds.
    fn ancestor(&self, node: &BlockIndexNode, height: i32) -> Option<BlockIndexNode>;

    fn contains(&self, hash: &Hash256) -> bool {
        self.lookup(hash).is_some()
    }
}

impl<T: BlockIndex + ?Sized> BlockIndex for &T {
    fn lookup(&self, hash: &Hash256) -> Option<BlockIndexNode> {
        (**self).lookup(hash)
    }

    fn ancestor(&self, node: &BlockIndexNode, height: i32) -> Option<BlockIndexNode> {
        (**self).ancestor(node, height)
    }
}
