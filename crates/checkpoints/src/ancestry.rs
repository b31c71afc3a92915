use anchor_chainindex::{BlockIndex, BlockIndexNode};
use anchor_consensus::CheckpointData;
use anchor_log::{log_debug, log_trace};

use crate::resolver::last_checkpoint;

/// Whether `candidate` sits on the chain leading to the last indexed
/// checkpoint, which makes it eligible to skip signature checks.
///
/// During bulk import headers are not fetched ahead of the block being
/// imported, so the index may only hold an older checkpoint and a block below
/// the newest one would never pass the ancestry walk. In that mode any block at
/// or below the highest *configured* checkpoint height is trusted without
/// consulting the index at all.
pub fn is_ancestor_of_last_checkpoint<I: BlockIndex + ?Sized>(
    data: &CheckpointData,
    importing: bool,
    index: &I,
    candidate: &BlockIndexNode,
) -> bool {
    if importing {
        let Some(last) = data.last() else {
            return false;
        };
        let trusted = candidate.height <= last.height;
        log_trace!(
            "import mode: height {} vs configured checkpoint {} -> {}",
            candidate.height,
            last.height,
            trusted
        );
        return trusted;
    }

    let Some(checkpoint) = last_checkpoint(data, index) else {
        return false;
    };
    if candidate.height > checkpoint.height {
        return false;
    }
    match index.ancestor(&checkpoint, candidate.height) {
        Some(ancestor) => ancestor.hash == candidate.hash,
        None => {
            log_debug!(
                "ancestor of checkpoint {} at height {} unavailable",
                checkpoint.height,
                candidate.height
            );
            false
        }
    }
}
