use anchor_chainindex::{BlockIndex, BlockIndexNode};
use anchor_consensus::CheckpointData;
use anchor_log::log_trace;

/// Highest configured checkpoint height, or 0 when the table is empty.
pub fn total_blocks_estimate(data: &CheckpointData) -> i32 {
    data.last().map(|checkpoint| checkpoint.height).unwrap_or(0)
}

/// The highest configured checkpoint the index already knows about.
///
/// Scans from the top so the most recent anchor wins and the scan stops at the
/// first hit. Early in header sync this is `None`.
pub fn last_checkpoint<I: BlockIndex + ?Sized>(
    data: &CheckpointData,
    index: &I,
) -> Option<BlockIndexNode> {
    let found = data
        .iter_rev()
        .find_map(|checkpoint| index.lookup(&checkpoint.hash));
    if found.is_none() {
        log_trace!("none of {} checkpoints indexed yet", data.len());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_chainindex::MemoryBlockIndex;
    use anchor_consensus::{chain_params, Checkpoint, Network};

    #[test]
    fn estimate_is_last_height() {
        assert_eq!(
            total_blocks_estimate(&chain_params(Network::Mainnet).checkpoints),
            2_029_000
        );
        assert_eq!(
            total_blocks_estimate(&chain_params(Network::Testnet).checkpoints),
            320
        );
        assert_eq!(
            total_blocks_estimate(&chain_params(Network::Regtest).checkpoints),
            0
        );
    }

    #[test]
    fn estimate_of_empty_table_is_zero() {
        let data = CheckpointData::new(Vec::new(), 0, 0, 0.0).expect("data");
        assert_eq!(total_blocks_estimate(&data), 0);
    }

    #[test]
    fn resolves_genesis_checkpoint() {
        let params = chain_params(Network::Regtest);
        let mut index = MemoryBlockIndex::new();
        assert_eq!(last_checkpoint(&params.checkpoints, &index), None);

        index
            .insert(params.hash_genesis_block, [0u8; 32], params.genesis_time, 1)
            .expect("genesis");
        let found = last_checkpoint(&params.checkpoints, &index).expect("checkpoint");
        assert_eq!(found.hash, params.hash_genesis_block);
        assert_eq!(found.height, 0);
    }

    #[test]
    fn empty_table_never_resolves() {
        let mut index = MemoryBlockIndex::new();
        index.insert([7u8; 32], [0u8; 32], 0, 1).expect("genesis");
        let data = CheckpointData::new(Vec::new(), 0, 0, 0.0).expect("data");
        assert_eq!(last_checkpoint(&data, &index), None);

        let data = CheckpointData::new(
            vec![Checkpoint {
                height: 0,
                hash: [8u8; 32],
            }],
            0,
            0,
            0.0,
        )
        .expect("data");
        assert_eq!(last_checkpoint(&data, &index), None);
    }
}
