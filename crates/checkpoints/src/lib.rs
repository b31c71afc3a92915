//! Checkpoint trust anchoring: which blocks may skip signature checks, and how
//! far initial verification has progressed.
//!
//! Every function here is a total, read-only query over compiled
//! [`CheckpointData`] and a borrowed [`BlockIndex`]. When trust cannot be
//! established the answers fall back to the slow, safe path: no checkpoint,
//! no ancestry, zero progress.

pub mod ancestry;
pub mod progress;
pub mod resolver;

pub use anchor_chainindex::{BlockIndex, BlockIndexNode};
pub use anchor_consensus::CheckpointData;

pub use ancestry::is_ancestor_of_last_checkpoint;
pub use progress::{
    guess_verification_progress, Clock, FixedClock, SystemClock, SIGCHECK_VERIFICATION_FACTOR,
};
pub use resolver::{last_checkpoint, total_blocks_estimate};
