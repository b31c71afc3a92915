//! Whether a block's signatures must be verified.

use std::sync::atomic::{AtomicBool, Ordering};

use anchor_chainindex::{BlockIndex, BlockIndexNode};
use anchor_checkpoints::is_ancestor_of_last_checkpoint;
use anchor_consensus::CheckpointData;
use anchor_log::log_debug;

/// Set while blocks are being read from a bulk import file.
#[derive(Debug, Default)]
pub struct ImportFlag(AtomicBool);

impl ImportFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self, importing: bool) {
        self.0.store(importing, Ordering::Release);
    }

    pub fn is_importing(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Marks an import in progress until the guard is dropped.
    pub fn begin(&self) -> ImportGuard<'_> {
        self.set(true);
        ImportGuard { flag: self }
    }
}

pub struct ImportGuard<'a> {
    flag: &'a ImportFlag,
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SigcheckPolicy {
    /// Node-level switch (`-fastsync`) permitting the checkpoint shortcut at all.
    pub skip_below_checkpoint: bool,
}

impl SigcheckPolicy {
    pub fn signature_checks_required<I: BlockIndex + ?Sized>(
        &self,
        data: &CheckpointData,
        importing: bool,
        index: &I,
        block: &BlockIndexNode,
    ) -> bool {
        if !self.skip_below_checkpoint {
            return true;
        }
        let trusted = is_ancestor_of_last_checkpoint(data, importing, index, block);
        log_debug!(
            "block {} at height {}: signature checks {}",
            anchor_consensus::hash256_to_hex(&block.hash),
            block.height,
            if trusted { "skipped" } else { "required" }
        );
        !trusted
    }
}
