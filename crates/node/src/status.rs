//! Checkpoint section of the node's sync status.

use serde::Serialize;

use anchor_chainindex::{BlockIndex, BlockIndexNode};
use anchor_checkpoints::{
    guess_verification_progress, last_checkpoint, total_blocks_estimate, Clock,
};
use anchor_consensus::{hash256_to_hex, ChainParams};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckpointStatus {
    pub network: &'static str,
    pub checkpoints: usize,
    pub total_blocks_estimate: i32,
    pub last_checkpoint_height: Option<i32>,
    pub last_checkpoint_hash: Option<String>,
    /// Highest checkpoint the local index already holds.
    pub last_known_checkpoint_height: Option<i32>,
    pub verification_progress: f64,
}

impl CheckpointStatus {
    pub fn collect<I, C>(
        params: &ChainParams,
        index: &I,
        tip: Option<&BlockIndexNode>,
        sigchecks: bool,
        clock: &C,
    ) -> Self
    where
        I: BlockIndex + ?Sized,
        C: Clock + ?Sized,
    {
        let data = &params.checkpoints;
        Self {
            network: params.network.as_str(),
            checkpoints: data.len(),
            total_blocks_estimate: total_blocks_estimate(data),
            last_checkpoint_height: data.last().map(|checkpoint| checkpoint.height),
            last_checkpoint_hash: data.last().map(|checkpoint| hash256_to_hex(&checkpoint.hash)),
            last_known_checkpoint_height: last_checkpoint(data, index).map(|node| node.height),
            verification_progress: guess_verification_progress(data, tip, sigchecks, clock),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn render_text(&self) -> String {
        let mut lines = vec![
            format!("network: {}", self.network),
            format!("checkpoints: {}", self.checkpoints),
            format!("total blocks estimate: {}", self.total_blocks_estimate),
        ];
        match (&self.last_checkpoint_height, &self.last_checkpoint_hash) {
            (Some(height), Some(hash)) => {
                lines.push(format!("last checkpoint: {height} {hash}"));
            }
            _ => lines.push("last checkpoint: none".to_string()),
        }
        match self.last_known_checkpoint_height {
            Some(height) => lines.push(format!("last indexed checkpoint: {height}")),
            None => lines.push("last indexed checkpoint: none".to_string()),
        }
        lines.push(format!(
            "verification progress: {:.6}",
            self.verification_progress
        ));
        lines.join("\n")
    }
}
