//! Verification progress estimate.
//!
//! Work is counted in transactions. Transactions up to the last checkpoint
//! cost 1.0 each; transactions after it cost [`SIGCHECK_VERIFICATION_FACTOR`]
//! when signatures are checked. Work still ahead is projected from the
//! configured transactions-per-day rate.

use std::time::{SystemTime, UNIX_EPOCH};

use anchor_chainindex::BlockIndexNode;
use anchor_consensus::CheckpointData;

/// How many times slower checking transactions after the last checkpoint is
/// expected to be. Reindexing from a fast disk with a slow CPU can approach 20;
/// downloading over a slow link on a fast multicore machine stays near 1.
pub const SIGCHECK_VERIFICATION_FACTOR: f64 = 5.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

pub trait Clock {
    fn now_secs(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_secs(&self) -> i64 {
        self.0
    }
}

/// Fraction of total verification work done once `tip` is connected, in `[0, 1]`.
///
/// A clock behind the anchor time projects no remaining work rather than
/// negative work. When nothing has been done and nothing is left the answer is
/// 1.0.
pub fn guess_verification_progress<C: Clock + ?Sized>(
    data: &CheckpointData,
    tip: Option<&BlockIndexNode>,
    sigchecks: bool,
    clock: &C,
) -> f64 {
    let Some(tip) = tip else {
        return 0.0;
    };

    let now = clock.now_secs();
    let factor = if sigchecks {
        SIGCHECK_VERIFICATION_FACTOR
    } else {
        1.0
    };
    let checkpoint_tx = data.transactions_last_checkpoint;

    let (work_before, work_after) = if tip.chain_tx <= checkpoint_tx {
        let cheap_before = tip.chain_tx as f64;
        let cheap_after = (checkpoint_tx - tip.chain_tx) as f64;
        let expensive_after =
            days_since(data.time_last_checkpoint, now) * data.transactions_per_day;
        (cheap_before, cheap_after + expensive_after * factor)
    } else {
        let cheap_before = checkpoint_tx as f64;
        let expensive_before = (tip.chain_tx - checkpoint_tx) as f64;
        let expensive_after = days_since(tip.block_time(), now) * data.transactions_per_day;
        (
            cheap_before + expensive_before * factor,
            expensive_after * factor,
        )
    };

    let total = work_before + work_after;
    if total.is_nan() || total <= 0.0 {
        return 1.0;
    }
    (work_before / total).clamp(0.0, 1.0)
}

fn days_since(anchor: i64, now: i64) -> f64 {
    (now.saturating_sub(anchor)).max(0) as f64 / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> CheckpointData {
        CheckpointData::new(Vec::new(), 1_000_000, 1_000, 500.0).expect("data")
    }

    fn tip(chain_tx: u64, time: u32) -> BlockIndexNode {
        BlockIndexNode {
            hash: [3u8; 32],
            height: 1,
            chain_tx,
            time,
        }
    }

    #[test]
    fn no_tip_is_zero() {
        assert_eq!(
            guess_verification_progress(&data(), None, true, &FixedClock(0)),
            0.0
        );
        assert_eq!(
            guess_verification_progress(&data(), None, false, &SystemClock),
            0.0
        );
    }

    #[test]
    fn sigchecks_weight_projected_work() {
        let clock = FixedClock(1_000_000 + 86_400);
        let with = guess_verification_progress(&data(), Some(&tip(500, 0)), true, &clock);
        let without = guess_verification_progress(&data(), Some(&tip(500, 0)), false, &clock);
        // 500 / (500 + 500 + 500 * 5) and 500 / (500 + 500 + 500)
        assert!((with - 500.0 / 3_500.0).abs() < 1e-12);
        assert!((without - 500.0 / 1_500.0).abs() < 1e-12);
    }

    #[test]
    fn past_checkpoint_projects_from_tip_time() {
        let tip_time = 2_000_000u32;
        let clock = FixedClock(i64::from(tip_time) + 86_400);
        let progress =
            guess_verification_progress(&data(), Some(&tip(1_100, tip_time)), true, &clock);
        // before = 1000 + 100 * 5, after = 500 * 5
        assert!((progress - 1_500.0 / 4_000.0).abs() < 1e-12);
    }

    #[test]
    fn clock_behind_anchor_projects_nothing() {
        let progress =
            guess_verification_progress(&data(), Some(&tip(1_000, 0)), true, &FixedClock(0));
        assert_eq!(progress, 1.0);

        let progress = guess_verification_progress(
            &data(),
            Some(&tip(2_000, 5_000_000)),
            true,
            &FixedClock(0),
        );
        assert_eq!(progress, 1.0);
    }

    #[test]
    fn zero_over_zero_is_done() {
        let empty = CheckpointData::new(Vec::new(), 0, 0, 0.0).expect("data");
        let progress = guess_verification_progress(&empty, Some(&tip(0, 0)), true, &FixedClock(0));
        assert_eq!(progress, 1.0);
    }
}
