//! `anchord`: inspect checkpoint trust decisions and sync progress estimates.

pub mod config;
pub mod sigcheck;
pub mod status;

use serde_json::json;

use anchor_chainindex::{BlockIndexNode, MemoryBlockIndex};
use anchor_checkpoints::{
    guess_verification_progress, is_ancestor_of_last_checkpoint, Clock, FixedClock, SystemClock,
};
use anchor_consensus::chain_params;
use anchor_log::{self as logging, log_debug, log_info};

use crate::config::{parse_args, usage, CliAction, Command, Config};
use crate::sigcheck::{ImportFlag, SigcheckPolicy};
use crate::status::CheckpointStatus;

pub fn run_entry() -> Result<(), String> {
    match parse_args()? {
        CliAction::PrintHelp => {
            println!("{}", usage());
            Ok(())
        }
        CliAction::PrintVersion => {
            println!("anchord {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliAction::Run(config) => {
            let output = run_with_config(&config)?;
            println!("{output}");
            Ok(())
        }
    }
}

pub fn run_with_config(config: &Config) -> Result<String, String> {
    logging::init(logging::LogConfig {
        level: config.log_level,
        format: config.log_format,
        timestamps: config.log_timestamps,
    });
    log_debug!(
        "network {} (conf {})",
        config.network.as_str(),
        config.conf_path.display()
    );

    let clock: Box<dyn Clock> = match config.now {
        Some(now) => Box::new(FixedClock(now)),
        None => Box::new(SystemClock),
    };

    match config.command {
        Command::Info => Ok(info(config, clock.as_ref())),
        Command::Progress => progress(config, clock.as_ref()),
        Command::Trust => trust(config),
    }
}

fn info(config: &Config, clock: &dyn Clock) -> String {
    let params = chain_params(config.network);
    let index = MemoryBlockIndex::new();
    let status = CheckpointStatus::collect(&params, &index, None, config.sigchecks, clock);
    if config.json {
        status.to_json().to_string()
    } else {
        status.render_text()
    }
}

fn described_tip(config: &Config) -> Result<BlockIndexNode, String> {
    let height = config
        .height
        .ok_or_else(|| format!("missing --height\n{}", usage()))?;
    Ok(BlockIndexNode {
        hash: [0u8; 32],
        height,
        chain_tx: config.chain_tx.unwrap_or(0),
        time: config.time.unwrap_or(0),
    })
}

fn progress(config: &Config, clock: &dyn Clock) -> Result<String, String> {
    let params = chain_params(config.network);
    let tip = described_tip(config)?;
    let progress =
        guess_verification_progress(&params.checkpoints, Some(&tip), config.sigchecks, clock);
    log_info!(
        "height {} chain_tx {}: verification progress {:.6}",
        tip.height,
        tip.chain_tx,
        progress
    );
    if config.json {
        Ok(json!({
            "network": config.network.as_str(),
            "height": tip.height,
            "chain_tx": tip.chain_tx,
            "sigchecks": config.sigchecks,
            "verification_progress": progress,
        })
        .to_string())
    } else {
        Ok(format!("{progress:.6}"))
    }
}

/// The CLI has no block index of its own, so outside import mode the verdict
/// is taken against an empty index and fails closed.
fn trust(config: &Config) -> Result<String, String> {
    let params = chain_params(config.network);
    let candidate = described_tip(config)?;
    let index = MemoryBlockIndex::new();

    let import_flag = ImportFlag::new();
    let _guard = config.importing.then(|| import_flag.begin());
    let importing = import_flag.is_importing();
    let trusted =
        is_ancestor_of_last_checkpoint(&params.checkpoints, importing, &index, &candidate);
    let policy = SigcheckPolicy {
        skip_below_checkpoint: config.fast_sync,
    };
    let checks_required =
        policy.signature_checks_required(&params.checkpoints, importing, &index, &candidate);

    if config.json {
        Ok(json!({
            "network": config.network.as_str(),
            "height": candidate.height,
            "importing": importing,
            "trusted": trusted,
            "signature_checks_required": checks_required,
        })
        .to_string())
    } else {
        Ok(format!(
            "trusted: {trusted}\nsignature checks: {}",
            if checks_required { "required" } else { "skipped" }
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_args_from;

    fn config(raw: &[&str]) -> Config {
        let dir = tempfile::tempdir().expect("tempdir");
        let conf = dir.path().join("absent.conf").display().to_string();
        let mut args: Vec<String> = raw.iter().map(|value| value.to_string()).collect();
        args.push("--conf".to_string());
        args.push(conf);
        match parse_args_from(args).expect("parse") {
            CliAction::Run(config) => config,
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn info_reports_testnet_checkpoints() {
        let out = run_with_config(&config(&["info", "--testnet", "--json", "--now", "0"]))
            .expect("info");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value["network"], "testnet");
        assert_eq!(value["total_blocks_estimate"], 320);
        assert_eq!(value["verification_progress"], 0.0);
    }

    #[test]
    fn progress_at_last_checkpoint() {
        let params = chain_params(anchor_consensus::Network::Mainnet);
        let height = params.checkpoints.last().expect("checkpoint").height.to_string();
        let chain_tx = params.checkpoints.transactions_last_checkpoint.to_string();
        let time = params.checkpoints.time_last_checkpoint.to_string();
        let out = run_with_config(&config(&[
            "progress",
            "--height",
            &height,
            "--chain-tx",
            &chain_tx,
            "--time",
            &time,
            "--now",
            &time,
        ]))
        .expect("progress");
        assert_eq!(out, "1.000000");
    }

    #[test]
    fn trust_fails_closed_without_index() {
        let out = run_with_config(&config(&["trust", "--height", "100", "--fastsync", "--json"]))
            .expect("trust");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value["importing"], false);
        assert_eq!(value["trusted"], false);
        assert_eq!(value["signature_checks_required"], true);
    }

    #[test]
    fn trust_during_import() {
        let out = run_with_config(&config(&[
            "trust",
            "--height",
            "100",
            "--import",
            "--fastsync",
        ]))
        .expect("trust");
        assert_eq!(out, "trusted: true\nsignature checks: skipped");

        let out = run_with_config(&config(&["trust", "--height", "3000000", "--import"]))
            .expect("trust");
        assert_eq!(out, "trusted: false\nsignature checks: required");
    }
}
