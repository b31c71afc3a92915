//! Command line and `anchor.conf` handling.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anchor_consensus::Network;
use anchor_log as logging;

pub const DEFAULT_CONF_FILE: &str = "anchor.conf";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Info,
    Progress,
    Trust,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub command: Command,
    pub conf_path: PathBuf,
    pub network: Network,
    pub log_level: logging::Level,
    pub log_format: logging::Format,
    pub log_timestamps: bool,
    pub json: bool,
    pub height: Option<i32>,
    pub chain_tx: Option<u64>,
    pub time: Option<u32>,
    pub now: Option<i64>,
    pub sigchecks: bool,
    pub importing: bool,
    pub fast_sync: bool,
}

#[derive(Debug, PartialEq)]
pub enum CliAction {
    PrintHelp,
    PrintVersion,
    Run(Config),
}

pub fn parse_args() -> Result<CliAction, String> {
    parse_args_from(std::env::args().skip(1))
}

pub fn parse_args_from<I>(raw_args: I) -> Result<CliAction, String>
where
    I: IntoIterator<Item = String>,
{
    let mut command = Command::Info;
    let mut conf_path: Option<PathBuf> = None;
    let mut network = Network::Mainnet;
    let mut network_set = false;
    let mut log_level = logging::Level::Info;
    let mut log_level_set = false;
    let mut log_format = logging::Format::Text;
    let mut log_format_set = false;
    let mut log_timestamps = true;
    let mut json = false;
    let mut height: Option<i32> = None;
    let mut chain_tx: Option<u64> = None;
    let mut time: Option<u32> = None;
    let mut now: Option<i64> = None;
    let mut sigchecks = true;
    let mut sigchecks_set = false;
    let mut importing = false;
    let mut importing_set = false;
    let mut fast_sync = false;
    let mut fast_sync_set = false;
    let mut args = raw_args.into_iter().peekable();

    if let Some(first) = args.peek().map(|value| value.as_str()) {
        match first {
            "help" => return Ok(CliAction::PrintHelp),
            "version" => return Ok(CliAction::PrintVersion),
            "info" => {
                command = Command::Info;
                let _ = args.next();
            }
            "progress" => {
                command = Command::Progress;
                let _ = args.next();
            }
            "trust" => {
                command = Command::Trust;
                let _ = args.next();
            }
            _ => {}
        }
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(CliAction::PrintHelp),
            "--version" | "-V" => return Ok(CliAction::PrintVersion),
            "--conf" => {
                let value = next_value(&mut args, "--conf")?;
                conf_path = Some(PathBuf::from(value));
            }
            "--network" => {
                let value = next_value(&mut args, "--network")?;
                network = Network::parse(&value)
                    .ok_or_else(|| format!("invalid network '{value}'\n{}", usage()))?;
                network_set = true;
            }
            "--testnet" => {
                network = Network::Testnet;
                network_set = true;
            }
            "--regtest" => {
                network = Network::Regtest;
                network_set = true;
            }
            "--log-level" | "--loglevel" => {
                let value = next_value(&mut args, "--log-level")?;
                log_level = logging::Level::parse(&value)
                    .ok_or_else(|| format!("invalid log level '{value}'\n{}", usage()))?;
                log_level_set = true;
            }
            "--log-format" | "--logformat" => {
                let value = next_value(&mut args, "--log-format")?;
                log_format = logging::Format::parse(&value)
                    .ok_or_else(|| format!("invalid log format '{value}'\n{}", usage()))?;
                log_format_set = true;
            }
            "--log-timestamps" | "--logtimestamps" => {
                log_timestamps = true;
            }
            "--no-log-timestamps" | "--no-logtimestamps" => {
                log_timestamps = false;
            }
            "--json" => {
                json = true;
            }
            "--height" => {
                let value = next_value(&mut args, "--height")?;
                let parsed = value
                    .parse::<i32>()
                    .ok()
                    .filter(|height| *height >= 0)
                    .ok_or_else(|| format!("invalid height '{value}'\n{}", usage()))?;
                height = Some(parsed);
            }
            "--chain-tx" => {
                let value = next_value(&mut args, "--chain-tx")?;
                chain_tx = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid chain tx count '{value}'\n{}", usage()))?,
                );
            }
            "--time" => {
                let value = next_value(&mut args, "--time")?;
                time = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("invalid block time '{value}'\n{}", usage()))?,
                );
            }
            "--now" => {
                let value = next_value(&mut args, "--now")?;
                now = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| format!("invalid time '{value}'\n{}", usage()))?,
                );
            }
            "--sigchecks" => {
                sigchecks = true;
                sigchecks_set = true;
            }
            "--no-sigchecks" => {
                sigchecks = false;
                sigchecks_set = true;
            }
            "--import" => {
                importing = true;
                importing_set = true;
            }
            "--fastsync" | "--fast-sync" => {
                fast_sync = true;
                fast_sync_set = true;
            }
            other => return Err(format!("unknown argument '{other}'\n{}", usage())),
        }
    }

    let conf_file = conf_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONF_FILE));
    if let Some(conf) = load_anchor_conf(&conf_file)? {
        if !network_set {
            if conf_flag(&conf, "regtest", &conf_file)? == Some(true) {
                network = Network::Regtest;
            } else if conf_flag(&conf, "testnet", &conf_file)? == Some(true) {
                network = Network::Testnet;
            }
        }
        if !sigchecks_set {
            if let Some(value) = conf_flag(&conf, "sigchecks", &conf_file)? {
                sigchecks = value;
            }
        }
        if !importing_set {
            if let Some(value) = conf_flag(&conf, "import", &conf_file)? {
                importing = value;
            }
        }
        if !fast_sync_set {
            if let Some(value) = conf_flag(&conf, "fastsync", &conf_file)? {
                fast_sync = value;
            }
        }
        if !log_level_set {
            if let Some(raw) = conf.get("loglevel").and_then(|values| values.last()) {
                log_level = logging::Level::parse(raw).ok_or_else(|| {
                    format!("invalid loglevel '{raw}' in {}", conf_file.display())
                })?;
            }
        }
        if !log_format_set {
            if let Some(raw) = conf.get("logformat").and_then(|values| values.last()) {
                log_format = logging::Format::parse(raw).ok_or_else(|| {
                    format!("invalid logformat '{raw}' in {}", conf_file.display())
                })?;
            }
        }
    }

    match command {
        Command::Info => {}
        Command::Progress => {
            if height.is_none() || chain_tx.is_none() || time.is_none() {
                return Err(format!(
                    "progress requires --height, --chain-tx and --time\n{}",
                    usage()
                ));
            }
        }
        Command::Trust => {
            if height.is_none() {
                return Err(format!("trust requires --height\n{}", usage()));
            }
        }
    }

    Ok(CliAction::Run(Config {
        command,
        conf_path: conf_file,
        network,
        log_level,
        log_format,
        log_timestamps,
        json,
        height,
        chain_tx,
        time,
        now,
        sigchecks,
        importing,
        fast_sync,
    }))
}

fn next_value<I>(args: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| format!("missing value for {flag}\n{}", usage()))
}

fn conf_flag(
    conf: &HashMap<String, Vec<String>>,
    key: &str,
    conf_file: &Path,
) -> Result<Option<bool>, String> {
    let Some(raw) = conf.get(key).and_then(|values| values.last()) else {
        return Ok(None);
    };
    parse_conf_bool(raw)
        .map(Some)
        .ok_or_else(|| format!("invalid {key} value '{raw}' in {}", conf_file.display()))
}

/// Reads `key=value` lines; a missing file is not an error.
pub fn load_anchor_conf(path: &Path) -> Result<Option<HashMap<String, Vec<String>>>, String> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(format!("failed to read {}: {err}", path.display())),
    };

    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    for raw_line in contents.lines() {
        let mut line = raw_line.trim();
        if let Some(idx) = line.find(['#', ';']) {
            line = &line[..idx];
        }
        line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (line, "1"),
        };
        if key.is_empty() {
            continue;
        }
        out.entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
    }
    Ok(Some(out))
}

pub fn parse_conf_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.is_empty() {
        return Some(true);
    }
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

pub fn usage() -> String {
    [
        "Usage:",
        "  anchord [command] [options]",
        "",
        "Commands:",
        "  info      Print checkpoint status for the selected network (default)",
        "  progress  Estimate verification progress for a described chain tip",
        "  trust     Report whether a block height may skip signature checks",
        "  help      Print this help and exit",
        "  version   Print version and exit",
        "",
        "Options:",
        "  --help, -h  Print this help and exit",
        "  --version, -V  Print version and exit",
        "  --conf  Config file path (default: ./anchor.conf)",
        "  --network  mainnet|testnet|regtest (default: mainnet)",
        "  --testnet, --regtest  Shorthand for --network",
        "  --log-level  Log verbosity (error|warn|info|debug|trace) (default: info)",
        "  --log-format  Log output format (text|json) (default: text)",
        "  --log-timestamps  Enable timestamps in text logs (default: on)",
        "  --no-log-timestamps  Disable timestamps in text logs",
        "  --json  Print results as JSON",
        "  --height  Block height of the tip or candidate",
        "  --chain-tx  Transactions from genesis through the tip",
        "  --time  Block time of the tip (UNIX seconds)",
        "  --now  Override the current time (UNIX seconds)",
        "  --sigchecks, --no-sigchecks  Weight post-checkpoint work as signature checked (default: on)",
        "  --import  Treat the block as read from a bulk import",
        "  --fastsync  Allow skipping signature checks below the last checkpoint",
        "",
        "Config file keys: testnet, regtest, sigchecks, import, fastsync, loglevel, logformat",
    ]
    .join("\n")
}
