//! Chain parameter definitions and the checkpoint calibration tables.

use std::fmt;

use crate::Hash256;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Some(Self::Mainnet),
            "testnet" | "test" => Some(Self::Testnet),
            "regtest" => Some(Self::Regtest),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HexError {
    InvalidLength,
    InvalidHex,
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexError::InvalidLength => write!(f, "invalid hash length"),
            HexError::InvalidHex => write!(f, "invalid hex digit"),
        }
    }
}

impl std::error::Error for HexError {}

/// Parses a display-order (big-endian) hex hash into internal byte order.
///
/// Short inputs are left-padded with zeros, so `"00"` is the zero hash.
pub fn hash256_from_hex(input: &str) -> Result<Hash256, HexError> {
    let mut hex = input.trim();
    if let Some(stripped) = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")) {
        hex = stripped;
    }
    if hex.is_empty() || hex.len() > 64 {
        return Err(HexError::InvalidLength);
    }

    let mut padded = String::with_capacity(64);
    for _ in hex.len()..64 {
        padded.push('0');
    }
    padded.push_str(hex);

    let mut bytes = [0u8; 32];
    for (i, byte_out) in bytes.iter_mut().enumerate() {
        let start = i * 2;
        *byte_out = u8::from_str_radix(&padded[start..start + 2], 16)
            .map_err(|_| HexError::InvalidHex)?;
    }
    bytes.reverse();
    Ok(bytes)
}

pub fn hash256_to_hex(hash: &Hash256) -> String {
    let mut out = String::with_capacity(64);
    for byte in hash.iter().rev() {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub height: i32,
    pub hash: Hash256,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CheckpointError {
    UnorderedHeights { previous: i32, next: i32 },
    InvalidHash(HexError),
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::UnorderedHeights { previous, next } => write!(
                f,
                "checkpoint heights must be strictly increasing ({previous} then {next})"
            ),
            CheckpointError::InvalidHash(err) => write!(f, "invalid checkpoint hash: {err}"),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<HexError> for CheckpointError {
    fn from(err: HexError) -> Self {
        CheckpointError::InvalidHash(err)
    }
}

/// Checkpoints plus the throughput figures used to project verification work.
///
/// Heights are strictly increasing; this is checked once at construction and
/// relied on by every reader afterwards.
#[derive(Clone, Debug)]
pub struct CheckpointData {
    checkpoints: Vec<Checkpoint>,
    /// UNIX timestamp of the last checkpoint block.
    pub time_last_checkpoint: i64,
    /// Total number of transactions between genesis and the last checkpoint.
    pub transactions_last_checkpoint: u64,
    /// Estimated number of transactions per day after the last checkpoint.
    pub transactions_per_day: f64,
}

impl CheckpointData {
    pub fn new(
        checkpoints: Vec<Checkpoint>,
        time_last_checkpoint: i64,
        transactions_last_checkpoint: u64,
        transactions_per_day: f64,
    ) -> Result<Self, CheckpointError> {
        for window in checkpoints.windows(2) {
            if window[0].height >= window[1].height {
                return Err(CheckpointError::UnorderedHeights {
                    previous: window[0].height,
                    next: window[1].height,
                });
            }
        }
        Ok(Self {
            checkpoints,
            time_last_checkpoint,
            transactions_last_checkpoint,
            transactions_per_day,
        })
    }

    pub fn from_hex(
        entries: &[(i32, &str)],
        time_last_checkpoint: i64,
        transactions_last_checkpoint: u64,
        transactions_per_day: f64,
    ) -> Result<Self, CheckpointError> {
        let checkpoints = entries
            .iter()
            .map(|(height, hash)| {
                Ok(Checkpoint {
                    height: *height,
                    hash: hash256_from_hex(hash)?,
                })
            })
            .collect::<Result<Vec<_>, CheckpointError>>()?;
        Self::new(
            checkpoints,
            time_last_checkpoint,
            transactions_last_checkpoint,
            transactions_per_day,
        )
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Lowest height first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Checkpoint> + ExactSizeIterator {
        self.checkpoints.iter()
    }

    /// Highest height first.
    pub fn iter_rev(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter().rev()
    }

    pub fn last(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }

    pub fn at_height(&self, height: i32) -> Option<&Checkpoint> {
        self.checkpoints
            .binary_search_by_key(&height, |checkpoint| checkpoint.height)
            .ok()
            .map(|index| &self.checkpoints[index])
    }
}

#[derive(Clone, Debug)]
pub struct ChainParams {
    pub network: Network,
    pub hash_genesis_block: Hash256,
    pub genesis_time: u32,
    pub checkpoints: CheckpointData,
}

pub fn chain_params(network: Network) -> ChainParams {
    match network {
        Network::Mainnet => mainnet_chain_params(),
        Network::Testnet => testnet_chain_params(),
        Network::Regtest => regtest_chain_params(),
    }
}

fn mainnet_chain_params() -> ChainParams {
    ChainParams {
        network: Network::Mainnet,
        hash_genesis_block: hash256_from_hex(
            "00052461a5006c2e3b74ce48992a08695607912d5604c3eb8da25749b0900444",
        )
        .expect("mainnet genesis hash"),
        genesis_time: 1_516_980_000,
        checkpoints: mainnet_checkpoints(),
    }
}

fn testnet_chain_params() -> ChainParams {
    ChainParams {
        network: Network::Testnet,
        hash_genesis_block: hash256_from_hex(
            "0042202a64a929fc25cc10e68615ddbe38007b1b40da08acd3f530f83c79b9d1",
        )
        .expect("testnet genesis hash"),
        genesis_time: 1_582_228_940,
        checkpoints: testnet_checkpoints(),
    }
}

fn regtest_chain_params() -> ChainParams {
    ChainParams {
        network: Network::Regtest,
        hash_genesis_block: hash256_from_hex(
            "01998760a88dc2b5715f69d2f18c1d90e0b604612242d9099eaff3048dd1e0ce",
        )
        .expect("regtest genesis hash"),
        genesis_time: 1_296_688_602,
        checkpoints: regtest_checkpoints(),
    }
}

fn mainnet_checkpoints() -> CheckpointData {
    CheckpointData::from_hex(
        &[
            (
                0,
                "00052461a5006c2e3b74ce48992a08695607912d5604c3eb8da25749b0900444",
            ),
            (
                5500,
                "0000000e7724f8bace09dd762657169c10622af4a6a8e959152cd00b9119848e",
            ),
            (
                35000,
                "000000004646dd797644b9c67aff320961e95c311b4f26985424b720d09fcaa5",
            ),
            (
                70000,
                "00000001edcf7768ed39fac55414e53a78d077b1b41fccdaf9307d7bc219626a",
            ),
            (
                94071,
                "00000005ec83876bc5288badf0971ae83ac7c6a286851f7b22a75a03e73b401a",
            ),
            (
                277649,
                "00000004a53f9271d05071a052b3738b46663f3335d14b6aea965a3cb70c0cc8",
            ),
            (
                400000,
                "000000390342f0e52443ad79b43e5d85b78bf519667aeb3aa980d76caeda0369",
            ),
            (
                530000,
                "0000004b4459ec6904e8116d178c357b0f25a7d45c5c5836ce3714791f1ed124",
            ),
            (
                600000,
                "000000dea4478401e6ab95f6d05ade810115411e95e75fab9fd94a44df4b1e1d",
            ),
            (
                700000,
                "0000000845ef03939225cc592773fd7aef54b5232fc42790c46ef6f11ee3e8d4",
            ),
            (
                800000,
                "000000451b73f495b2f6ad38bd89d15495551fc15c2078ad7af3d54d06422cc6",
            ),
            (
                900000,
                "000001e1ad2bb5e3cabb09559b6e65b871bf1d2a51bcc141ce45fc4cbd1d9cd8",
            ),
            (
                1000000,
                "0000001a80e7f30d21fb14116cd01d51e1fad8ac84cc960896f4691a57368a47",
            ),
            (
                1040000,
                "00000007f3b465bd4b0e161e43c05a3d946144330e33ea3a91cb952e6ef86b7d",
            ),
            (
                1040577,
                "000000071fe89682ac260bc0a49621344eb28ae01659c9e7ce86e3762e45f52d",
            ),
            (
                1042126,
                "0000000295e4663178fd9e533787e74206645910a2bfb61938db5f67796eaad0",
            ),
            (
                1060000,
                "0000000fd721d8d381c4b24a4f78fc036955d7a0f98d2765b8c7badad8b66c1b",
            ),
            (
                1442798,
                "0000000cc561fecb2ecfd22ba7af09450ca8cf270f407ce8b948195ff2aa0d13",
            ),
            (
                1518503,
                "0000000dba41dc84c52a3933af49d316fff49a76b49d42bd5b6d20c4e451a0ef",
            ),
            (
                1791720,
                "0000000abc7bd62a213e0dab43c9c01220b031a568fdfb5c2ef89e6b30054bdc",
            ),
            (
                2020500,
                "af2a1bd59c61f64860b4b45bd65358743fda40d8420564b58c39df45be7da97c",
            ),
            (
                2021000,
                "d2dcec473e809575e30ec2c0f400758120f5121b8268f90cdb8a7dbefe285b0d",
            ),
            (
                2021500,
                "fa98471f31ffc1366330bababc090ad5cb6bd23c25bb3b61d1e1ed07a77d6126",
            ),
            (
                2022000,
                "40a060546a56eb7fab0fd33ab3e6de834ff0d5273847d4f231a9addecfc44f61",
            ),
            (
                2029000,
                "4856dc788a973db4cc537465c9ef80288e1eb065898993d72371b1ee48c248b4",
            ),
        ],
        1_759_507_200, // * UNIX timestamp of last checkpoint block
        9_400_000,     // * total number of transactions between genesis and last checkpoint
        6_000.0,       // * estimated number of transactions per day after checkpoint
    )
    .expect("mainnet checkpoints")
}

fn testnet_checkpoints() -> CheckpointData {
    CheckpointData::from_hex(
        &[
            (
                0,
                "0042202a64a929fc25cc10e68615ddbe38007b1b40da08acd3f530f83c79b9d1",
            ),
            (
                320,
                "0237bf16aba912b0c68933809a7e7fe9553ddff1bc0782d2463fc5d161af1c46",
            ),
        ],
        1_582_248_140,
        321,
        1_440.0,
    )
    .expect("testnet checkpoints")
}

fn regtest_checkpoints() -> CheckpointData {
    CheckpointData::from_hex(
        &[(
            0,
            "01998760a88dc2b5715f69d2f18c1d90e0b604612242d9099eaff3048dd1e0ce",
        )],
        1_296_688_602,
        0,
        0.0,
    )
    .expect("regtest checkpoints")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_checkpoints_match_cpp() {
        let params = chain_params(Network::Mainnet);
        let data = &params.checkpoints;

        assert_eq!(data.len(), 25);
        let first = data.iter().next().expect("checkpoint");
        assert_eq!(first.height, 0);
        assert_eq!(first.hash, params.hash_genesis_block);
        assert_eq!(
            hash256_to_hex(&first.hash),
            "00052461a5006c2e3b74ce48992a08695607912d5604c3eb8da25749b0900444"
        );

        let last = data.last().expect("checkpoint");
        assert_eq!(last.height, 2_029_000);
        assert_eq!(
            hash256_to_hex(&last.hash),
            "4856dc788a973db4cc537465c9ef80288e1eb065898993d72371b1ee48c248b4"
        );
    }

    #[test]
    fn compiled_tables_are_strictly_increasing() {
        for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
            let params = chain_params(network);
            let heights: Vec<i32> = params.checkpoints.iter().map(|c| c.height).collect();
            for window in heights.windows(2) {
                assert!(window[0] < window[1], "{network:?} checkpoints out of order");
            }
            let genesis = params.checkpoints.at_height(0).expect("genesis checkpoint");
            assert_eq!(genesis.hash, params.hash_genesis_block);
        }
    }

    #[test]
    fn reverse_iteration_is_highest_first() {
        let params = chain_params(Network::Testnet);
        let heights: Vec<i32> = params.checkpoints.iter_rev().map(|c| c.height).collect();
        assert_eq!(heights, vec![320, 0]);
    }

    #[test]
    fn rejects_unordered_heights() {
        let hash = [1u8; 32];
        let err = CheckpointData::new(
            vec![
                Checkpoint { height: 10, hash },
                Checkpoint { height: 10, hash },
            ],
            0,
            0,
            0.0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CheckpointError::UnorderedHeights {
                previous: 10,
                next: 10
            }
        );

        let err = CheckpointData::new(
            vec![
                Checkpoint { height: 20, hash },
                Checkpoint { height: 5, hash },
            ],
            0,
            0,
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, CheckpointError::UnorderedHeights { .. }));
    }

    #[test]
    fn rejects_bad_hash_literals() {
        let err = CheckpointData::from_hex(&[(1, "zz")], 0, 0, 0.0).unwrap_err();
        assert_eq!(err, CheckpointError::InvalidHash(HexError::InvalidHex));

        let too_long = "0".repeat(65);
        assert_eq!(hash256_from_hex(&too_long), Err(HexError::InvalidLength));
        assert_eq!(hash256_from_hex(""), Err(HexError::InvalidLength));
    }

    #[test]
    fn short_hex_is_left_padded() {
        let hash = hash256_from_hex("0x01").expect("hash");
        assert_eq!(hash[0], 1);
        assert!(hash[1..].iter().all(|byte| *byte == 0));
        assert_eq!(hash256_from_hex("00").expect("zero"), [0u8; 32]);
    }

    #[test]
    fn network_names() {
        assert_eq!(Network::parse("MAINNET"), Some(Network::Mainnet));
        assert_eq!(Network::parse("testnet"), Some(Network::Testnet));
        assert_eq!(Network::parse("regtest"), Some(Network::Regtest));
        assert_eq!(Network::parse("signet"), None);
        assert_eq!(Network::Regtest.as_str(), "regtest");
    }
}
