//! Per-network chain parameters and compiled checkpoint tables.

pub mod params;

pub use params::{
    chain_params, hash256_from_hex, hash256_to_hex, ChainParams, Checkpoint, CheckpointData,
    CheckpointError, HexError, Network,
};

pub type Hash256 = [u8; 32];
