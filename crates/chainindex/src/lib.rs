//! Block index nodes, the lookup/ancestor contract, and an in-memory index.

pub mod memory;
pub mod node;

pub use memory::{get_skip_height, IndexError, MemoryBlockIndex};
pub use node::{BlockIndex, BlockIndexNode};
