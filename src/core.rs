pub mod ring;
pub mod hasher;
pub mod node;
pub mod config;
pub mod data_store;
pub mod error;

pub use ring::{Ring, Position, OwnershipRange, RING_SIZE};
pub use hasher::*;
pub use node::*;
pub use config::*;
pub use error::*;

pub fn calculate_hash(data: &[u8]) -> Position {
	crc32fast::hash(data)
}
