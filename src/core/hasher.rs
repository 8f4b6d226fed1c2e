use super::{calculate_hash, ring::Position};

/// Maps node identities and keys onto ring positions
pub trait PositionHasher {
	fn position(&self, input: &str) -> Position;
}

/// CRC-32 (IEEE) over the UTF-8 bytes of the input
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Hasher;

impl PositionHasher for Crc32Hasher {
	fn position(&self, input: &str) -> Position {
		calculate_hash(input.as_bytes())
	}
}
