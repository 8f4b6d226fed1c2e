use std::{
	collections::{HashMap, BTreeSet},
	sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard}
};
use log::{debug, warn, log_enabled, Level};
use super::{
	config::Config,
	error::{
		*,
		RingError::*
	},
	hasher::{PositionHasher, Crc32Hasher}
};

pub type Position = u32;
// number of points on the ring
pub const RING_SIZE: u64 = 1 << 32;

/// Span of ring values owned by a single position: (start, end]
///
/// The lowest position owns the boundary range, which wraps past 2^32 - 1 back to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipRange {
	/// Predecessor position (exclusive)
	pub start: Position,
	/// Owning position (inclusive)
	pub end: Position,
	pub boundary: bool
}

impl OwnershipRange {
	/// Number of ring values in the range
	pub fn len(&self) -> u64 {
		if self.boundary {
			// (start, 2^32 - 1] + [0, end]
			(RING_SIZE - 1 - self.start as u64) + (self.end as u64 + 1)
		}
		else {
			// end < start can only come from a hand-built range
			self.end.wrapping_sub(self.start) as u64
		}
	}

	pub fn contains(&self, pos: Position) -> bool {
		in_range(pos, self.start, self.end) || pos == self.end
	}
}

// Strictly in range: pos in (start, end)
pub fn in_range(pos: Position, start: Position, end: Position) -> bool {
	if end > start {
		pos > start && pos < end
	}
	else {
		// end <= start, the range wraps around 0
		pos > start || pos < end
	}
}

#[derive(Default)]
struct RingState {
	// sorted, no duplicates
	positions: Vec<Position>,
	owners: HashMap<Position, String>,
	collisions: u64
}

impl RingState {
	// First position >= pos, wrapping to the lowest one
	fn locate(&self, pos: Position) -> Option<&str> {
		if self.positions.is_empty() {
			return None;
		}
		let mut idx = self.positions.partition_point(|&p| p < pos);
		if idx == self.positions.len() {
			idx = 0;
		}
		self.owners.get(&self.positions[idx]).map(String::as_str)
	}

	fn ranges(&self) -> impl Iterator<Item = (OwnershipRange, &str)> + '_ {
		let last = self.positions.len().wrapping_sub(1);
		self.positions.iter().enumerate().filter_map(move |(i, &end)| {
			let owner = self.owners.get(&end)?;
			let range = if i == 0 {
				OwnershipRange {
					start: self.positions[last],
					end,
					boundary: true
				}
			} else {
				OwnershipRange {
					start: self.positions[i - 1],
					end,
					boundary: false
				}
			};
			Some((range, owner.as_str()))
		})
	}

	fn load_distribution(&self) -> HashMap<String, f64> {
		// exact integer sums; one division per node
		let mut owned: HashMap<&str, u64> = HashMap::new();
		for (range, node) in self.ranges() {
			*owned.entry(node).or_insert(0) += range.len();
		}
		owned.into_iter()
			.map(|(node, values)| (node.to_string(), values as f64 / RING_SIZE as f64 * 100.0))
			.collect()
	}
}

/// Thread-safe consistent hashing ring
///
/// Every physical node occupies `virtual_nodes` positions on a 32-bit ring.
/// A key belongs to the node at the first position >= hash(key), wrapping
/// around to the lowest position.
///
/// Two identities hashing to the same position are not disambiguated:
/// the last `add` wins that position and the overwrite is counted in
/// [`Ring::collisions`].
pub struct Ring<H = Crc32Hasher> {
	hasher: H,
	virtual_nodes: usize,
	state: RwLock<RingState>
}

impl Ring<Crc32Hasher> {
	/// Ring with a single position per node
	pub fn new() -> Self {
		Ring {
			hasher: Crc32Hasher,
			virtual_nodes: 1,
			state: RwLock::new(RingState::default())
		}
	}

	pub fn with_virtual_nodes(virtual_nodes: usize) -> RingResult<Self> {
		Ring::with_hasher(virtual_nodes, Crc32Hasher)
	}

	pub fn from_config(config: &Config) -> RingResult<Self> {
		Ring::with_virtual_nodes(config.virtual_nodes)
	}
}

impl Default for Ring<Crc32Hasher> {
	fn default() -> Self {
		Ring::new()
	}
}

impl<H: PositionHasher> Ring<H> {
	pub fn with_hasher(virtual_nodes: usize, hasher: H) -> RingResult<Self> {
		if virtual_nodes == 0 {
			return Err(ZeroVirtualNodes);
		}
		Ok(Ring {
			hasher,
			virtual_nodes,
			state: RwLock::new(RingState::default())
		})
	}

	fn read_state(&self) -> RwLockReadGuard<'_, RingState> {
		self.state.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write_state(&self) -> RwLockWriteGuard<'_, RingState> {
		self.state.write().unwrap_or_else(PoisonError::into_inner)
	}

	// Position of the i-th replica of a node
	// (no suffix when there is a single replica)
	fn replica_position(&self, node: &str, replica: usize) -> Position {
		if self.virtual_nodes == 1 {
			self.hasher.position(node)
		} else {
			self.hasher.position(&format!("{}{}", node, replica))
		}
	}

	/// Add nodes to the ring
	///
	/// The whole batch is applied under one write lock and the positions are
	/// sorted once at the end.
	pub fn add<I, S>(&self, nodes: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>
	{
		let mut state = self.write_state();
		let mut added = 0usize;
		for node in nodes {
			let node = node.as_ref();
			for i in 0..self.virtual_nodes {
				let pos = self.replica_position(node, i);
				match state.owners.insert(pos, node.to_string()) {
					None => state.positions.push(pos),
					Some(prev) if prev != node => {
						state.collisions += 1;
						warn!("ring: position {} of {} overwrites {}", pos, node, prev);
					},
					// same node added again
					Some(_) => ()
				};
			}
			added += 1;
		}
		state.positions.sort_unstable();

		debug!("ring: added {} nodes, {} positions", added, state.positions.len());
		if log_enabled!(Level::Debug) {
			let mut shares: Vec<_> = state.load_distribution().into_iter().collect();
			shares.sort_by(|a, b| a.0.cmp(&b.0));
			for (node, pct) in shares {
				debug!("ring: {} accounts for {:.2}% of the ring", node, pct);
			}
		}
	}

	/// Remove all positions of a node
	///
	/// Positions are recomputed the same way `add` derives them. Removing an
	/// absent node does nothing.
	pub fn remove(&self, node: &str) {
		let mut state = self.write_state();
		let mut removed = 0usize;
		for i in 0..self.virtual_nodes {
			let pos = self.replica_position(node, i);
			// skip positions lost to a colliding node
			if state.owners.get(&pos).map(String::as_str) != Some(node) {
				continue;
			}
			state.owners.remove(&pos);
			if let Ok(idx) = state.positions.binary_search(&pos) {
				state.positions.remove(idx);
			}
			removed += 1;
		}
		if removed > 0 {
			debug!("ring: removed {} ({} positions)", node, removed);
		}
	}

	/// Node responsible for a key, or None on an empty ring
	pub fn get(&self, key: &str) -> Option<String> {
		let pos = self.hasher.position(key);
		self.read_state().locate(pos).map(str::to_string)
	}

	/// Percentage of the ring owned by each node
	pub fn load_distribution(&self) -> HashMap<String, f64> {
		self.read_state().load_distribution()
	}

	/// Every position's ownership range with its node, in ring order
	pub fn ownership_ranges(&self) -> Vec<(OwnershipRange, String)> {
		self.read_state()
			.ranges()
			.map(|(range, node)| (range, node.to_string()))
			.collect()
	}

	/// Distinct physical nodes, sorted
	pub fn nodes(&self) -> Vec<String> {
		let state = self.read_state();
		state.owners.values()
			.map(String::as_str)
			.collect::<BTreeSet<_>>()
			.into_iter()
			.map(str::to_string)
			.collect()
	}

	/// Number of positions on the ring
	pub fn len(&self) -> usize {
		self.read_state().positions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.read_state().positions.is_empty()
	}

	pub fn virtual_nodes(&self) -> usize {
		self.virtual_nodes
	}

	/// Number of positions overwritten by a different node
	pub fn collisions(&self) -> u64 {
		self.read_state().collisions
	}
}
