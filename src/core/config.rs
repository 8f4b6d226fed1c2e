use std::default::Default;

#[derive(Clone, Debug)]
pub struct Config {
	// positions per physical node (>= 1)
	pub virtual_nodes: usize,
	// buckets in each node-local store
	pub store_buckets: usize,
	/// max number of concurrent connections buffered
	pub max_connections: u64
}

impl Default for Config {
	fn default() -> Self {
		Self {
			virtual_nodes: 1,
			store_buckets: 64,
			max_connections: 16
		}
	}
}
