use std::collections::HashMap;
use crate::core::data_store::{Key, Value};

#[tarpc::service]
pub trait RingService {
	// Ring membership
	async fn add_nodes_rpc(nodes: Vec<String>);
	async fn remove_node_rpc(node: String);
	async fn nodes_rpc() -> Vec<String>;

	// Routing and diagnostics
	async fn locate_rpc(key: Key) -> Option<String>;
	async fn load_distribution_rpc() -> HashMap<String, f64>;

	// Get or set key in the store of its owner
	// (ttl in seconds, None never expires)
	async fn get_rpc(key: Key) -> Option<Value>;
	async fn set_rpc(key: Key, value: Option<Value>, ttl_secs: Option<u64>) -> Option<String>;
}
