use std::{
	collections::HashMap,
	sync::{Arc, PoisonError, RwLock},
	time::Duration
};
use tarpc::{
	context,
	tokio_serde::formats::Bincode,
	server::Channel
};
use futures::{future, prelude::*};
use log::{info, warn, debug};
use super::{
	ring::Ring,
	config::*,
	data_store::*,
	error::*
};
use crate::{rpc::*, server::ServerManager};

/// Routes keys to node-local stores through a shared ring
///
/// Each physical node on the ring owns one `DataStore`. Membership changes
/// only create or drop stores; entries are never moved between nodes.
#[derive(Clone)]
pub struct RingServer {
	addr: String,
	config: Config,
	ring: Arc<Ring>,
	// node -> its local store
	stores: Arc<RwLock<HashMap<String, DataStore<Value>>>>
}

impl RingServer {
	pub fn new(addr: &str, config: Config) -> RingResult<Self> {
		// validate before any store is created
		DataStore::<Value>::new(config.store_buckets)?;
		let ring = Ring::from_config(&config)?;

		Ok(RingServer {
			addr: addr.to_string(),
			config,
			ring: Arc::new(ring),
			stores: Arc::new(RwLock::new(HashMap::new()))
		})
	}

	pub fn ring(&self) -> &Ring {
		&self.ring
	}

	fn store_of(&self, node: &str) -> Option<DataStore<Value>> {
		let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
		stores.get(node).cloned()
	}

	/// Add nodes to the ring, each with an empty store
	pub fn add_nodes(&self, nodes: Vec<String>) -> RingResult<()> {
		// stores lock is held across the ring update so both change together
		let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
		for node in nodes.iter() {
			if !stores.contains_key(node) {
				stores.insert(node.clone(), DataStore::new(self.config.store_buckets)?);
			}
		}
		self.ring.add(&nodes);
		drop(stores);
		info!("{}: nodes added: {:?}", self.addr, nodes);
		Ok(())
	}

	/// Remove a node and drop its store
	pub fn remove_node(&self, node: &str) {
		let store = {
			let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
			self.ring.remove(node);
			stores.remove(node)
		};
		match store {
			Some(s) if !s.is_empty() => {
				warn!("{}: node {} removed, {} entries dropped", self.addr, node, s.len());
			},
			Some(_) => info!("{}: node {} removed", self.addr, node),
			None => debug!("{}: remove of unknown node {}", self.addr, node)
		};
	}

	/// Get the value of a key from the store of its owner
	pub fn get(&self, key: &str) -> Option<Value> {
		let node = self.ring.get(key)?;
		let store = self.store_of(&node)?;
		store.get(key)
	}

	/**
	 * Set a key in the store of its owner
	 * When value is None, remove that entry.
	 * Returns the owner, or None if the ring is empty.
	 */
	pub fn set(&self, key: &str, value: Option<Value>) -> Option<String> {
		self.set_with_ttl(key, value, None)
	}

	/// Same as `set`, the entry expiring after `ttl`
	pub fn set_with_ttl(&self, key: &str, value: Option<Value>, ttl: Option<Duration>) -> Option<String> {
		let node = self.ring.get(key)?;
		match self.store_of(&node) {
			Some(store) => match value {
				Some(v) => store.put_with_ttl(key, v, ttl),
				None => {
					store.remove(key);
				}
			},
			None => {
				// removed between lookup and write
				warn!("{}: no store for node {}", self.addr, node);
				return None;
			}
		};
		debug!("{}: key {} set at {} (ttl {:?})", self.addr, key, node, ttl);
		Some(node)
	}

	/// Start the server
	/// Returns if the listener starts
	pub async fn start(&self) -> RingResult<ServerManager> {
		// channel used to shutdown (true means shutdown)
		let (tx, rx) = tokio::sync::watch::channel(false);

		let mut listener = tarpc::serde_transport::tcp::listen(&self.addr, Bincode::default).await?;
		let server = self.clone();
		let mut listener_rx = rx;
		let listener_handle = tokio::spawn(async move {
			listener.config_mut().max_frame_length(usize::MAX);
			let listener_fut = listener
				.filter_map(|r| future::ready(r.ok()))
				.map(tarpc::server::BaseChannel::with_defaults)
				.map(|channel| {
					// Clone a new server to share the data in Arc
					let server = server.clone();
					async move {
						channel.execute(server.serve()).await;
					}
				})
				.buffer_unordered(server.config.max_connections as usize)
				.for_each(|_| async {});

			tokio::select! {
				_ = listener_fut => {
					warn!("{}: listener terminated", server.addr);
				},
				_ = listener_rx.changed() => {
					debug!("{}: listener stopped gracefully", server.addr);
				}
			};
		});

		info!("{}: listening with {} virtual nodes per node", self.addr, self.ring.virtual_nodes());
		Ok(ServerManager {
			addr: self.addr.clone(),
			handle: listener_handle,
			tx
		})
	}
}

#[tarpc::server]
impl RingService for RingServer {
	async fn add_nodes_rpc(self, _: context::Context, nodes: Vec<String>) {
		// store buckets are validated in new()
		if let Err(e) = self.add_nodes(nodes) {
			warn!("{}: failed to add nodes: {}", self.addr, e);
		}
	}

	async fn remove_node_rpc(self, _: context::Context, node: String) {
		self.remove_node(&node)
	}

	async fn locate_rpc(self, _: context::Context, key: Key) -> Option<String> {
		self.ring.get(&key)
	}

	async fn load_distribution_rpc(self, _: context::Context) -> HashMap<String, f64> {
		self.ring.load_distribution()
	}

	async fn nodes_rpc(self, _: context::Context) -> Vec<String> {
		self.ring.nodes()
	}

	async fn get_rpc(self, _: context::Context, key: Key) -> Option<Value> {
		self.get(&key)
	}

	async fn set_rpc(self, _: context::Context, key: Key, value: Option<Value>, ttl_secs: Option<u64>) -> Option<String> {
		self.set_with_ttl(&key, value, ttl_secs.map(Duration::from_secs))
	}
}
