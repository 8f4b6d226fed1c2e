use std::{
	sync::{Arc, PoisonError, RwLock},
	time::{Duration, Instant}
};
use super::{
	calculate_hash,
	error::{
		*,
		RingError::*
	}
};

pub type Key = String;
pub type Value = Vec<u8>;

pub trait KVStore<V> {
	fn get(&self, key: &str) -> Option<V>;
	fn set(&self, key: &str, value: Option<V>);
}

struct Entry<V> {
	key: Key,
	value: V,
	// None never expires
	expires_at: Option<Instant>
}

impl<V> Entry<V> {
	fn expired(&self, now: Instant) -> bool {
		matches!(self.expires_at, Some(t) if now >= t)
	}
}

type Bucket<V> = Vec<Entry<V>>;

/// Thread-safe chained hash table
///
/// Keys are spread over a fixed number of buckets by their CRC-32;
/// colliding keys share a bucket and are scanned linearly.
/// Entries may carry a time to live; an expired entry reads as a miss
/// and is dropped on that read.
#[derive(Clone)]
pub struct DataStore<V> {
	buckets: Arc<RwLock<Vec<Bucket<V>>>>
}

impl<V: Clone> DataStore<V> {
	pub fn new(buckets: usize) -> RingResult<Self> {
		if buckets == 0 {
			return Err(ZeroBuckets);
		}
		let table = (0..buckets).map(|_| Vec::new()).collect();
		Ok(DataStore {
			buckets: Arc::new(RwLock::new(table))
		})
	}

	fn index(key: &str, buckets: usize) -> usize {
		calculate_hash(key.as_bytes()) as usize % buckets
	}

	/// Insert a key or update it in place
	pub fn put(&self, key: &str, value: V) {
		self.put_with_ttl(key, value, None)
	}

	/// Insert or update a key that expires after `ttl`
	/// (None keeps it until removed)
	pub fn put_with_ttl(&self, key: &str, value: V, ttl: Option<Duration>) {
		let expires_at = ttl.map(|t| Instant::now() + t);
		let mut table = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
		let idx = Self::index(key, table.len());
		let bucket = &mut table[idx];
		match bucket.iter_mut().find(|e| e.key == key) {
			Some(entry) => {
				entry.value = value;
				entry.expires_at = expires_at;
			},
			None => bucket.push(Entry {
				key: key.to_string(),
				value,
				expires_at
			})
		};
	}

	pub fn get(&self, key: &str) -> Option<V> {
		let now = Instant::now();
		{
			let table = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
			let idx = Self::index(key, table.len());
			let entry = table[idx].iter().find(|e| e.key == key)?;
			if !entry.expired(now) {
				return Some(entry.value.clone());
			}
		}
		// expired: drop it unless it was rewritten in between
		let mut table = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
		let idx = Self::index(key, table.len());
		let bucket = &mut table[idx];
		if let Some(pos) = bucket.iter().position(|e| e.key == key && e.expired(now)) {
			bucket.swap_remove(pos);
		}
		None
	}

	/// Remove a key, returning its value if it was present and live
	pub fn remove(&self, key: &str) -> Option<V> {
		let mut table = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
		let idx = Self::index(key, table.len());
		let bucket = &mut table[idx];
		let pos = bucket.iter().position(|e| e.key == key)?;
		let entry = bucket.swap_remove(pos);
		if entry.expired(Instant::now()) {
			return None;
		}
		Some(entry.value)
	}

	/// Number of live entries
	pub fn len(&self) -> usize {
		let now = Instant::now();
		let table = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
		table.iter()
			.flat_map(|bucket| bucket.iter())
			.filter(|e| !e.expired(now))
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<V: Clone> KVStore<V> for DataStore<V> {
	fn get(&self, key: &str) -> Option<V> {
		DataStore::get(self, key)
	}

	/**
	 * Set a key
	 * When value is None, remove that entry;
	 * otherwise, insert or update the entry.
	 */
	fn set(&self, key: &str, value: Option<V>) {
		match value {
			Some(v) => self.put(key, v),
			None => {
				self.remove(key);
			}
		};
	}
}
