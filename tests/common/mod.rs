#![allow(dead_code)]

use std::collections::HashMap;
use consistent_ring::core::Ring;
use rand::Rng;

pub fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}

pub fn node_names(n: usize) -> Vec<String> {
	(0..n).map(|i| format!("node-{}", i)).collect()
}

// Generate n random 12-char alphanumeric keys
pub fn generate_keys<T: Rng>(rng: &mut T, n: usize) -> Vec<String> {
	(0..n)
		.map(|_| {
			(0..12)
				.map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
				.collect()
		})
		.collect()
}

// Resolve every key against the ring
pub fn resolve_all(ring: &Ring, keys: &[String]) -> HashMap<String, String> {
	keys.iter()
		.map(|k| (k.clone(), ring.get(k).expect("ring is not empty")))
		.collect()
}
