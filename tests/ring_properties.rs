use std::{sync::Arc, thread};
use consistent_ring::core::{Ring, RING_SIZE};
use rand::prelude::*;

mod common;
use common::*;

/// Same ring state, same answer
#[test]
fn test_determinism() {
	init_logger();
	let mut rng = StdRng::seed_from_u64(0);
	let keys = generate_keys(&mut rng, 1000);

	let ring = Ring::with_virtual_nodes(50).unwrap();
	ring.add(node_names(5));
	let first = resolve_all(&ring, &keys);
	assert_eq!(resolve_all(&ring, &keys), first);

	// an independent ring built the same way agrees
	let other = Ring::with_virtual_nodes(50).unwrap();
	other.add(node_names(5));
	assert_eq!(resolve_all(&other, &keys), first);
}

/// Lookups only ever return nodes currently on the ring
#[test]
fn test_total_coverage() {
	let mut rng = StdRng::seed_from_u64(1);
	let keys = generate_keys(&mut rng, 500);
	let ring = Ring::with_virtual_nodes(10).unwrap();
	let nodes = node_names(4);
	ring.add(&nodes);

	for key in keys.iter() {
		assert!(nodes.contains(&ring.get(key).unwrap()));
	}

	ring.remove("node-2");
	for key in keys.iter() {
		let owner = ring.get(key).unwrap();
		assert_ne!(owner, "node-2");
		assert!(nodes.contains(&owner));
	}

	for node in nodes.iter() {
		ring.remove(node);
	}
	for key in keys.iter() {
		assert_eq!(ring.get(key), None);
	}
}

/// Removing a node only remaps the keys it owned
#[test]
fn test_locality_under_removal() {
	let mut rng = StdRng::seed_from_u64(2);
	let keys = generate_keys(&mut rng, 2000);

	for vnodes in [1, 100] {
		let ring = Ring::with_virtual_nodes(vnodes).unwrap();
		ring.add(["NodeA", "NodeB", "NodeC"]);
		let before = resolve_all(&ring, &keys);

		ring.remove("NodeB");
		let after = resolve_all(&ring, &keys);
		for key in keys.iter() {
			assert_ne!(after[key], "NodeB");
			if before[key] != "NodeB" {
				assert_eq!(after[key], before[key], "key {} moved with {} vnodes", key, vnodes);
			}
		}
	}
}

/// Adding a node only moves keys onto the new node
#[test]
fn test_locality_under_addition() {
	let mut rng = StdRng::seed_from_u64(3);
	let keys = generate_keys(&mut rng, 2000);
	let ring = Ring::with_virtual_nodes(100).unwrap();
	ring.add(node_names(4));
	let before = resolve_all(&ring, &keys);

	ring.add(["node-4"]);
	let after = resolve_all(&ring, &keys);
	let mut moved = 0;
	for key in keys.iter() {
		if after[key] != before[key] {
			assert_eq!(after[key], "node-4");
			moved += 1;
		}
	}
	// roughly a fifth of the keys, never all of them
	assert!(moved > 0);
	assert!(moved < keys.len() / 2, "{} keys moved", moved);
}

/// Removing twice leaves the same ring as removing once
#[test]
fn test_idempotent_removal() {
	let ring = Ring::with_virtual_nodes(20).unwrap();
	ring.add(node_names(3));
	ring.remove("node-1");
	let once = (ring.ownership_ranges(), ring.load_distribution());
	ring.remove("node-1");
	assert_eq!(ring.ownership_ranges(), once.0);
	assert_eq!(ring.load_distribution(), once.1);
}

/// Batched and one-by-one adds build the same ring
#[test]
fn test_batched_add() {
	let batched = Ring::with_virtual_nodes(30).unwrap();
	batched.add(node_names(6));
	let single = Ring::with_virtual_nodes(30).unwrap();
	for node in node_names(6).iter().rev() {
		single.add([node]);
	}
	assert_eq!(batched.ownership_ranges(), single.ownership_ranges());
	assert_eq!(batched.nodes(), node_names(6));
}

/// Ranges cover the ring exactly once
#[test]
fn test_ranges_cover_ring() {
	let ring = Ring::with_virtual_nodes(64).unwrap();
	ring.add(node_names(8));
	let ranges = ring.ownership_ranges();
	assert_eq!(ranges.len(), ring.len());
	assert_eq!(ranges.iter().filter(|(r, _)| r.boundary).count(), 1);
	assert!(ranges[0].0.boundary);
	for pair in ranges.windows(2) {
		assert!(pair[0].0.end < pair[1].0.end);
		assert_eq!(pair[0].0.end, pair[1].0.start);
	}
	let total: u64 = ranges.iter().map(|(r, _)| r.len()).sum();
	assert_eq!(total, RING_SIZE);

	let total: f64 = ring.load_distribution().values().sum();
	assert!((total - 100.0).abs() < 1e-9);
}

/// More virtual nodes, flatter distribution
#[test]
fn test_load_convergence() {
	let stddev = |vnodes: usize| {
		let ring = Ring::with_virtual_nodes(vnodes).unwrap();
		ring.add(["NodeA", "NodeB", "NodeC"]);
		let dist = ring.load_distribution();
		let mean = 100.0 / 3.0;
		(dist.values().map(|p| (p - mean).powi(2)).sum::<f64>() / 3.0).sqrt()
	};
	assert!(stddev(100) < stddev(1));

	let ring = Ring::with_virtual_nodes(200).unwrap();
	ring.add(node_names(10));
	for (node, pct) in ring.load_distribution() {
		assert!(pct > 5.0 && pct < 15.0, "{} owns {}%", node, pct);
	}
}

/// Readers and writers share one ring
#[test]
fn test_concurrent_access() {
	let ring = Arc::new(Ring::with_virtual_nodes(20).unwrap());
	ring.add(["stable"]);

	let writers: Vec<_> = (0..4)
		.map(|w| {
			let ring = ring.clone();
			thread::spawn(move || {
				for i in 0..50 {
					let node = format!("w{}-{}", w, i);
					ring.add([&node]);
					ring.remove(&node);
				}
			})
		})
		.collect();

	let readers: Vec<_> = (0..4)
		.map(|r| {
			let ring = ring.clone();
			thread::spawn(move || {
				let mut rng = StdRng::seed_from_u64(r);
				for key in generate_keys(&mut rng, 500) {
					// the stable node is always present
					assert!(ring.get(&key).is_some());
					let total: f64 = ring.load_distribution().values().sum();
					assert!((total - 100.0).abs() < 1e-6);
				}
			})
		})
		.collect();

	for handle in writers.into_iter().chain(readers) {
		handle.join().unwrap();
	}
	assert_eq!(ring.nodes(), vec!["stable"]);
	assert_eq!(ring.len(), 20);
}
