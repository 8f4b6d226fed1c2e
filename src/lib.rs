//! Consistent hashing ring with virtual nodes.
//!
//! [`core::Ring`] maps string keys onto a changing set of named nodes.
//! Each node occupies one or more positions on a 32-bit ring and a key
//! belongs to the first position at or after its CRC-32, wrapping around.
//! [`core::RingServer`] puts a node-local store behind every ring node and
//! serves the ring over tarpc.

pub mod core;
pub mod rpc;
pub mod server;
pub mod client;
