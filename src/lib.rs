//! # ringkv
//!
//! An in-process, eventually-consistent key-value store:
//! - Consistent-hash ring: keys go to the first node at or after their digest
//! - Replica sets: each primary plus its next N successors on the ring
//! - Configurable write fan-out (one / quorum / all)
//! - Vector clocks per record, with sibling detection on read
//!
//! ## Architecture
//!
//! ```text
//!            put(key, value) / get(key)
//!                      │
//!              ┌───────▼────────┐
//!              │     Store      │  write policy, read reconciliation
//!              └───────┬────────┘
//!                      │ digest(key) → primary → replica set
//!   ┌──────────────────▼───────────────────────────┐
//!   │                   Ring                        │
//!   │   Node3 ──▶ Node0 ──▶ Node4 ──▶ Node1 ──▶ ... │  (sorted by digest)
//!   └──────────────────────────────────────────────┘
//!        each node: own lock, record map, clock slot
//! ```
//!
//! ## Usage
//!
//! ```
//! use ringkv::Store;
//!
//! let store = Store::new(3)?;
//! store.put("key:0", "Node Data:0")?;
//! assert_eq!(store.get("key:0")?, "Node Data:0");
//! # Ok::<(), ringkv::Error>(())
//! ```
//!
//! ### CLI
//! ```bash
//! ringkv --nodes 5 inspect
//! ringkv --nodes 5 --policy one run --keys 1000 --rounds 3 --repair
//! ringkv locate user:42
//! ```

pub mod clock;
pub mod common;
pub mod ops;
pub mod ring;
pub mod store;

// Re-export commonly used types
pub use clock::{compare, resolve, Causality, Resolution, VectorClock};
pub use common::{digest, Config, Digest, Error, HashAlgorithm, Result};
pub use ring::{Node, Record, Ring};
pub use store::{Store, WritePolicy};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
