//! Ring of in-process storage nodes
//!
//! - `topology`: node placement, key routing, replica sets
//! - `node`: per-shard record map and clock bookkeeping
//! - `record`: the immutable versioned value

pub mod node;
pub mod record;
pub mod topology;

pub use node::Node;
pub use record::Record;
pub use topology::{node_name, Ring};
